// Copyright 2026 Kargo Takip Contributors
// SPDX-License-Identifier: Apache-2.0

//! Normalized tracking data model.
//!
//! Every query resolves to a [`TrackingResult`] envelope; carrier pages are
//! mapped into [`CargoInfo`] records. Field values carry the raw page text
//! as rendered by the carrier: dates, weights and counts are passed through
//! verbatim, never re-parsed into numeric or date types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome classification for a tracking query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingStatus {
    Delivered,
    InTransit,
    NotFound,
    Error,
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrackingStatus::Delivered => "DELIVERED",
            TrackingStatus::InTransit => "IN_TRANSIT",
            TrackingStatus::NotFound => "NOT_FOUND",
            TrackingStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Envelope returned by every tracking query.
///
/// `data` is present only when `success` is true, `error` only when it is
/// false. Callers branch on `success` and `status`; queries never fail any
/// other way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingResult {
    pub success: bool,
    pub status: TrackingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CargoInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrackingResult {
    /// A located and extracted shipment record.
    pub fn found(status: TrackingStatus, data: CargoInfo) -> Self {
        Self {
            success: true,
            status,
            data: Some(data),
            error: None,
        }
    }

    /// The carrier has no record for the queried tracking number.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            success: false,
            status: TrackingStatus::NotFound,
            data: None,
            error: Some(message.into()),
        }
    }

    /// A technical failure; `message` carries the underlying diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            status: TrackingStatus::Error,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Normalized shipment record, built fresh for each query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoInfo {
    /// Echoes the queried tracking number exactly.
    pub tracking_number: String,
    pub waybill_number: String,
    pub sender_branch: String,
    pub receiver_branch: String,
    pub sender: String,
    pub recipient: String,
    /// Raw status text as the carrier page renders it.
    pub status: String,
    pub shipment_date: String,
    /// Present only once the carrier reports the shipment delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
    pub cargo_type: String,
    pub weight: String,
    pub package_count: String,
    pub payment_type: String,
    pub delivery_method: String,
    pub sms_code: String,
    pub failure_reasons: Vec<FailureReason>,
    pub movements: Vec<MovementInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_info: Option<ServiceInfo>,
}

/// One failed delivery attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReason {
    pub date: String,
    pub reason: String,
    pub description: String,
}

/// One handling event in the shipment's movement trail, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementInfo {
    pub date: String,
    pub location: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Ancillary service and notification details attached to a shipment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub service_type: String,
    pub sms_notifications: Vec<String>,
    pub additional_services: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn test_found_result_wire_shape() {
        let info = CargoInfo {
            tracking_number: "1234567890123".to_string(),
            sender_branch: "ISTANBUL AVR.".to_string(),
            status: "TESLİM EDİLDİ".to_string(),
            delivery_date: Some("03.07.2024".to_string()),
            ..Default::default()
        };
        let result = TrackingResult::found(TrackingStatus::Delivered, info);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["status"], json!("DELIVERED"));
        assert_eq!(value["data"]["trackingNumber"], json!("1234567890123"));
        assert_eq!(value["data"]["senderBranch"], json!("ISTANBUL AVR."));
        assert_eq!(value["data"]["deliveryDate"], json!("03.07.2024"));
        // No error key on success.
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_not_found_wire_shape() {
        let result = TrackingResult::not_found("Kargo numarası bulunamadı");
        assert_json_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "success": false,
                "status": "NOT_FOUND",
                "error": "Kargo numarası bulunamadı"
            })
        );
    }

    #[test]
    fn test_error_result_carries_message() {
        let result = TrackingResult::error("navigation timed out after 30000ms");
        assert!(!result.success);
        assert_eq!(result.status, TrackingStatus::Error);
        assert_eq!(result.data, None);
        assert_eq!(
            result.error.as_deref(),
            Some("navigation timed out after 30000ms")
        );
    }

    #[test]
    fn test_status_serde_roundtrip() {
        for status in [
            TrackingStatus::Delivered,
            TrackingStatus::InTransit,
            TrackingStatus::NotFound,
            TrackingStatus::Error,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: TrackingStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
        assert_eq!(
            serde_json::to_string(&TrackingStatus::InTransit).unwrap(),
            "\"IN_TRANSIT\""
        );
    }

    #[test]
    fn test_status_display_matches_wire_form() {
        assert_eq!(TrackingStatus::Delivered.to_string(), "DELIVERED");
        assert_eq!(TrackingStatus::NotFound.to_string(), "NOT_FOUND");
    }

    #[test]
    fn test_empty_optional_fields_skipped() {
        let info = CargoInfo::default();
        let value = serde_json::to_value(&info).unwrap();
        assert!(value.get("deliveryDate").is_none());
        assert!(value.get("serviceInfo").is_none());
        // Collections serialize even when empty.
        assert_eq!(value["movements"], json!([]));
        assert_eq!(value["failureReasons"], json!([]));
    }

    #[test]
    fn test_movement_description_skipped_when_absent() {
        let movement = MovementInfo {
            date: "01.07.2024 09:12".to_string(),
            location: "ANKARA BÖLGE MD.".to_string(),
            status: "KARGO GELDİ".to_string(),
            description: None,
        };
        let value = serde_json::to_value(&movement).unwrap();
        assert_json_eq!(
            value,
            json!({
                "date": "01.07.2024 09:12",
                "location": "ANKARA BÖLGE MD.",
                "status": "KARGO GELDİ"
            })
        );
    }
}
