// Copyright 2026 Kargo Takip Contributors
// SPDX-License-Identifier: Apache-2.0

//! `kargo-takip track <number>` — query one shipment and print the result.

use crate::model::TrackingResult;
use crate::registry::CargoTracker;
use anyhow::Result;
use indicatif::ProgressBar;
use std::time::Duration;
use tracing::warn;

/// Run the track command. Exits non-zero when the query did not succeed.
pub async fn run(provider: &str, tracking_number: &str, json: bool) -> Result<()> {
    let tracker = CargoTracker::new();

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("querying {provider}..."));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = tracker.track_with_provider(provider, tracking_number).await;

    spinner.finish_and_clear();
    if let Err(e) = tracker.close().await {
        warn!("teardown after query failed: {e:#}");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_result(result: &TrackingResult) {
    println!("Status      : {}", result.status);

    if let Some(info) = &result.data {
        print_field("Carrier says", &info.status);
        print_field("Tracking no", &info.tracking_number);
        print_field("Waybill no", &info.waybill_number);
        print_field("From", &info.sender_branch);
        print_field("To", &info.receiver_branch);
        print_field("Sender", &info.sender);
        print_field("Recipient", &info.recipient);
        print_field("Shipped", &info.shipment_date);
        if let Some(date) = &info.delivery_date {
            print_field("Delivered", date);
        }
        print_field("Type", &info.cargo_type);
        print_field("Weight", &info.weight);
        print_field("Pieces", &info.package_count);

        if !info.movements.is_empty() {
            println!();
            println!("Movements:");
            for m in &info.movements {
                match &m.description {
                    Some(desc) => {
                        println!("  {}  {}  {}  ({desc})", m.date, m.location, m.status)
                    }
                    None => println!("  {}  {}  {}", m.date, m.location, m.status),
                }
            }
        }

        if !info.failure_reasons.is_empty() {
            println!();
            println!("Failed delivery attempts:");
            for f in &info.failure_reasons {
                println!("  {}  {}  {}", f.date, f.reason, f.description);
            }
        }

        if let Some(service) = &info.service_info {
            if !service.service_type.is_empty() {
                println!();
                print_field("Service", &service.service_type);
            }
        }
    }

    if let Some(message) = &result.error {
        println!("Error       : {message}");
    }
}

fn print_field(label: &str, value: &str) {
    if !value.is_empty() {
        println!("{label:<12}: {value}");
    }
}
