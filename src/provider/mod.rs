//! Carrier integration contract.
//!
//! Each supported carrier implements [`CargoProvider`] and registers with
//! the tracker under its display name.

pub mod aras;

use crate::model::TrackingResult;
use anyhow::Result;
use async_trait::async_trait;

/// The capability every carrier integration provides.
///
/// `track` never fails outward: every failure path is folded into a
/// [`TrackingResult`] with `success = false`, so one broken carrier page
/// cannot take a caller down. Integrations holding resources (a browser
/// session) override `close`; the default body makes teardown optional.
#[async_trait]
pub trait CargoProvider: Send + Sync {
    /// Display name; the registry key is its lowercase form.
    fn name(&self) -> &str;

    /// Query one tracking number and normalize the outcome.
    async fn track(&self, tracking_number: &str) -> TrackingResult;

    /// Release held resources. Safe to call when none exist.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
