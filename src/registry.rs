//! Carrier registry and tracking facade.

use crate::model::TrackingResult;
use crate::provider::aras::ArasKargoProvider;
use crate::provider::CargoProvider;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use tracing::debug;

/// Holds carrier integrations and dispatches queries by provider name.
///
/// Every tracker owns an independent name-to-provider mapping; nothing
/// here is global. Lookup is case-insensitive: names are keyed lowercased.
pub struct CargoTracker {
    providers: HashMap<String, Box<dyn CargoProvider>>,
    /// Lowercased names in registration order. Re-registration keeps the
    /// original position.
    order: Vec<String>,
}

impl CargoTracker {
    /// Tracker with the built-in carriers registered.
    pub fn new() -> Self {
        let mut tracker = Self::empty();
        tracker.register_provider(Box::new(ArasKargoProvider::new()));
        tracker
    }

    /// Tracker with no carriers; callers register their own integrations.
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register an integration under the lowercase of its display name.
    /// Re-registering a name replaces the provider, last write wins.
    pub fn register_provider(&mut self, provider: Box<dyn CargoProvider>) {
        let key = provider.name().to_lowercase();
        if !self.providers.contains_key(&key) {
            self.order.push(key.clone());
        }
        debug!(provider = %key, "provider registered");
        self.providers.insert(key, provider);
    }

    /// Registered provider names, in registration order.
    pub fn providers(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Track with a named provider. An unknown name resolves to an error
    /// result without touching any integration.
    pub async fn track_with_provider(
        &self,
        provider_name: &str,
        tracking_number: &str,
    ) -> TrackingResult {
        match self.providers.get(&provider_name.to_lowercase()) {
            Some(provider) => provider.track(tracking_number).await,
            None => TrackingResult::error(format!("Provider '{provider_name}' not found")),
        }
    }

    /// Track an Aras Kargo shipment.
    pub async fn track_aras(&self, tracking_number: &str) -> TrackingResult {
        self.track_with_provider("aras kargo", tracking_number).await
    }

    /// Tear down every provider, continuing past individual failures.
    ///
    /// Failures are collected into one aggregate error so a broken
    /// provider cannot leak the sessions registered after it.
    pub async fn close(&self) -> Result<()> {
        let mut failures = Vec::new();
        for name in &self.order {
            if let Some(provider) = self.providers.get(name) {
                if let Err(e) = provider.close().await {
                    failures.push(format!("{name}: {e:#}"));
                }
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("provider teardown failed: {}", failures.join("; ")))
        }
    }
}

impl Default for CargoTracker {
    fn default() -> Self {
        Self::new()
    }
}
