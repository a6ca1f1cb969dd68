//! Aras Kargo integration.
//!
//! Drives the carrier's public tracking site in a shared headless browser
//! session, one fresh tab per query. Selector glue and page-state
//! interpretation live in [`parse`].

pub mod parse;

use crate::browser::chromium::ChromiumBrowser;
use crate::browser::{Browser, BrowserTab};
use crate::error::TrackError;
use crate::model::{MovementInfo, ServiceInfo, TrackingResult};
use crate::provider::CargoProvider;
use crate::stealth;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

/// Query entry point; the site redirects to the results page itself.
const TRACKING_URL: &str = "https://kargotakip.araskargo.com.tr/mainpage.aspx";

/// Tab link activating the movement-history view.
const MOVEMENTS_TAB: &str = "#lnkHareketler";
/// Tab link activating the service/SMS view.
const SERVICE_TAB: &str = "#lnkServisBilgileri";

/// Hard ceiling on page navigation.
const NAV_TIMEOUT_MS: u64 = 30_000;

/// Aras Kargo tracking over the carrier's public web page.
pub struct ArasKargoProvider {
    browser: Box<dyn Browser>,
}

impl ArasKargoProvider {
    /// Provider backed by a lazily launched headless Chromium session.
    pub fn new() -> Self {
        Self::with_browser(Box::new(ChromiumBrowser::new()))
    }

    /// Provider driving a caller-supplied engine. Tests plug fakes in here.
    pub fn with_browser(browser: Box<dyn Browser>) -> Self {
        Self { browser }
    }

    fn tracking_url(tracking_number: &str) -> Result<String> {
        let url = Url::parse_with_params(TRACKING_URL, &[("code", tracking_number)])
            .context("failed to build tracking URL")?;
        Ok(url.into())
    }

    /// The query protocol. Every failure bubbles up to `track`, which owns
    /// the tab and folds errors into the result envelope.
    async fn track_in_tab(
        &self,
        tab: &dyn BrowserTab,
        tracking_number: &str,
    ) -> Result<TrackingResult, TrackError> {
        tab.set_user_agent(stealth::random_user_agent()).await?;

        let final_url = tab
            .navigate(&Self::tracking_url(tracking_number)?, NAV_TIMEOUT_MS)
            .await?;
        let html = tab.content().await?;

        // "No record" wins over every other page state.
        if parse::is_not_found_page(&html) {
            return Err(TrackError::NotFound);
        }

        if !final_url.to_lowercase().contains(parse::RESULT_PAGE_MARKER) {
            return Err(TrackError::UnexpectedNavigation(final_url));
        }

        let mut info = parse::extract_cargo_info(&html, tracking_number)?;

        // Secondary views degrade instead of failing the query: the main
        // fields are already in hand.
        info.movements = match self.collect_movements(tab).await {
            Ok(movements) => movements,
            Err(e) => {
                warn!("movement extraction failed, continuing without: {e:#}");
                Vec::new()
            }
        };
        info.service_info = Some(match self.collect_service_info(tab).await {
            Ok(service) => service,
            Err(e) => {
                warn!("service info extraction failed, using defaults: {e:#}");
                ServiceInfo::default()
            }
        });

        let status = parse::classify_status(&info.status);
        Ok(TrackingResult::found(status, info))
    }

    /// Activate the movements view and scan its grid. The engine settles
    /// the view as part of the click.
    async fn collect_movements(&self, tab: &dyn BrowserTab) -> Result<Vec<MovementInfo>> {
        tab.click(MOVEMENTS_TAB).await?;
        let html = tab.content().await?;
        Ok(parse::parse_movements(&html))
    }

    /// Activate the service view and scan its grids.
    async fn collect_service_info(&self, tab: &dyn BrowserTab) -> Result<ServiceInfo> {
        tab.click(SERVICE_TAB).await?;
        let html = tab.content().await?;
        Ok(parse::parse_service_info(&html))
    }
}

impl Default for ArasKargoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CargoProvider for ArasKargoProvider {
    fn name(&self) -> &str {
        "Aras Kargo"
    }

    async fn track(&self, tracking_number: &str) -> TrackingResult {
        debug!(tracking_number, "aras kargo query");

        let tab = match self.browser.open_tab().await {
            Ok(tab) => tab,
            Err(e) => return TrackingResult::error(format!("{e:#}")),
        };

        let outcome = self.track_in_tab(tab.as_ref(), tracking_number).await;

        // The tab is released on every exit path, success or failure.
        if let Err(e) = tab.close().await {
            warn!("failed to close tab: {e:#}");
        }

        match outcome {
            Ok(result) => result,
            Err(err) => err.into_result(),
        }
    }

    async fn close(&self) -> Result<()> {
        self.browser.close().await
    }
}
