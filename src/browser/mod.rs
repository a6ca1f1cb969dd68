//! Browser engine abstraction.
//!
//! Defines the `Browser` and `BrowserTab` traits that abstract over the
//! engine driving carrier pages (currently Chromium via chromiumoxide).
//! Tests plug scripted fakes in through the same seam.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;

/// A browser session that opens per-query tabs.
///
/// Sessions are long-lived and shared across queries. Implementations
/// launch lazily on the first `open_tab`; `close` is safe to call at any
/// time, before any launch and repeatedly.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open a fresh tab for one query.
    async fn open_tab(&self) -> Result<Box<dyn BrowserTab>>;
    /// Tear the session down. Idempotent.
    async fn close(&self) -> Result<()>;
}

/// A single tab, exclusively owned by the query that opened it.
#[async_trait]
pub trait BrowserTab: Send + Sync {
    /// Override the tab's user-agent string before navigating.
    async fn set_user_agent(&self, user_agent: &str) -> Result<()>;
    /// Navigate with a timeout, wait for the page to settle, and return
    /// the final URL after any redirects.
    async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<String>;
    /// Full rendered HTML of the current document.
    async fn content(&self) -> Result<String>;
    /// Click the first element matching a CSS selector and let the
    /// activated view settle before returning.
    async fn click(&self, selector: &str) -> Result<()>;
    /// Close this tab.
    async fn close(self: Box<Self>) -> Result<()>;
}
