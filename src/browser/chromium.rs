//! Chromium-based browser engine using chromiumoxide.

use super::{Browser, BrowserTab};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as ChromeBrowser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Delay after navigation for late-loading page content to materialize.
const NAVIGATE_SETTLE: Duration = Duration::from_millis(1_500);

/// Delay after a click for the activated view to fill itself in.
const CLICK_SETTLE: Duration = Duration::from_millis(800);

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. KARGO_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("KARGO_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.kargo-takip/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".kargo-takip/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".kargo-takip/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".kargo-takip/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".kargo-takip/chromium/chrome-linux64/chrome"),
                home.join(".kargo-takip/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// A launched Chromium instance plus its CDP event drain task.
struct BrowserHandle {
    browser: ChromeBrowser,
    event_task: JoinHandle<()>,
}

impl BrowserHandle {
    async fn launch() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Install google-chrome or set KARGO_CHROMIUM_PATH.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = ChromeBrowser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // The handler stream must be drained for the browser to make progress.
        let event_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            event_task,
        })
    }

    async fn shutdown(mut self) {
        let _ = self.browser.close().await;
        self.event_task.abort();
    }
}

/// Lazily launched, shared Chromium session.
///
/// The handle lives behind a mutex-guarded `Option`: the first caller
/// launches Chromium while concurrent callers wait on the lock instead of
/// racing into a second launch. `close` takes the handle out, so it is
/// idempotent and safe before any launch.
pub struct ChromiumBrowser {
    handle: Mutex<Option<BrowserHandle>>,
}

impl ChromiumBrowser {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }
}

impl Default for ChromiumBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn open_tab(&self) -> Result<Box<dyn BrowserTab>> {
        let mut guard = self.handle.lock().await;

        // Reuse the held session while it can still open tabs. A session
        // whose Chromium process died is torn down and relaunched once.
        if let Some(handle) = guard.take() {
            let reused = handle.browser.new_page("about:blank").await;
            match reused {
                Ok(page) => {
                    *guard = Some(handle);
                    return Ok(Box::new(ChromiumTab { page }));
                }
                Err(e) => {
                    warn!("browser session lost ({e}), relaunching");
                    handle.shutdown().await;
                }
            }
        }

        debug!("launching headless Chromium");
        let handle = guard.insert(BrowserHandle::launch().await?);
        let page = handle
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        Ok(Box::new(ChromiumTab { page }))
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.handle.lock().await;
        if let Some(handle) = guard.take() {
            debug!("closing browser session");
            handle.shutdown().await;
        }
        Ok(())
    }
}

/// A single Chromium tab.
pub struct ChromiumTab {
    page: Page,
}

#[async_trait]
impl BrowserTab for ChromiumTab {
    async fn set_user_agent(&self, user_agent: &str) -> Result<()> {
        self.page
            .set_user_agent(user_agent)
            .await
            .context("failed to set user agent")?;
        Ok(())
    }

    async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<String> {
        let result = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.page.goto(url),
        )
        .await;

        match result {
            Ok(Ok(_response)) => {
                // Wait for page to be loaded, then give the carrier's own
                // scripts a moment to fill the grids in.
                let _ = self.page.wait_for_navigation().await;
                tokio::time::sleep(NAVIGATE_SETTLE).await;

                let final_url = self
                    .page
                    .url()
                    .await
                    .context("failed to get URL")?
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());

                Ok(final_url)
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn content(&self) -> Result<String> {
        self.page.content().await.context("failed to get HTML")
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("element not found: {selector}"))?;
        element
            .click()
            .await
            .with_context(|| format!("click failed on: {selector}"))?;
        // The activated view loads its grid asynchronously.
        tokio::time::sleep(CLICK_SETTLE).await;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let _ = self.page.close().await;
        Ok(())
    }
}
