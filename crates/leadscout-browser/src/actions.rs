use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use crate::locator::Locator;
use std::time::Duration;

/// Starts isolated browser sessions.
#[async_trait::async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Launch a fresh session presenting the given identity.
    async fn launch(&self, fingerprint: &FingerprintConfig) -> Result<Box<dyn BrowserSession>>;
}

/// One isolated browser session. Never shared between sources.
#[async_trait::async_trait]
pub trait BrowserSession: Send + Sync {
    /// Open a new page (sub-session) inside this session.
    async fn new_page(&self) -> Result<Box<dyn PageActions>>;

    /// Release the session and every page it still holds.
    async fn close(&mut self) -> Result<()>;
}

/// Page-level automation the scraper relies on.
#[async_trait::async_trait]
pub trait PageActions: Send + Sync {
    /// Navigate to a URL and wait for the load event.
    ///
    /// Exceeding `timeout` yields [`BrowserError::NavigationTimeout`].
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Abort requests whose URL matches any of the patterns.
    async fn block_resources(&self, patterns: &[String]) -> Result<()>;

    /// Full HTML of the current document.
    async fn content(&self) -> Result<String>;

    /// Visible text of the document body.
    async fn body_text(&self) -> Result<String>;

    /// Text of the first element matched by any locator.
    async fn text_of(&self, locators: &[Locator]) -> Result<Option<String>>;

    /// Outer HTML of every element matched by the first locator that matches.
    async fn outer_html_all(&self, locators: &[Locator]) -> Result<Vec<String>>;

    /// Poll until a matched element is visible with non-empty text, or give up
    /// after `timeout`.
    async fn wait_visible_text(
        &self,
        locators: &[Locator],
        timeout: Duration,
    ) -> Result<Option<String>>;

    /// Click the first visible element matched by any locator, waiting up to
    /// `timeout` for one to appear. Returns whether a click happened.
    async fn click_visible(&self, locators: &[Locator], timeout: Duration) -> Result<bool>;

    /// Scroll to the bottom in `step_px` increments.
    async fn scroll_through(&self, step_px: u32, step_delay: Duration) -> Result<()>;

    /// Close this page.
    async fn close(&self) -> Result<()>;
}

/// Parse a navigation target, rejecting anything that is not http(s).
pub fn parse_target(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL {url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(BrowserError::NavigationError(format!(
            "Unsupported scheme {other} in {url}"
        ))),
    }
}
