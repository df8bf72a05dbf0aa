use crate::actions::{parse_target, BrowserSession, PageActions, SessionLauncher};
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use crate::locator::{describe, Locator};
use crate::script;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::{emulation, network};
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use leadscout_core::BrowserConfig;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const MAX_SCROLL_STEPS: usize = 200;

/// Launches a fresh Chromium process per session.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
    config: BrowserConfig,
}

impl ChromiumLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self, fingerprint: &FingerprintConfig) -> Result<Box<dyn BrowserSession>> {
        let engine = BrowserEngine::launch(&self.config, fingerprint.clone()).await?;
        Ok(Box::new(engine))
    }
}

/// One running Chromium process and the task driving its CDP handler.
pub struct BrowserEngine {
    browser: Browser,
    handler: JoinHandle<()>,
    fingerprint: FingerprintConfig,
    closed: bool,
}

impl BrowserEngine {
    /// Launch Chromium with the given settings and identity.
    pub async fn launch(config: &BrowserConfig, fingerprint: FingerprintConfig) -> Result<Self> {
        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .arg(format!("--lang={}", fingerprint.locale))
            .arg("--disable-blink-features=AutomationControlled");

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let chrome_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "browser handler event error");
                }
            }
        });

        tracing::debug!(
            user_agent = %fingerprint.user_agent,
            headless = config.headless,
            "browser session launched"
        );

        Ok(Self {
            browser,
            handler,
            fingerprint,
            closed: false,
        })
    }

    pub fn fingerprint(&self) -> &FingerprintConfig {
        &self.fingerprint
    }

    async fn apply_fingerprint(&self, page: &Page) -> Result<()> {
        let fp = &self.fingerprint;

        page.execute(network::SetUserAgentOverrideParams {
            user_agent: fp.user_agent.clone(),
            accept_language: Some(fp.accept_language.clone()),
            platform: None,
            user_agent_metadata: None,
        })
        .await?;

        page.execute(emulation::SetLocaleOverrideParams {
            locale: Some(fp.locale.clone()),
        })
        .await?;

        page.execute(emulation::SetTimezoneOverrideParams::new(fp.timezone.clone()))
            .await?;

        page.execute(
            emulation::SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(fp.viewport_width))
                .height(i64::from(fp.viewport_height))
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(BrowserError::ChromiumError)?,
        )
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl BrowserSession for BrowserEngine {
    async fn new_page(&self) -> Result<Box<dyn PageActions>> {
        let page = self.browser.new_page("about:blank").await?;
        self.apply_fingerprint(&page).await?;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::trace!(error = %e, "waiting for browser exit failed");
        }
        self.handler.abort();
        result.map(|_| ()).map_err(BrowserError::from)
    }
}

impl Drop for BrowserEngine {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// A Chromium tab.
pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    async fn eval<T: DeserializeOwned>(&self, js: String) -> Result<T> {
        let result = self
            .page
            .evaluate(js)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?;
        result
            .into_value::<T>()
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[async_trait::async_trait]
impl PageActions for ChromiumPage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let target = parse_target(url)?;

        match tokio::time::timeout(timeout, self.page.goto(target.as_str())).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::NavigationError(format!("{url}: {e}"))),
            Err(_) => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis(),
            }),
        }
    }

    async fn block_resources(&self, patterns: &[String]) -> Result<()> {
        if patterns.is_empty() {
            return Ok(());
        }
        self.page.execute(network::EnableParams::default()).await?;
        self.page
            .execute(network::SetBlockedUrLsParams::new(patterns.to_vec()))
            .await?;
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn body_text(&self) -> Result<String> {
        self.eval(script::BODY_TEXT.to_string()).await
    }

    async fn text_of(&self, locators: &[Locator]) -> Result<Option<String>> {
        let text: String = self.eval(script::first_text(locators)?).await?;
        Ok(non_empty(text))
    }

    async fn outer_html_all(&self, locators: &[Locator]) -> Result<Vec<String>> {
        self.eval(script::outer_html_all(locators)?).await
    }

    async fn wait_visible_text(
        &self,
        locators: &[Locator],
        timeout: Duration,
    ) -> Result<Option<String>> {
        let js = script::first_visible_text(locators)?;
        let deadline = Instant::now() + timeout;
        loop {
            let text: String = self.eval(js.clone()).await?;
            if let Some(text) = non_empty(text) {
                return Ok(Some(text));
            }
            if Instant::now() >= deadline {
                tracing::trace!(locators = %describe(locators), "no visible text before timeout");
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click_visible(&self, locators: &[Locator], timeout: Duration) -> Result<bool> {
        let visibility_check = script::any_visible(locators)?;
        let deadline = Instant::now() + timeout;
        loop {
            let visible: bool = self.eval(visibility_check.clone()).await?;
            if visible {
                return self.eval(script::click_first_visible(locators)?).await;
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn scroll_through(&self, step_px: u32, step_delay: Duration) -> Result<()> {
        let step = script::scroll_by(step_px.max(1));
        // Lazy loading can grow the page while scrolling, so the height is re-read every step
        for _ in 0..MAX_SCROLL_STEPS {
            let reached: f64 = self.eval(step.clone()).await?;
            let height: f64 = self.eval(script::SCROLL_HEIGHT.to_string()).await?;
            if reached >= height {
                return Ok(());
            }
            tokio::time::sleep(step_delay).await;
        }
        tracing::debug!(steps = MAX_SCROLL_STEPS, "scroll stopped before reaching the bottom");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.page.clone().close().await?;
        Ok(())
    }
}
