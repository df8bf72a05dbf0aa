//! In-memory browser used by the scraper integration tests.
//!
//! Pages are keyed by URL. Locators are matched on their `css` only.

#![allow(dead_code)]

use leadscout_browser::{
    BrowserError, BrowserSession, FingerprintConfig, Locator, PageActions, Result, SessionLauncher,
};
use leadscout_core::PacingConfig;
use leadscout_scraper::ScrapeSettings;
use leadscout_sites::SiteDefinition;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE: &str = "https://test.example";

pub const SITE: &str = r#"
[site]
id = "milanuncios"
name = "Test Milanuncios"
base_url = "https://test.example"

[[categories]]
name = "venta"
url = "https://test.example/venta"

[[categories]]
name = "alquiler"
url = "https://test.example/alquiler"

[listing]
cards = [{ css = "article.card" }]
link = [{ css = "a.title", attr = "href" }]
title = [{ css = "a.title" }]
price = [{ css = "span.price" }]
location = [{ css = "span.loc" }]

[detail]
address = [{ css = "span.address" }]
description = [{ css = "div.desc" }]
phone_reveal = [{ css = "button.reveal", text = "Ver teléfono" }]
phone_value = [{ css = "a.tel" }]
scan_description_for_phone = true

[screening]
challenge_keywords = ["captcha"]
reject_keywords = ["profesional"]

[pagination]
next = [{ css = "a.next" }]
"#;

pub fn site() -> SiteDefinition {
    let def: SiteDefinition = toml::from_str(SITE).expect("parse test site");
    def.validate().expect("valid test site");
    def
}

/// Default settings with every delay removed.
pub fn settings() -> ScrapeSettings {
    ScrapeSettings {
        navigation_timeout: Duration::from_millis(200),
        detail_timeout: Duration::from_millis(200),
        visibility_timeout: Duration::from_millis(50),
        pacing: PacingConfig::instant(),
        ..ScrapeSettings::default()
    }
}

/// One fake document.
#[derive(Debug, Clone, Default)]
pub struct FakeDocument {
    pub body_text: String,
    pub html: String,
    pub cards: Vec<String>,
    /// Always visible text, keyed by CSS
    pub texts: HashMap<String, String>,
    /// Text that appears once the reveal control was clicked
    pub revealed: HashMap<String, String>,
    pub reveal_css: Option<String>,
    /// Next-page control: (css, target URL)
    pub next: Option<(String, String)>,
    pub timeout: bool,
    pub panic_on_load: bool,
}

impl FakeDocument {
    pub fn listing(cards: Vec<String>) -> Self {
        Self {
            body_text: "Pisos de particulares en Barcelona".to_string(),
            cards,
            ..Self::default()
        }
    }

    pub fn with_next(mut self, url: &str) -> Self {
        self.next = Some(("a.next".to_string(), url.to_string()));
        self
    }

    /// A private-seller detail page whose number appears after a click.
    pub fn detail_with_reveal(phone: &str) -> Self {
        Self {
            body_text: "Piso luminoso. Anunciante particular.".to_string(),
            html: "<html><body><p>Piso luminoso</p></body></html>".to_string(),
            reveal_css: Some("button.reveal".to_string()),
            revealed: HashMap::from([("a.tel".to_string(), phone.to_string())]),
            ..Self::default()
        }
    }

    pub fn detail_with_description(description: &str) -> Self {
        Self {
            body_text: format!("Piso en venta. {description}"),
            html: "<html><body></body></html>".to_string(),
            texts: HashMap::from([("div.desc".to_string(), description.to_string())]),
            ..Self::default()
        }
    }

    pub fn detail_without_phone() -> Self {
        Self {
            body_text: "Piso sin datos de contacto".to_string(),
            html: "<html><body></body></html>".to_string(),
            ..Self::default()
        }
    }

    pub fn challenge() -> Self {
        Self {
            body_text: "Por favor, completa el CAPTCHA para continuar".to_string(),
            html: "<html><body>captcha</body></html>".to_string(),
            ..Self::default()
        }
    }

    /// Embed a JSON-LD position in the page HTML.
    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.html = format!(
            r#"<html><head><script type="application/ld+json">{{"geo": {{"latitude": {lat}, "longitude": {lng}}}}}</script></head><body></body></html>"#
        );
        self
    }

    pub fn with_text(mut self, css: &str, text: &str) -> Self {
        self.texts.insert(css.to_string(), text.to_string());
        self
    }
}

pub fn card(id: u32, title: &str, price: &str) -> String {
    format!(
        r#"<article class="card"><a class="title" href="/anuncio/{id}.htm">{title}</a><span class="price">{price}</span><span class="loc">Gràcia, Barcelona</span></article>"#
    )
}

pub fn card_without_link(title: &str) -> String {
    format!(r#"<article class="card"><span class="title">{title}</span><span class="price">100.000 €</span></article>"#)
}

pub fn detail_url(id: u32) -> String {
    format!("{BASE}/anuncio/{id}.htm")
}

/// Documents plus counters shared by every session and page.
#[derive(Debug, Default)]
pub struct FakeWeb {
    docs: HashMap<String, FakeDocument>,
    visits: Mutex<Vec<String>>,
    pages_opened: AtomicUsize,
    pages_closed: AtomicUsize,
}

impl FakeWeb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, doc: FakeDocument) -> Self {
        self.docs.insert(url.into(), doc);
        self
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().expect("visits lock").clone()
    }

    pub fn visited(&self, url: &str) -> bool {
        self.visits().iter().any(|v| v == url)
    }

    pub fn pages_opened(&self) -> usize {
        self.pages_opened.load(Ordering::SeqCst)
    }

    pub fn pages_closed(&self) -> usize {
        self.pages_closed.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct PageState {
    url: Option<String>,
    revealed: bool,
}

pub struct FakePage {
    web: Arc<FakeWeb>,
    state: Mutex<PageState>,
}

impl FakePage {
    pub fn new(web: Arc<FakeWeb>) -> Self {
        Self {
            web,
            state: Mutex::new(PageState::default()),
        }
    }

    fn current(&self) -> Option<FakeDocument> {
        let state = self.state.lock().expect("page lock");
        state
            .url
            .as_ref()
            .and_then(|url| self.web.docs.get(url).cloned())
    }

    fn lookup(&self, locators: &[Locator]) -> Option<String> {
        let doc = self.current()?;
        let revealed = self.state.lock().expect("page lock").revealed;
        locators.iter().find_map(|loc| {
            doc.texts
                .get(&loc.css)
                .or_else(|| revealed.then(|| doc.revealed.get(&loc.css)).flatten())
                .cloned()
        })
    }

    fn go(&self, url: &str) {
        self.web
            .visits
            .lock()
            .expect("visits lock")
            .push(url.to_string());
        let mut state = self.state.lock().expect("page lock");
        state.url = Some(url.to_string());
        state.revealed = false;
    }
}

#[async_trait::async_trait]
impl PageActions for FakePage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let Some(doc) = self.web.docs.get(url) else {
            return Err(BrowserError::NavigationError(format!("{url}: 404")));
        };
        if doc.panic_on_load {
            panic!("renderer crashed on {url}");
        }
        if doc.timeout {
            return Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis(),
            });
        }
        self.go(url);
        Ok(())
    }

    async fn block_resources(&self, _patterns: &[String]) -> Result<()> {
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.current().map(|d| d.html).unwrap_or_default())
    }

    async fn body_text(&self) -> Result<String> {
        Ok(self.current().map(|d| d.body_text).unwrap_or_default())
    }

    async fn text_of(&self, locators: &[Locator]) -> Result<Option<String>> {
        Ok(self.lookup(locators))
    }

    async fn outer_html_all(&self, _locators: &[Locator]) -> Result<Vec<String>> {
        Ok(self.current().map(|d| d.cards).unwrap_or_default())
    }

    async fn wait_visible_text(
        &self,
        locators: &[Locator],
        _timeout: Duration,
    ) -> Result<Option<String>> {
        Ok(self.lookup(locators))
    }

    async fn click_visible(&self, locators: &[Locator], _timeout: Duration) -> Result<bool> {
        let Some(doc) = self.current() else {
            return Ok(false);
        };
        for loc in locators {
            if let Some((css, target)) = &doc.next {
                if &loc.css == css {
                    self.go(target);
                    return Ok(true);
                }
            }
            if doc.reveal_css.as_deref() == Some(loc.css.as_str()) {
                self.state.lock().expect("page lock").revealed = true;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn scroll_through(&self, _step_px: u32, _step_delay: Duration) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.web.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeSession {
    web: Arc<FakeWeb>,
    closed: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl BrowserSession for FakeSession {
    async fn new_page(&self) -> Result<Box<dyn PageActions>> {
        self.web.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage::new(self.web.clone())))
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Launcher handing out sessions over one [`FakeWeb`].
pub struct FakeLauncher {
    web: Arc<FakeWeb>,
    launches: AtomicUsize,
    closed: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeLauncher {
    pub fn new(web: Arc<FakeWeb>) -> Self {
        Self {
            web,
            launches: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Arc::new(FakeWeb::new()))
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn session(&self) -> FakeSession {
        FakeSession {
            web: self.web.clone(),
            closed: self.closed.clone(),
        }
    }
}

#[async_trait::async_trait]
impl SessionLauncher for FakeLauncher {
    async fn launch(&self, _fingerprint: &FingerprintConfig) -> Result<Box<dyn BrowserSession>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(BrowserError::ChromiumError("no chrome binary".to_string()));
        }
        Ok(Box::new(self.session()))
    }
}
