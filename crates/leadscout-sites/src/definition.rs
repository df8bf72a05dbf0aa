//! Site definition types and TOML schema.
//!
//! A site definition is the declarative half of a source adapter: every
//! selector, keyword list and entry URL that differs between listing sites.
//! The traversal engine in `leadscout-scraper` is the same for all of them.

use crate::error::{Result, SiteError};
use leadscout_browser::Locator;
use leadscout_core::SourceId;
use serde::{Deserialize, Serialize};

/// Complete definition of one listings site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteDefinition {
    /// Site identity
    pub site: SiteMetadata,

    /// Listing categories crawled in order (e.g. for-sale, for-rent)
    pub categories: Vec<Category>,

    /// Selectors applied to listing cards
    pub listing: ListingSelectors,

    /// Locators used on the detail page
    #[serde(default)]
    pub detail: DetailSelectors,

    /// Keyword screening of page text
    #[serde(default)]
    pub screening: Screening,

    /// Next-page controls
    #[serde(default)]
    pub pagination: Pagination,

    /// Cookie banner accept buttons, tried in order
    #[serde(default = "default_consent")]
    pub consent: Vec<Locator>,

    /// URL patterns aborted at the network layer on every page
    #[serde(default = "default_blocked_resources")]
    pub blocked_resources: Vec<String>,
}

impl SiteDefinition {
    /// Site tag.
    #[must_use]
    pub fn id(&self) -> SourceId {
        self.site.id
    }

    /// Human-readable site name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.site.name
    }

    /// Ordering key within a run; lower runs first.
    #[must_use]
    pub fn priority(&self) -> u32 {
        self.site.priority
    }

    /// Resolve a possibly relative link against the site's base URL.
    ///
    /// Returns `None` when the link is empty or cannot be resolved.
    #[must_use]
    pub fn resolve_link(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with("javascript:") || href.starts_with('#') {
            return None;
        }
        let base = url::Url::parse(&self.site.base_url).ok()?;
        base.join(href).ok().map(String::from)
    }

    /// Validate the definition.
    ///
    /// # Errors
    /// Returns error if required fields are empty or a selector is not valid CSS.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| SiteError::ValidationError {
            site: self.site.id.to_string(),
            reason,
        };

        if self.site.name.trim().is_empty() {
            return Err(fail("site name cannot be empty".to_string()));
        }

        if url::Url::parse(&self.site.base_url).is_err() {
            return Err(fail(format!("invalid base_url {:?}", self.site.base_url)));
        }

        if self.categories.is_empty() {
            return Err(fail("at least one category is required".to_string()));
        }

        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(fail("category name cannot be empty".to_string()));
            }
            if url::Url::parse(&category.url).is_err() {
                return Err(fail(format!(
                    "invalid URL for category {}: {:?}",
                    category.name, category.url
                )));
            }
        }

        if self.listing.cards.is_empty() {
            return Err(fail("at least one card selector is required".to_string()));
        }

        if self.listing.link.is_empty() {
            return Err(fail("at least one link selector is required".to_string()));
        }

        let field_css = self
            .listing
            .link
            .iter()
            .chain(&self.listing.title)
            .chain(&self.listing.price)
            .chain(&self.listing.location)
            .map(|field| field.css.as_str());

        let locator_css = self
            .listing
            .cards
            .iter()
            .chain(&self.detail.address)
            .chain(&self.detail.description)
            .chain(&self.detail.phone_reveal)
            .chain(&self.detail.phone_value)
            .chain(&self.pagination.next)
            .chain(&self.consent)
            .map(|locator| locator.css.as_str());

        for css in field_css.chain(locator_css) {
            if scraper::Selector::parse(css).is_err() {
                return Err(fail(format!("invalid CSS selector {css:?}")));
            }
        }

        Ok(())
    }
}

/// Site identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteMetadata {
    /// Site tag (e.g. "milanuncios")
    pub id: SourceId,

    /// Human-readable site name
    pub name: String,

    /// Origin used to resolve relative detail links
    pub base_url: String,

    /// Ordering key; lower runs first
    #[serde(default)]
    pub priority: u32,
}

/// One listing category with its entry URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Category name used in logs (e.g. "venta")
    pub name: String,

    /// First results page
    pub url: String,
}

/// A CSS selector applied to a card snapshot, reading an attribute when
/// `attr` is set and the element text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    /// CSS selector relative to the card
    pub css: String,

    /// Attribute to read instead of the text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

/// Selectors applied to listing pages and their cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// Card containers; the first locator that matches anything wins
    pub cards: Vec<Locator>,

    /// Detail link, usually the `href` attribute
    pub link: Vec<FieldSelector>,

    /// Listing title
    #[serde(default)]
    pub title: Vec<FieldSelector>,

    /// Price text
    #[serde(default)]
    pub price: Vec<FieldSelector>,

    /// Location text shown on the card
    #[serde(default)]
    pub location: Vec<FieldSelector>,
}

/// Locators used on the detail page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailSelectors {
    /// Address text
    #[serde(default)]
    pub address: Vec<Locator>,

    /// Free-text description scanned for phone numbers
    #[serde(default)]
    pub description: Vec<Locator>,

    /// Controls that reveal the phone number when clicked
    #[serde(default)]
    pub phone_reveal: Vec<Locator>,

    /// Elements holding the revealed number
    #[serde(default)]
    pub phone_value: Vec<Locator>,

    /// Scan the description for a phone number when no control yields one
    #[serde(default)]
    pub scan_description_for_phone: bool,
}

/// Keyword screening of page text. All matching is case-insensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Screening {
    /// Anti-bot challenge indicators; a hit ends the current category
    #[serde(default)]
    pub challenge_keywords: Vec<String>,

    /// Professional or agency indicators; a hit skips the listing
    #[serde(default)]
    pub reject_keywords: Vec<String>,

    /// The detail page must mention at least one; empty means no requirement
    #[serde(default)]
    pub require_keywords: Vec<String>,
}

impl Screening {
    /// Whether the text shows an anti-bot challenge.
    #[must_use]
    pub fn is_challenge(&self, text: &str) -> bool {
        contains_any(text, &self.challenge_keywords)
    }

    /// Whether a detail page passes the private-seller screening.
    #[must_use]
    pub fn accepts(&self, text: &str) -> bool {
        if contains_any(text, &self.reject_keywords) {
            return false;
        }
        self.require_keywords.is_empty() || contains_any(text, &self.require_keywords)
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return false;
    }
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .any(|keyword| haystack.contains(&keyword.to_lowercase()))
}

/// Next-page controls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pagination {
    /// Locators of the "next page" control
    #[serde(default)]
    pub next: Vec<Locator>,
}

/// Cookie banner accept buttons shared by the Spanish listing sites.
#[must_use]
pub fn default_consent() -> Vec<Locator> {
    vec![
        Locator::css("#didomi-notice-agree-button"),
        Locator::css("#onetrust-accept-btn-handler"),
        Locator::with_text("button", "Aceptar todas"),
        Locator::with_text("button", "Aceptar"),
    ]
}

/// Images and fonts.
#[must_use]
pub fn default_blocked_resources() -> Vec<String> {
    ["png", "jpg", "jpeg", "gif", "svg", "webp", "woff", "woff2"]
        .iter()
        .map(|ext| format!("*.{ext}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[site]
id = "fotocasa"
name = "Fotocasa"
base_url = "https://www.fotocasa.es"

[[categories]]
name = "venta"
url = "https://www.fotocasa.es/es/comprar/viviendas/barcelona-provincia/publicado-por-particular/l"

[listing]
cards = [{ css = "article.re-CardPackMinimal" }]
link = [{ css = "a.re-CardPackMinimal-info-container", attr = "href" }]
"#;

    fn minimal() -> SiteDefinition {
        toml::from_str(MINIMAL).expect("parse minimal definition")
    }

    #[test]
    fn test_minimal_definition_gets_defaults() {
        let def = minimal();
        assert_eq!(def.id(), SourceId::Fotocasa);
        assert_eq!(def.priority(), 0);
        assert_eq!(def.consent.len(), 4);
        assert!(def.blocked_resources.contains(&"*.woff2".to_string()));
        assert!(def.pagination.next.is_empty());
        assert!(!def.detail.scan_description_for_phone);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_link() {
        let mut def = minimal();
        def.listing.link.clear();
        let err = def.validate().expect_err("no link selector");
        assert!(matches!(err, SiteError::ValidationError { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_css() {
        let mut def = minimal();
        def.detail.phone_reveal = vec![Locator::css("button:has-text('Ver')")];
        let err = def.validate().expect_err("playwright pseudo-class");
        assert!(err.to_string().contains("invalid CSS selector"));
    }

    #[test]
    fn test_validate_rejects_bad_category_url() {
        let mut def = minimal();
        def.categories[0].url = "/relative".to_string();
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_resolve_link() {
        let def = minimal();
        assert_eq!(
            def.resolve_link("/es/comprar/vivienda/barcelona/123456789/d").as_deref(),
            Some("https://www.fotocasa.es/es/comprar/vivienda/barcelona/123456789/d")
        );
        assert_eq!(
            def.resolve_link("https://other.example/x").as_deref(),
            Some("https://other.example/x")
        );
        assert_eq!(def.resolve_link("  "), None);
        assert_eq!(def.resolve_link("javascript:void(0)"), None);
    }

    #[test]
    fn test_screening() {
        let screening = Screening {
            challenge_keywords: vec!["captcha".to_string(), "no eres un robot".to_string()],
            reject_keywords: vec!["profesional".to_string()],
            require_keywords: vec!["particular".to_string(), "propietario".to_string()],
        };

        assert!(screening.is_challenge("Por favor, confirma que NO ERES UN ROBOT"));
        assert!(!screening.is_challenge("Piso luminoso"));

        assert!(screening.accepts("Anuncio de Particular"));
        assert!(screening.accepts("Vende el propietario"));
        assert!(!screening.accepts("Vendedor profesional, particular"));
        assert!(!screening.accepts("Piso luminoso"));

        assert!(Screening::default().accepts("anything"));
        assert!(!Screening::default().is_challenge("captcha"));
    }
}
