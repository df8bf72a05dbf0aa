use leadscout_core::SourceId;
use leadscout_sites::{FieldSelector, SiteDefinition};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Fields read from one listing card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingCard {
    pub title: String,
    pub price: Option<i64>,
    /// Absolute detail URL, when one could be resolved
    pub link: Option<String>,
    pub location: Option<String>,
}

pub struct CardParser<'a> {
    definition: &'a SiteDefinition,
}

impl<'a> CardParser<'a> {
    pub fn new(definition: &'a SiteDefinition) -> Self {
        Self { definition }
    }

    /// Parse a card from its outer HTML snapshot.
    pub fn parse(&self, card_html: &str) -> ListingCard {
        let fragment = Html::parse_fragment(card_html);
        let root = fragment.root_element();
        let listing = &self.definition.listing;

        let link = first_value(root, &listing.link)
            .and_then(|href| self.definition.resolve_link(&href));

        ListingCard {
            title: first_value(root, &listing.title).unwrap_or_default(),
            price: first_value(root, &listing.price).and_then(|text| parse_price(&text)),
            link,
            location: first_value(root, &listing.location),
        }
    }
}

/// First non-empty value produced by the selectors, tried in order.
fn first_value(root: ElementRef<'_>, selectors: &[FieldSelector]) -> Option<String> {
    selectors.iter().find_map(|field| {
        let selector = Selector::parse(&field.css).ok()?;
        root.select(&selector).find_map(|element| {
            let raw = match &field.attr {
                Some(attr) => element.value().attr(attr).map(str::to_string),
                None => Some(element.text().collect::<String>()),
            }?;
            let collapsed = collapse_whitespace(&raw);
            (!collapsed.is_empty()).then_some(collapsed)
        })
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep only the digits of a price label; nothing or zero means no price.
pub fn parse_price(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    match digits.parse::<i64>() {
        Ok(0) | Err(_) => None,
        Ok(price) => Some(price),
    }
}

static LISTING_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{5,}").expect("valid listing number regex"));

/// Source-prefixed listing identifier: the first run of five or more digits
/// in the detail URL, or the whole URL when it has none.
pub fn external_id(source: SourceId, detail_url: &str) -> String {
    let anchor = LISTING_NUMBER_REGEX
        .find(detail_url)
        .map_or(detail_url, |m| m.as_str());
    format!("{}-{}", source.as_str(), anchor)
}
