//! Coordinate resolution from a rendered detail page.
//!
//! Each strategy inspects the page HTML and either yields a position or
//! nothing; [`resolve_coordinates`] takes the first hit in order.

use leadscout_core::Coordinates;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

/// One way of finding a position on a page.
pub trait CoordinateStrategy: Send + Sync {
    /// Name used in trace logs.
    fn name(&self) -> &'static str;

    /// Resolved position, or `None` when this strategy found nothing.
    fn extract(&self, document: &Html) -> Option<Coordinates>;
}

/// `geo` (or `availableAtOrFrom.geo`) inside JSON-LD blocks.
pub struct LinkedData;

/// `center=`, `@` or `q=` parameters on an embedded map reference.
pub struct MapReference;

/// `data-latitude`/`data-lat` and `data-longitude`/`data-lng` attributes.
pub struct DataAttributes;

/// The strategies in the order they are tried.
pub fn default_strategies() -> Vec<Box<dyn CoordinateStrategy>> {
    vec![
        Box::new(LinkedData),
        Box::new(MapReference),
        Box::new(DataAttributes),
    ]
}

/// Run the default strategies over `html`.
pub fn resolve_coordinates(html: &str) -> Option<Coordinates> {
    let document = Html::parse_document(html);
    resolve_with(&document, &default_strategies())
}

/// Run `strategies` in order and return the first valid position.
pub fn resolve_with(
    document: &Html,
    strategies: &[Box<dyn CoordinateStrategy>],
) -> Option<Coordinates> {
    strategies.iter().find_map(|strategy| {
        let found = strategy.extract(document).filter(Coordinates::is_valid);
        if let Some(coordinates) = found {
            tracing::trace!(
                strategy = strategy.name(),
                lat = coordinates.lat,
                lng = coordinates.lng,
                "coordinates resolved"
            );
        }
        found
    })
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

impl CoordinateStrategy for LinkedData {
    fn name(&self) -> &'static str {
        "linked-data"
    }

    fn extract(&self, document: &Html) -> Option<Coordinates> {
        let scripts = selector(r#"script[type="application/ld+json"]"#)?;

        document.select(&scripts).find_map(|script| {
            let raw: String = script.text().collect();
            let value: Value = serde_json::from_str(raw.trim()).ok()?;
            find_geo(&value)
        })
    }
}

/// Look through an object, an array of objects, or an `@graph` list.
fn find_geo(value: &Value) -> Option<Coordinates> {
    match value {
        Value::Array(items) => items.iter().find_map(find_geo),
        Value::Object(map) => {
            if let Some(coordinates) = map.get("geo").and_then(geo_coordinates) {
                return Some(coordinates);
            }
            if let Some(coordinates) = map
                .get("availableAtOrFrom")
                .and_then(|place| place.get("geo"))
                .and_then(geo_coordinates)
            {
                return Some(coordinates);
            }
            map.get("@graph").and_then(find_geo)
        }
        _ => None,
    }
}

fn geo_coordinates(geo: &Value) -> Option<Coordinates> {
    let lat = json_float(geo.get("latitude")?)?;
    let lng = json_float(geo.get("longitude")?)?;
    Some(Coordinates::new(lat, lng))
}

fn json_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

static MAP_PARAMS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:center=|@|q=)(-?\d+(?:\.\d+)?)(?:,|%2C)(-?\d+(?:\.\d+)?)")
        .expect("valid map parameter regex")
});

/// Pull a position out of a map URL.
pub fn coordinates_from_map_url(url: &str) -> Option<Coordinates> {
    let caps = MAP_PARAMS_REGEX.captures(url)?;
    let lat = caps.get(1)?.as_str().parse().ok()?;
    let lng = caps.get(2)?.as_str().parse().ok()?;
    Some(Coordinates::new(lat, lng))
}

impl CoordinateStrategy for MapReference {
    fn name(&self) -> &'static str {
        "map-reference"
    }

    fn extract(&self, document: &Html) -> Option<Coordinates> {
        let refs = selector("img[src*='maps'], iframe[src*='maps'], a[href*='maps']")?;

        document.select(&refs).find_map(|element| {
            let attrs = element.value();
            let url = attrs.attr("src").or_else(|| attrs.attr("href"))?;
            coordinates_from_map_url(url)
        })
    }
}

impl CoordinateStrategy for DataAttributes {
    fn name(&self) -> &'static str {
        "data-attributes"
    }

    fn extract(&self, document: &Html) -> Option<Coordinates> {
        let tagged = selector("[data-latitude], [data-lat]")?;

        document.select(&tagged).find_map(|element| {
            let attrs = element.value();
            let lat = attrs.attr("data-latitude").or_else(|| attrs.attr("data-lat"))?;
            let lng = attrs
                .attr("data-longitude")
                .or_else(|| attrs.attr("data-lng"))?;
            Some(Coordinates::new(
                lat.trim().parse().ok()?,
                lng.trim().parse().ok()?,
            ))
        })
    }
}
