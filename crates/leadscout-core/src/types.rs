//! Shared types used across Leadscout.
//!
//! This module defines the site tags, coordinates, and the validated
//! [`Lead`] record that the scraper hands to persistence.

use crate::error::{LeadError, LeadscoutError};
use crate::geo::GeoVerdict;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum title length, in characters, kept on a lead.
pub const MAX_TITLE_CHARS: usize = 255;

/// Identifier of a classified-listings site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// idealista.com
    Idealista,
    /// fotocasa.es
    Fotocasa,
    /// milanuncios.com
    Milanuncios,
    /// habitaclia.com
    Habitaclia,
}

impl SourceId {
    /// Every known source.
    pub const ALL: [SourceId; 4] = [
        Self::Idealista,
        Self::Fotocasa,
        Self::Milanuncios,
        Self::Habitaclia,
    ];

    /// Stable lowercase tag, used in logs, ids and storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idealista => "idealista",
            Self::Fotocasa => "fotocasa",
            Self::Milanuncios => "milanuncios",
            Self::Habitaclia => "habitaclia",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = LeadscoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == needle)
            .ok_or_else(|| LeadscoutError::UnknownSource(s.to_string()))
    }
}

/// A latitude/longitude pair in degrees.
///
/// Both halves are always present together; an unresolved position is
/// `Option::<Coordinates>::None`, never `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl Coordinates {
    /// Create a coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both halves are finite and inside the valid degree ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Lifecycle tag of a lead. The core only ever creates `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    /// Freshly discovered, not yet contacted
    New,
}

impl LeadStatus {
    /// Storage representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
        }
    }
}

/// Raw fields of a candidate listing, before validation.
#[derive(Debug, Clone)]
pub struct LeadDraft {
    /// Source-prefixed listing identifier
    pub external_id: String,
    /// Listing title as shown on the card
    pub title: String,
    /// Parsed price, if any
    pub price: Option<i64>,
    /// Normalized phone number
    pub phone: String,
    /// Free-text address
    pub address: String,
    /// Site the listing came from
    pub source: SourceId,
}

/// A validated, contactable listing accepted for persistence.
///
/// Leads can only be built through [`Lead::new`], which enforces that the
/// phone is present and that the geo screening passed. They are immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lead {
    external_id: String,
    title: String,
    price: Option<i64>,
    phone: String,
    address: String,
    #[serde(flatten)]
    coordinates: Option<Coordinates>,
    distance_km: f64,
    source: SourceId,
    status: LeadStatus,
}

impl Lead {
    /// Build a lead from a draft and the outcome of geo screening.
    ///
    /// The title is trimmed and truncated to [`MAX_TITLE_CHARS`] characters and
    /// the distance is rounded to one decimal.
    ///
    /// # Errors
    /// Returns [`LeadError`] when the phone or external id is empty, or when
    /// the verdict places the listing outside the radius.
    pub fn new(draft: LeadDraft, verdict: GeoVerdict) -> Result<Self, LeadError> {
        let phone = draft.phone.trim().to_string();
        if !phone.chars().any(|c| c.is_ascii_digit()) {
            return Err(LeadError::EmptyPhone);
        }

        let external_id = draft.external_id.trim().to_string();
        if external_id.is_empty() {
            return Err(LeadError::EmptyExternalId);
        }

        let coordinates = match verdict {
            GeoVerdict::Unlocated => None,
            GeoVerdict::Within { coordinates, .. } => Some(coordinates),
            GeoVerdict::OutOfRadius { distance_km, .. } => {
                return Err(LeadError::OutOfRadius { distance_km })
            }
        };

        Ok(Self {
            external_id,
            title: draft.title.trim().chars().take(MAX_TITLE_CHARS).collect(),
            price: draft.price,
            phone,
            address: draft.address.trim().to_string(),
            coordinates,
            distance_km: round_one_decimal(verdict.distance_km()),
            source: draft.source,
            status: LeadStatus::New,
        })
    }

    /// Source-prefixed listing identifier.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Listing title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Asking price, if one could be parsed.
    #[must_use]
    pub fn price(&self) -> Option<i64> {
        self.price
    }

    /// Normalized phone number.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Free-text address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Resolved position, if any.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    /// Latitude, present exactly when longitude is.
    #[must_use]
    pub fn lat(&self) -> Option<f64> {
        self.coordinates.map(|c| c.lat)
    }

    /// Longitude, present exactly when latitude is.
    #[must_use]
    pub fn lng(&self) -> Option<f64> {
        self.coordinates.map(|c| c.lng)
    }

    /// Distance to the reference point rounded to 0.1 km (0 when unlocated).
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Site the lead came from.
    #[must_use]
    pub fn source(&self) -> SourceId {
        self.source
    }

    /// Lifecycle tag.
    #[must_use]
    pub fn status(&self) -> LeadStatus {
        self.status
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(phone: &str) -> LeadDraft {
        LeadDraft {
            external_id: "milanuncios-12345678".to_string(),
            title: "  Piso en Gràcia  ".to_string(),
            price: Some(250_000),
            phone: phone.to_string(),
            address: " Gràcia, Barcelona ".to_string(),
            source: SourceId::Milanuncios,
        }
    }

    #[test]
    fn test_source_id_round_trip() {
        for source in SourceId::ALL {
            assert_eq!(source.as_str().parse::<SourceId>().unwrap(), source);
        }
        assert_eq!("  Fotocasa ".parse::<SourceId>().unwrap(), SourceId::Fotocasa);
        assert!("wallapop".parse::<SourceId>().is_err());
    }

    #[test]
    fn test_source_id_serialization() {
        let json = serde_json::to_string(&SourceId::Habitaclia).expect("serialize source");
        assert_eq!(json, "\"habitaclia\"");
    }

    #[test]
    fn test_lead_rejects_empty_phone() {
        assert_eq!(
            Lead::new(draft(""), GeoVerdict::Unlocated),
            Err(LeadError::EmptyPhone)
        );
        assert_eq!(
            Lead::new(draft("+"), GeoVerdict::Unlocated),
            Err(LeadError::EmptyPhone)
        );
    }

    #[test]
    fn test_lead_rejects_out_of_radius() {
        let verdict = GeoVerdict::OutOfRadius {
            coordinates: Coordinates::new(40.41, -3.70),
            distance_km: 505.2,
        };
        assert!(matches!(
            Lead::new(draft("666111222"), verdict),
            Err(LeadError::OutOfRadius { .. })
        ));
    }

    #[test]
    fn test_unlocated_lead_has_zero_distance() {
        let lead = Lead::new(draft("666111222"), GeoVerdict::Unlocated).expect("valid lead");
        assert_eq!(lead.lat(), None);
        assert_eq!(lead.lng(), None);
        assert!(lead.distance_km().abs() < f64::EPSILON);
        assert_eq!(lead.status(), LeadStatus::New);
        assert_eq!(lead.title(), "Piso en Gràcia");
        assert_eq!(lead.address(), "Gràcia, Barcelona");
    }

    #[test]
    fn test_located_lead_keeps_both_coordinates() {
        let verdict = GeoVerdict::Within {
            coordinates: Coordinates::new(41.40, 2.17),
            distance_km: 1.6849,
        };
        let lead = Lead::new(draft("666111222"), verdict).expect("valid lead");
        assert_eq!(lead.lat(), Some(41.40));
        assert_eq!(lead.lng(), Some(2.17));
        assert!((lead.distance_km() - 1.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_title_truncated_by_characters() {
        let mut d = draft("666111222");
        d.title = "á".repeat(300);
        let lead = Lead::new(d, GeoVerdict::Unlocated).expect("valid lead");
        assert_eq!(lead.title().chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_lead_serialization_flattens_coordinates() {
        let verdict = GeoVerdict::Within {
            coordinates: Coordinates::new(41.40, 2.17),
            distance_km: 1.7,
        };
        let lead = Lead::new(draft("666111222"), verdict).expect("valid lead");
        let json = serde_json::to_value(&lead).expect("serialize lead");
        assert_eq!(json["lat"], 41.40);
        assert_eq!(json["lng"], 2.17);
        assert_eq!(json["status"], "new");
        assert_eq!(json["source"], "milanuncios");

        let unlocated = Lead::new(draft("666111222"), GeoVerdict::Unlocated).expect("valid lead");
        let json = serde_json::to_value(&unlocated).expect("serialize lead");
        assert!(json.get("lat").is_none());
        assert!(json.get("lng").is_none());
    }
}
