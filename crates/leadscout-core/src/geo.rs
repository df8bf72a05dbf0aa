//! Great-circle distance and radius membership against a fixed reference point.

use crate::types::Coordinates;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default reference point: Barcelona city centre.
pub const BARCELONA: Coordinates = Coordinates {
    lat: 41.3851,
    lng: 2.1734,
};

/// Default inclusion radius around the reference point.
pub const DEFAULT_RADIUS_KM: f64 = 80.0;

/// Haversine distance in kilometres between two points given in degrees.
#[must_use]
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Outcome of screening a listing's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoVerdict {
    /// No coordinates were resolved; the listing is kept with distance 0.
    Unlocated,
    /// Coordinates resolved and inside the radius (boundary inclusive).
    Within {
        /// Resolved position
        coordinates: Coordinates,
        /// Unrounded distance to the reference point
        distance_km: f64,
    },
    /// Coordinates resolved and outside the radius.
    OutOfRadius {
        /// Resolved position
        coordinates: Coordinates,
        /// Unrounded distance to the reference point
        distance_km: f64,
    },
}

impl GeoVerdict {
    /// Whether the listing may become a lead.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::OutOfRadius { .. })
    }

    /// Distance to the reference point, 0 when unlocated.
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        match self {
            Self::Unlocated => 0.0,
            Self::Within { distance_km, .. } | Self::OutOfRadius { distance_km, .. } => {
                *distance_km
            }
        }
    }
}

/// Radius filter around a fixed reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFilter {
    reference: Coordinates,
    radius_km: f64,
}

impl GeoFilter {
    /// Create a filter for the given reference point and radius.
    #[must_use]
    pub fn new(reference: Coordinates, radius_km: f64) -> Self {
        Self {
            reference,
            radius_km,
        }
    }

    /// Reference point of this filter.
    #[must_use]
    pub fn reference(&self) -> Coordinates {
        self.reference
    }

    /// Inclusion radius in kilometres.
    #[must_use]
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Distance from the reference point to `point`.
    #[must_use]
    pub fn distance_km(&self, point: Coordinates) -> f64 {
        haversine_km(self.reference, point)
    }

    /// Whether `point` lies within the radius. The boundary is inclusive.
    #[must_use]
    pub fn within_radius(&self, point: Coordinates) -> bool {
        self.distance_km(point) <= self.radius_km
    }

    /// Screen an optional position. Missing coordinates never disqualify.
    #[must_use]
    pub fn check(&self, coordinates: Option<Coordinates>) -> GeoVerdict {
        let Some(coordinates) = coordinates else {
            return GeoVerdict::Unlocated;
        };

        let distance_km = self.distance_km(coordinates);
        if distance_km <= self.radius_km {
            GeoVerdict::Within {
                coordinates,
                distance_km,
            }
        } else {
            GeoVerdict::OutOfRadius {
                coordinates,
                distance_km,
            }
        }
    }
}

impl Default for GeoFilter {
    fn default() -> Self {
        Self::new(BARCELONA, DEFAULT_RADIUS_KM)
    }
}
