//! Leadscout Core - Foundation crate for the Leadscout lead generator.
//!
//! This crate provides the types every other Leadscout crate shares: the
//! validated [`Lead`] record, the [`SourceId`] tag of each listings site, the
//! great-circle [`GeoFilter`], configuration management and the central error
//! types.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and records (`SourceId`, `Lead`, `Coordinates`)
//! - [`geo`] - Haversine distance and radius membership
//!
//! # Example
//!
//! ```rust
//! use leadscout_core::{Coordinates, GeoFilter};
//!
//! let filter = GeoFilter::default();
//! let sants = Coordinates::new(41.40, 2.17);
//! assert!(filter.within_radius(sants));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod geo;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, CrawlConfig, DelayRange, GeoConfig, PacingConfig, ServerConfig,
    StorageConfig,
};
pub use error::{ConfigError, ConfigResult, LeadError, LeadscoutError, Result};
pub use geo::{haversine_km, GeoFilter, GeoVerdict, BARCELONA, DEFAULT_RADIUS_KM, EARTH_RADIUS_KM};
pub use types::{Coordinates, Lead, LeadDraft, LeadStatus, SourceId, MAX_TITLE_CHARS};
