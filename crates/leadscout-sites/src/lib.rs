//! Leadscout Sites - declarative per-site definitions.
//!
//! Everything that differs between listing sites (entry URLs, card selectors,
//! phone controls, screening keywords, pagination) lives in TOML files under
//! `site-definitions/`. This crate loads, validates and caches them; the
//! shared traversal engine in `leadscout-scraper` consumes them.
//!
//! # Example
//!
//! ```rust
//! use leadscout_core::SourceId;
//! use leadscout_sites::SiteRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SiteRegistry::builtin()?;
//! let sites = registry.ordered(&[SourceId::Milanuncios]);
//! assert_eq!(sites[0].name(), "Milanuncios");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod builtin;
pub mod definition;
pub mod error;
pub mod loader;
pub mod registry;

pub use definition::{
    Category, DetailSelectors, FieldSelector, ListingSelectors, Pagination, Screening,
    SiteDefinition, SiteMetadata,
};
pub use error::{Result, SiteError};
pub use loader::SiteLoader;
pub use registry::SiteRegistry;
