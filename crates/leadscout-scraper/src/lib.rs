//! Leadscout Scraper - multi-source crawl orchestration.
//!
//! This crate turns site definitions into leads. It drives the browser
//! through a shared traversal engine, resolves contact details with ordered
//! fallback strategies, screens positions against the radius filter and keeps
//! the whole run inside a global lead budget.
//!
//! # Components
//!
//! - [`orchestrator`] - runs sources in order under the shared [`CrawlBudget`]
//! - [`lifecycle`] - one isolated browser session per source, failures contained
//! - [`traversal`] - the category/page/card loop shared by every site
//! - [`extract`] - coordinate and phone fallback chains
//! - [`parser`] - listing card snapshots, prices and listing ids
//!
//! # Example
//!
//! ```rust,ignore
//! use leadscout_browser::ChromiumLauncher;
//! use leadscout_scraper::{CrawlOrchestrator, ScrapeSettings};
//! use std::sync::Arc;
//!
//! let orchestrator = CrawlOrchestrator::for_sites(
//!     Arc::new(ChromiumLauncher::new(config.browser.clone())),
//!     registry.ordered(&config.crawl.sources),
//!     &ScrapeSettings::from_config(&config),
//!     config.crawl.max_leads,
//! );
//!
//! let report = orchestrator.run().await;
//! println!("{} leads", report.total());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod budget;
#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod extract;
#[allow(missing_docs)]
pub mod lifecycle;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod parser;
#[allow(missing_docs)]
pub mod traversal;

// Re-export commonly used types
pub use budget::CrawlBudget;
pub use error::{Result, ScrapeError};
pub use extract::{ContactDetails, ContactExtractionPipeline};
pub use lifecycle::{ScraperLifecycle, SourceRun};
pub use orchestrator::{CrawlOrchestrator, CrawlReport, SourceSummary};
pub use parser::{external_id, parse_price, CardParser, ListingCard};
pub use traversal::{CardOutcome, ScrapeSettings, SectionEnd, SiteScraper, SkipReason, SourceAdapter};
