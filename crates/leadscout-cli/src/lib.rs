//! Leadscout process entry points.
//!
//! The `leadscout` binary wires configuration, site definitions, the browser
//! launcher and the lead database together. [`crawl`] runs one crawl end to
//! end; [`server`] exposes it behind an authenticated HTTP trigger.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod crawl;
pub mod server;

pub use crawl::{load_registry, CrawlOutcome, CrawlRunner, CrawlService};
pub use server::{router, serve, AppState};
