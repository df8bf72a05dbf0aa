//! Browser automation capability for Leadscout.
//!
//! The scraper talks to the browser only through the [`SessionLauncher`],
//! [`BrowserSession`] and [`PageActions`] traits. [`ChromiumLauncher`] is the
//! chromiumoxide implementation; tests substitute in-memory fakes.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod locator;
pub mod pacing;
mod script;

pub use actions::{BrowserSession, PageActions, SessionLauncher};
pub use engine::{BrowserEngine, ChromiumLauncher, ChromiumPage};
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
pub use locator::Locator;
pub use pacing::random_delay;
