//! Leadscout Database Layer
//!
//! `SQLite` storage for accepted leads and the crawl run journal, using
//! `SQLx` with embedded migrations.
//!
//! # Example
//!
//! ```ignore
//! use leadscout_db::{Database, LeadSink};
//!
//! let db = Database::new("leads.db").await?;
//! db.run_migrations().await?;
//! let processed = db.lead_sink().upsert(&report.leads).await;
//! ```
//!
//! # Design Principles
//!
//! - The phone number is the deduplication key; duplicates are skipped, not updated
//! - Lead batches are written in one transaction
//! - The [`LeadSink`] boundary never raises; failures are logged and reported as 0

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod leads;
pub mod migrations;
pub mod runs;
pub mod sink;

// Re-export commonly used types
pub use error::{DatabaseError, Result};
pub use leads::StoredLead;
pub use runs::CrawlRun;
pub use sink::{LeadSink, SqliteLeadSink};

use std::path::Path;

/// High-level database handle.
#[derive(Debug, Clone)]
pub struct Database {
    pool: sqlx::Pool<sqlx::Sqlite>,
}

impl Database {
    /// Open (creating if needed) the database at `path`, or `:memory:`.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connection::open_pool(path).await?;
        Ok(Self { pool })
    }

    /// Open the database and bring the schema up to date.
    ///
    /// # Errors
    /// Returns `DatabaseError` if opening or migrating fails.
    pub async fn open_migrated(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self::new(path).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run all pending database migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get the current schema version.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the version cannot be queried.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        &self.pool
    }

    /// A [`LeadSink`] writing into this database.
    #[must_use]
    pub fn lead_sink(&self) -> SqliteLeadSink {
        SqliteLeadSink::new(self.pool.clone())
    }

    /// Open a crawl run.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the insert fails.
    pub async fn create_run(&self) -> Result<CrawlRun> {
        runs::create_run(&self.pool).await
    }

    /// Complete a crawl run.
    ///
    /// # Errors
    /// Returns `DatabaseError::NotFound` if the run does not exist.
    pub async fn finish_run(
        &self,
        run_id: &str,
        total_leads: usize,
        stored_leads: usize,
        summary: &serde_json::Value,
    ) -> Result<()> {
        runs::finish_run(&self.pool, run_id, total_leads, stored_leads, summary).await
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
