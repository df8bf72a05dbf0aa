//! Lead store errors.

use thiserror::Error;

/// Failures from the lead store.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The SQLite file could not be created or the pool failed to connect.
    #[error("cannot open lead database: {0}")]
    Open(String),

    /// An embedded migration did not apply.
    #[error("schema migration failed: {0}")]
    Migration(String),

    /// A statement other than a plain SQLite error failed.
    #[error("lead store query failed: {0}")]
    Query(String),

    /// No crawl run or lead with the requested key.
    #[error("{0}")]
    NotFound(String),

    /// A stored column could not be turned back into its Rust type.
    #[error("bad stored value: {0}")]
    Decode(String),

    /// Error raised by `sqlx`.
    #[error("sqlite: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Filesystem error around the database file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for lead store operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
