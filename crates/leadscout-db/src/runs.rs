//! Crawl run journal.
//!
//! A run row is created before the orchestrator starts and completed once the
//! leads have been handed to the sink.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

/// One crawl as recorded in `crawl_runs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlRun {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// When the crawl started
    pub started_at: DateTime<Utc>,
    /// When the crawl finished (None while running)
    pub finished_at: Option<DateTime<Utc>>,
    /// Leads collected by the orchestrator
    pub total_leads: i64,
    /// Leads reported by the sink
    pub stored_leads: i64,
    /// Per-source summary
    pub summary: JsonValue,
}

/// Open a new run.
///
/// # Errors
/// Returns `DatabaseError` if the insert fails.
pub async fn create_run(pool: &Pool<Sqlite>) -> Result<CrawlRun> {
    let id = uuid::Uuid::new_v4().to_string();
    let started_at = Utc::now();

    sqlx::query("INSERT INTO crawl_runs (id, started_at) VALUES (?, ?)")
        .bind(&id)
        .bind(started_at.to_rfc3339())
        .execute(pool)
        .await?;

    tracing::debug!(run_id = %id, "crawl run opened");

    Ok(CrawlRun {
        id,
        started_at,
        finished_at: None,
        total_leads: 0,
        stored_leads: 0,
        summary: JsonValue::Object(serde_json::Map::new()),
    })
}

/// Complete a run with its counts and summary.
///
/// # Errors
/// Returns `DatabaseError::NotFound` if no run has this id.
pub async fn finish_run(
    pool: &Pool<Sqlite>,
    run_id: &str,
    total_leads: usize,
    stored_leads: usize,
    summary: &JsonValue,
) -> Result<()> {
    let summary_json = serde_json::to_string(summary)
        .map_err(|e| DatabaseError::Query(format!("failed to serialize summary: {e}")))?;

    let result = sqlx::query(
        "UPDATE crawl_runs
         SET finished_at = ?, total_leads = ?, stored_leads = ?, summary = ?
         WHERE id = ?",
    )
    .bind(Utc::now().to_rfc3339())
    .bind(i64::try_from(total_leads).unwrap_or(i64::MAX))
    .bind(i64::try_from(stored_leads).unwrap_or(i64::MAX))
    .bind(&summary_json)
    .bind(run_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!(
            "Crawl run '{run_id}' not found"
        )));
    }
    Ok(())
}

/// Fetch one run.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or the row cannot be decoded.
pub async fn get_run(pool: &Pool<Sqlite>, run_id: &str) -> Result<Option<CrawlRun>> {
    let row = sqlx::query(
        "SELECT id, started_at, finished_at, total_leads, stored_leads, summary
         FROM crawl_runs WHERE id = ?",
    )
    .bind(run_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(parse_run_row).transpose()
}

/// Latest runs first.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or a row cannot be decoded.
pub async fn recent_runs(pool: &Pool<Sqlite>, limit: i64) -> Result<Vec<CrawlRun>> {
    let rows = sqlx::query(
        "SELECT id, started_at, finished_at, total_leads, stored_leads, summary
         FROM crawl_runs ORDER BY started_at DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(parse_run_row).collect()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Decode(format!("invalid timestamp '{raw}': {e}")))
}

fn parse_run_row(row: &SqliteRow) -> Result<CrawlRun> {
    let started_at: String = row.try_get("started_at")?;
    let finished_at: Option<String> = row.try_get("finished_at")?;
    let summary: String = row.try_get("summary")?;

    Ok(CrawlRun {
        id: row.try_get("id")?,
        started_at: parse_timestamp(&started_at)?,
        finished_at: finished_at.as_deref().map(parse_timestamp).transpose()?,
        total_leads: row.try_get("total_leads")?,
        stored_leads: row.try_get("stored_leads")?,
        summary: serde_json::from_str(&summary).unwrap_or(JsonValue::Null),
    })
}
