//! Lead storage.
//!
//! Rows are keyed by phone number: inserting a lead whose phone is already
//! stored is a no-op, so repeated crawls never duplicate a contact.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use leadscout_core::{Lead, SourceId};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

/// A lead as read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredLead {
    /// Row id
    pub id: i64,
    /// Source-prefixed listing identifier
    pub external_id: String,
    /// Listing title
    pub title: String,
    /// Asking price
    pub price: Option<i64>,
    /// Normalized phone number (unique)
    pub phone: String,
    /// Free-text address
    pub address: String,
    /// Latitude, set together with `lng`
    pub lat: Option<f64>,
    /// Longitude, set together with `lat`
    pub lng: Option<f64>,
    /// Distance to the reference point in km
    pub distance_km: f64,
    /// Site the lead came from
    pub source: SourceId,
    /// Lifecycle tag
    pub status: String,
    /// When the row was first inserted
    pub created_at: DateTime<Utc>,
}

/// Insert `leads` in one transaction, skipping phones that are already stored.
///
/// Returns how many rows were newly inserted.
///
/// # Errors
/// Returns `DatabaseError` if the transaction fails; nothing is written then.
pub async fn insert_leads(pool: &Pool<Sqlite>, leads: &[Lead]) -> Result<usize> {
    if leads.is_empty() {
        return Ok(0);
    }

    let created_at = Utc::now().to_rfc3339();
    let mut tx = pool.begin().await?;
    let mut inserted = 0usize;

    for lead in leads {
        let result = sqlx::query(
            "INSERT INTO leads (external_id, title, price, phone, address, lat, lng,
                                distance_km, source, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(phone) DO NOTHING",
        )
        .bind(lead.external_id())
        .bind(lead.title())
        .bind(lead.price())
        .bind(lead.phone())
        .bind(lead.address())
        .bind(lead.lat())
        .bind(lead.lng())
        .bind(lead.distance_km())
        .bind(lead.source().as_str())
        .bind(lead.status().as_str())
        .bind(&created_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        } else {
            tracing::debug!(external_id = %lead.external_id(), "phone already stored, skipping");
        }
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Most recent leads first.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or a row cannot be decoded.
pub async fn list_leads(pool: &Pool<Sqlite>, limit: i64) -> Result<Vec<StoredLead>> {
    let rows = sqlx::query(
        "SELECT id, external_id, title, price, phone, address, lat, lng,
                distance_km, source, status, created_at
         FROM leads
         ORDER BY created_at DESC, id DESC
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(parse_lead_row).collect()
}

/// Look up a lead by its phone number.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or the row cannot be decoded.
pub async fn find_by_phone(pool: &Pool<Sqlite>, phone: &str) -> Result<Option<StoredLead>> {
    let row = sqlx::query(
        "SELECT id, external_id, title, price, phone, address, lat, lng,
                distance_km, source, status, created_at
         FROM leads
         WHERE phone = ?",
    )
    .bind(phone)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(parse_lead_row).transpose()
}

/// Number of stored leads, optionally for one source.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn count_leads(pool: &Pool<Sqlite>, source: Option<SourceId>) -> Result<i64> {
    let count: i64 = match source {
        Some(source) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM leads WHERE source = ?")
                .bind(source.as_str())
                .fetch_one(pool)
                .await?
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM leads")
                .fetch_one(pool)
                .await?
        }
    };
    Ok(count)
}

fn parse_lead_row(row: &SqliteRow) -> Result<StoredLead> {
    let source: String = row.try_get("source")?;
    let source = source
        .parse::<SourceId>()
        .map_err(|e| DatabaseError::Decode(e.to_string()))?;

    let created_at: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| DatabaseError::Decode(format!("invalid created_at '{created_at}': {e}")))?
        .with_timezone(&Utc);

    Ok(StoredLead {
        id: row.try_get("id")?,
        external_id: row.try_get("external_id")?,
        title: row.try_get("title")?,
        price: row.try_get("price")?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        lat: row.try_get("lat")?,
        lng: row.try_get("lng")?,
        distance_km: row.try_get("distance_km")?,
        source,
        status: row.try_get("status")?,
        created_at,
    })
}
