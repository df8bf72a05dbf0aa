//! The persistence boundary the crawl hands its leads to.

use crate::leads::insert_leads;
use async_trait::async_trait;
use leadscout_core::Lead;
use sqlx::{Pool, Sqlite};

/// Idempotent lead persistence.
///
/// Implementations must never fail loudly: a storage error is logged and
/// reported as `0`.
#[async_trait]
pub trait LeadSink: Send + Sync {
    /// Store `leads`, silently skipping ones whose phone is already known.
    /// Returns how many leads were processed, or 0 on failure.
    async fn upsert(&self, leads: &[Lead]) -> usize;
}

/// [`LeadSink`] backed by the `leads` table.
#[derive(Debug, Clone)]
pub struct SqliteLeadSink {
    pool: Pool<Sqlite>,
}

impl SqliteLeadSink {
    /// Create a sink over an already migrated pool.
    #[must_use]
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadSink for SqliteLeadSink {
    async fn upsert(&self, leads: &[Lead]) -> usize {
        if leads.is_empty() {
            return 0;
        }

        match insert_leads(&self.pool, leads).await {
            Ok(inserted) => {
                tracing::info!(
                    processed = leads.len(),
                    inserted,
                    duplicates = leads.len() - inserted,
                    "leads stored"
                );
                leads.len()
            }
            Err(e) => {
                tracing::error!(error = %e, leads = leads.len(), "storing leads failed");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::open_pool;
    use crate::leads::count_leads;
    use crate::migrations::run_migrations;
    use leadscout_core::{GeoVerdict, LeadDraft, SourceId};

    fn lead(phone: &str) -> Lead {
        Lead::new(
            LeadDraft {
                external_id: format!("idealista-{phone}"),
                title: "Piso".to_string(),
                price: None,
                phone: phone.to_string(),
                address: String::new(),
                source: SourceId::Idealista,
            },
            GeoVerdict::Unlocated,
        )
        .expect("valid lead")
    }

    #[tokio::test]
    async fn test_upsert_reports_batch_size() {
        let pool = open_pool(":memory:").await.expect("open pool");
        run_migrations(&pool).await.expect("run migrations");
        let sink = SqliteLeadSink::new(pool.clone());

        assert_eq!(sink.upsert(&[lead("600000001"), lead("600000002")]).await, 2);
        assert_eq!(sink.upsert(&[lead("600000001"), lead("600000003")]).await, 2);
        assert_eq!(count_leads(&pool, None).await.expect("count"), 3);
        assert_eq!(sink.upsert(&[]).await, 0);
    }

    #[tokio::test]
    async fn test_upsert_failure_returns_zero() {
        // No migrations: the leads table does not exist.
        let pool = open_pool(":memory:").await.expect("open pool");
        let sink = SqliteLeadSink::new(pool);

        assert_eq!(sink.upsert(&[lead("600000001")]).await, 0);
    }
}
