//! Schema for the lead store: `leads` plus the `crawl_runs` journal.
//!
//! The files under `migrations/` are embedded at compile time.

use crate::error::{DatabaseError, Result};
use sqlx::{Pool, Sqlite};

/// Bring the lead store schema up to date. Safe to call on every start.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    tracing::debug!(version = get_schema_version(pool).await?, "lead store schema ready");
    Ok(())
}

/// Highest applied migration, 0 for a fresh file.
pub async fn get_schema_version(pool: &Pool<Sqlite>) -> Result<i64> {
    let tracked: i64 = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
    )
    .fetch_one(pool)
    .await?;
    if tracked == 0 {
        return Ok(0);
    }

    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;
    Ok(version.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::open_pool;

    #[tokio::test]
    async fn test_run_migrations() {
        let pool = open_pool(":memory:").await.expect("open pool");

        run_migrations(&pool).await.expect("run migrations");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name IN ('leads', 'crawl_runs')
             ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .expect("query tables");

        assert_eq!(tables, vec!["crawl_runs", "leads"]);
    }

    #[tokio::test]
    async fn test_schema_version_and_idempotence() {
        let pool = open_pool(":memory:").await.expect("open pool");

        assert_eq!(get_schema_version(&pool).await.expect("version"), 0);

        run_migrations(&pool).await.expect("first migration run");
        run_migrations(&pool).await.expect("second migration run");

        assert_eq!(get_schema_version(&pool).await.expect("version"), 2);
    }
}
