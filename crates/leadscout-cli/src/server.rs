//! Authenticated HTTP trigger for scheduled crawls.
//!
//! `GET|POST /api/run-scraper` runs one crawl and answers with a JSON summary.
//! Callers must send `Authorization: Bearer <CRON_SECRET>`.

use crate::crawl::CrawlRunner;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use leadscout_core::SourceId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;

/// Environment variable holding the trigger secret.
pub const SECRET_ENV: &str = "CRON_SECRET";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    runner: Arc<dyn CrawlRunner>,
    secret: Arc<str>,
    running: Arc<Mutex<()>>,
}

impl AppState {
    /// State with an explicit secret.
    ///
    /// # Errors
    /// Fails when the secret is empty.
    pub fn new(runner: Arc<dyn CrawlRunner>, secret: &str) -> anyhow::Result<Self> {
        let secret = secret.trim();
        if secret.is_empty() {
            anyhow::bail!("{SECRET_ENV} must not be empty");
        }
        Ok(Self {
            runner,
            secret: Arc::from(secret),
            running: Arc::new(Mutex::new(())),
        })
    }

    /// State with the secret taken from `CRON_SECRET`.
    ///
    /// # Errors
    /// Fails when `CRON_SECRET` is unset or empty.
    pub fn from_env(runner: Arc<dyn CrawlRunner>) -> anyhow::Result<Self> {
        let secret = std::env::var(SECRET_ENV).unwrap_or_default();
        if secret.trim().is_empty() {
            anyhow::bail!("{SECRET_ENV} is required to serve the crawl trigger");
        }
        Self::new(runner, &secret)
    }

    fn allows(&self, token: &str) -> bool {
        token.as_bytes().ct_eq(self.secret.as_bytes()).into()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

#[derive(Debug, Serialize)]
struct RunResponse {
    success: bool,
    message: String,
    data: RunData,
}

#[derive(Debug, Serialize)]
struct RunData {
    total: usize,
    stored: usize,
    by_source: BTreeMap<SourceId, usize>,
}

/// Router exposing the trigger endpoint.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/run-scraper", get(run_scraper).post(run_scraper))
        .with_state(state)
}

async fn run_scraper(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let authorized = extract_bearer_token(headers.get(AUTHORIZATION))
        .is_some_and(|token| state.allows(token));
    if !authorized {
        tracing::warn!("rejected crawl trigger with missing or invalid bearer token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                error: "unauthorized",
            }),
        )
            .into_response();
    }

    // One crawl at a time; a second trigger waits for the first to finish.
    let _guard = state.running.lock().await;
    tracing::info!("crawl triggered over HTTP");

    match state.runner.run().await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(RunResponse {
                success: true,
                message: format!(
                    "Crawl completed: {} leads found, {} stored",
                    outcome.total, outcome.stored
                ),
                data: RunData {
                    total: outcome.total,
                    stored: outcome.stored,
                    by_source: outcome.by_source,
                },
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "triggered crawl failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "crawl failed",
                }),
            )
                .into_response()
        }
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Bind `addr` and serve until ctrl-c or SIGTERM.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "crawl trigger listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        let header = HeaderValue::from_static("Bearer s3cret");
        assert_eq!(extract_bearer_token(Some(&header)), Some("s3cret"));

        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);

        let header = HeaderValue::from_static("Bearer   ");
        assert_eq!(extract_bearer_token(Some(&header)), None);

        assert_eq!(extract_bearer_token(None), None);
    }
}
