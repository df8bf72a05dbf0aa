//! Session setup, teardown and failure containment around one adapter call.

use crate::error::ScrapeError;
use crate::traversal::SourceAdapter;
use futures::FutureExt;
use leadscout_browser::{FingerprintConfig, SessionLauncher};
use leadscout_core::{Lead, SourceId};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Result of running one source.
#[derive(Debug, Clone)]
pub struct SourceRun {
    pub source: SourceId,
    pub leads: Vec<Lead>,
    /// Why the source contributed nothing, if it failed
    pub error: Option<String>,
}

impl SourceRun {
    fn failed(source: SourceId, error: &ScrapeError) -> Self {
        Self {
            source,
            leads: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Wraps adapter invocations with an isolated browser session per call.
#[derive(Clone)]
pub struct ScraperLifecycle {
    launcher: Arc<dyn SessionLauncher>,
}

impl ScraperLifecycle {
    pub fn new(launcher: Arc<dyn SessionLauncher>) -> Self {
        Self { launcher }
    }

    /// Run `adapter` with a fresh randomized session. Never fails: launch
    /// errors, adapter errors and panics all become an empty [`SourceRun`].
    pub async fn run(&self, adapter: &dyn SourceAdapter, max_leads: usize) -> SourceRun {
        let source = adapter.source();
        let fingerprint = FingerprintConfig::randomized();
        tracing::info!(source = %source, max_leads, user_agent = %fingerprint.user_agent, "starting source");

        let mut session = match self.launcher.launch(&fingerprint).await {
            Ok(session) => session,
            Err(e) => {
                let err = ScrapeError::from(e);
                tracing::error!(source = %source, error = %err, "browser launch failed");
                return SourceRun::failed(source, &err);
            }
        };

        let outcome = AssertUnwindSafe(adapter.scrape(session.as_ref(), max_leads))
            .catch_unwind()
            .await;

        if let Err(e) = session.close().await {
            tracing::warn!(source = %source, error = %e, "closing browser session failed");
        }

        match outcome {
            Ok(Ok(leads)) => SourceRun {
                source,
                leads,
                error: None,
            },
            Ok(Err(err)) => {
                tracing::error!(source = %source, error = %err, "source failed");
                SourceRun::failed(source, &err)
            }
            Err(panic) => {
                let err = ScrapeError::AdapterPanicked {
                    site: source,
                    message: panic_message(panic.as_ref()),
                };
                tracing::error!(source = %source, error = %err, "source panicked");
                SourceRun::failed(source, &err)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("selector exploded");
        assert_eq!(panic_message(boxed.as_ref()), "selector exploded");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");

        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic payload");
    }
}
