//! Crawl orchestrator for running sources under a shared lead budget.
//!
//! Sources run strictly one after another, in the configured order. Each is
//! handed the budget that is still left; the run stops as soon as the budget
//! reaches zero.

use crate::budget::CrawlBudget;
use crate::lifecycle::ScraperLifecycle;
use crate::traversal::{ScrapeSettings, SiteScraper, SourceAdapter};
use leadscout_browser::SessionLauncher;
use leadscout_core::{Lead, SourceId};
use leadscout_sites::SiteDefinition;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Outcome of one source within a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    /// Source tag
    pub source: SourceId,
    /// Budget the source was started with (0 when skipped)
    pub budget: usize,
    /// Leads kept from this source
    pub leads: usize,
    /// Not run because the budget was already spent
    pub skipped: bool,
    /// Failure that emptied this source, if any
    pub error: Option<String>,
}

/// Aggregate result of a crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Every accepted lead, in traversal order
    pub leads: Vec<Lead>,
    /// Per-source outcomes, in run order
    pub sources: Vec<SourceSummary>,
}

impl CrawlReport {
    /// Total leads collected.
    #[must_use]
    pub fn total(&self) -> usize {
        self.leads.len()
    }

    /// Lead count per source, for the summary report.
    #[must_use]
    pub fn by_source(&self) -> BTreeMap<SourceId, usize> {
        self.leads.iter().fold(BTreeMap::new(), |mut acc, lead| {
            *acc.entry(lead.source()).or_insert(0) += 1;
            acc
        })
    }
}

/// Runs adapters in priority order under a global budget.
pub struct CrawlOrchestrator {
    lifecycle: ScraperLifecycle,
    adapters: Vec<Box<dyn SourceAdapter>>,
    max_leads: usize,
}

impl CrawlOrchestrator {
    /// Create an orchestrator over `adapters`, which run in the given order.
    #[must_use]
    pub fn new(
        lifecycle: ScraperLifecycle,
        adapters: Vec<Box<dyn SourceAdapter>>,
        max_leads: usize,
    ) -> Self {
        Self {
            lifecycle,
            adapters,
            max_leads,
        }
    }

    /// Build site scrapers for `definitions` (already in run order).
    #[must_use]
    pub fn for_sites(
        launcher: Arc<dyn SessionLauncher>,
        definitions: Vec<SiteDefinition>,
        settings: &ScrapeSettings,
        max_leads: usize,
    ) -> Self {
        let adapters = definitions
            .into_iter()
            .map(|definition| {
                Box::new(SiteScraper::new(definition, settings.clone())) as Box<dyn SourceAdapter>
            })
            .collect();
        Self::new(ScraperLifecycle::new(launcher), adapters, max_leads)
    }

    /// Sources in run order.
    #[must_use]
    pub fn sources(&self) -> Vec<SourceId> {
        self.adapters.iter().map(|adapter| adapter.source()).collect()
    }

    /// Run every source until the budget is spent.
    pub async fn run(&self) -> CrawlReport {
        let mut budget = CrawlBudget::new(self.max_leads);
        let mut report = CrawlReport::default();

        tracing::info!(
            max_leads = self.max_leads,
            sources = self.adapters.len(),
            "starting crawl"
        );

        for adapter in &self.adapters {
            let source = adapter.source();

            if budget.is_exhausted() {
                tracing::info!(source = %source, "lead budget reached, skipping source");
                report.sources.push(SourceSummary {
                    source,
                    budget: 0,
                    leads: 0,
                    skipped: true,
                    error: None,
                });
                continue;
            }

            let remaining = budget.remaining();
            let mut run = self.lifecycle.run(adapter.as_ref(), remaining).await;

            let admitted = budget.consume(run.leads.len());
            if admitted < run.leads.len() {
                tracing::warn!(
                    source = %source,
                    returned = run.leads.len(),
                    admitted,
                    "source exceeded its budget, dropping surplus"
                );
                run.leads.truncate(admitted);
            }

            tracing::info!(
                source = %source,
                leads = admitted,
                total = budget.used(),
                max_leads = budget.max(),
                "source done"
            );

            report.sources.push(SourceSummary {
                source,
                budget: remaining,
                leads: admitted,
                skipped: false,
                error: run.error,
            });
            report.leads.extend(run.leads);
        }

        for (source, count) in report.by_source() {
            tracing::info!(source = %source, leads = count, "summary");
        }
        tracing::info!(total = report.total(), "crawl finished");

        report
    }
}
