//! One complete crawl: orchestrate the sources, hand the leads to the sink and
//! journal the run.

use anyhow::Context;
use leadscout_browser::{ChromiumLauncher, SessionLauncher};
use leadscout_core::{AppConfig, SourceId};
use leadscout_db::{Database, LeadSink};
use leadscout_scraper::{CrawlOrchestrator, ScrapeSettings, SourceSummary};
use leadscout_sites::{SiteDefinition, SiteLoader, SiteRegistry};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// What a crawl produced.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlOutcome {
    /// Journal row of this crawl
    pub run_id: String,
    /// Leads collected across all sources
    pub total: usize,
    /// Leads the sink reported as processed
    pub stored: usize,
    /// Lead count per source
    pub by_source: BTreeMap<SourceId, usize>,
    /// Per-source outcome, in run order
    pub sources: Vec<SourceSummary>,
}

/// Something that can run a crawl on demand.
#[async_trait::async_trait]
pub trait CrawlRunner: Send + Sync {
    /// Run one crawl to completion.
    async fn run(&self) -> anyhow::Result<CrawlOutcome>;
}

/// Site definitions from `crawl.definitions_dir`, or the built-in set.
///
/// With a single configured source only that source's file is read, and a
/// missing or mismatched file is an error instead of an empty crawl.
pub fn load_registry(config: &AppConfig) -> anyhow::Result<SiteRegistry> {
    let Some(dir) = &config.crawl.definitions_dir else {
        return Ok(SiteRegistry::builtin()?);
    };

    let loader = SiteLoader::new(dir)
        .with_context(|| format!("opening site definitions in {}", dir.display()))?;
    match config.crawl.sources.as_slice() {
        [only] => {
            let definition = loader
                .load(*only)
                .with_context(|| format!("loading the {only} definition from {}", dir.display()))?;
            Ok(SiteRegistry::from_definitions([definition]))
        }
        _ => Ok(SiteRegistry::load_from(&loader)?),
    }
}

/// Production crawl: chromium sessions, SQLite storage.
pub struct CrawlService {
    config: AppConfig,
    registry: SiteRegistry,
    db: Database,
    launcher: Arc<dyn SessionLauncher>,
}

impl CrawlService {
    pub fn new(
        config: AppConfig,
        registry: SiteRegistry,
        db: Database,
        launcher: Arc<dyn SessionLauncher>,
    ) -> Self {
        Self {
            config,
            registry,
            db,
            launcher,
        }
    }

    /// Open the database, load the site definitions and set up Chrome.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let registry = load_registry(&config)?;
        let path = config.database_path()?;
        let db = Database::open_migrated(&path)
            .await
            .with_context(|| format!("opening lead database at {}", path.display()))?;
        let launcher = Arc::new(ChromiumLauncher::new(config.browser.clone()));
        Ok(Self::new(config, registry, db, launcher))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Definitions of the configured sources, in crawl order.
    pub fn definitions(&self) -> Vec<SiteDefinition> {
        self.registry.ordered(&self.config.crawl.sources)
    }
}

#[async_trait::async_trait]
impl CrawlRunner for CrawlService {
    async fn run(&self) -> anyhow::Result<CrawlOutcome> {
        let definitions = self.definitions();
        if definitions.is_empty() {
            warn!(sources = ?self.config.crawl.sources, "no site definitions match the configured sources");
        }

        let run = self.db.create_run().await?;
        info!(run_id = %run.id, max_leads = self.config.crawl.max_leads, "crawl started");

        let orchestrator = CrawlOrchestrator::for_sites(
            self.launcher.clone(),
            definitions,
            &ScrapeSettings::from_config(&self.config),
            self.config.crawl.max_leads,
        );
        let report = orchestrator.run().await;

        let stored = if report.leads.is_empty() {
            info!("no valid leads found");
            0
        } else {
            info!(leads = report.total(), "storing leads");
            self.db.lead_sink().upsert(&report.leads).await
        };

        let by_source = report.by_source();
        let summary = serde_json::json!({
            "by_source": by_source,
            "sources": report.sources,
        });
        self.db
            .finish_run(&run.id, report.total(), stored, &summary)
            .await?;

        info!(run_id = %run.id, total = report.total(), stored, "crawl finished");

        Ok(CrawlOutcome {
            run_id: run.id,
            total: report.total(),
            stored,
            by_source,
            sources: report.sources,
        })
    }
}
