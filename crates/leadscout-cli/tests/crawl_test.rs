use leadscout_browser::{BrowserError, BrowserSession, FingerprintConfig, SessionLauncher};
use leadscout_cli::{load_registry, CrawlRunner, CrawlService};
use leadscout_core::{AppConfig, SourceId};
use leadscout_db::{leads, runs, Database};
use leadscout_sites::SiteRegistry;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const MILANUNCIOS: &str = include_str!("../../../site-definitions/milanuncios.toml");

/// Launcher for a machine without Chrome.
#[derive(Default)]
struct NoBrowser {
    attempts: AtomicUsize,
}

#[async_trait::async_trait]
impl SessionLauncher for NoBrowser {
    async fn launch(
        &self,
        _fingerprint: &FingerprintConfig,
    ) -> leadscout_browser::Result<Box<dyn BrowserSession>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(BrowserError::ChromiumError("chrome not installed".to_string()))
    }
}

#[tokio::test]
async fn test_failed_sources_still_journal_the_run() {
    let mut config = AppConfig::default();
    config.crawl.sources = vec![SourceId::Milanuncios, SourceId::Fotocasa];

    let db = Database::open_migrated(":memory:").await.expect("open db");
    let launcher = Arc::new(NoBrowser::default());
    let service = CrawlService::new(
        config,
        SiteRegistry::builtin().expect("builtin sites"),
        db.clone(),
        launcher.clone(),
    );

    let outcome = service.run().await.expect("crawl completes");

    assert_eq!(outcome.total, 0);
    assert_eq!(outcome.stored, 0);
    assert_eq!(outcome.sources.len(), 2);
    assert!(outcome.sources.iter().all(|s| s.error.is_some()));
    assert_eq!(launcher.attempts.load(Ordering::SeqCst), 2);

    let journaled = runs::get_run(db.pool(), &outcome.run_id)
        .await
        .expect("query run")
        .expect("run exists");
    assert!(journaled.finished_at.is_some());
    assert_eq!(journaled.total_leads, 0);
    assert_eq!(leads::count_leads(db.pool(), None).await.expect("count"), 0);
}

#[tokio::test]
async fn test_definitions_follow_configured_order() {
    let mut config = AppConfig::default();
    config.crawl.sources = vec![SourceId::Habitaclia, SourceId::Idealista];

    let db = Database::open_migrated(":memory:").await.expect("open db");
    let service = CrawlService::new(
        config,
        SiteRegistry::builtin().expect("builtin sites"),
        db,
        Arc::new(NoBrowser::default()),
    );

    let ids: Vec<SourceId> = service.definitions().iter().map(|d| d.id()).collect();
    assert_eq!(ids, vec![SourceId::Habitaclia, SourceId::Idealista]);
}

#[tokio::test]
async fn test_run_journal_survives_reopen() {
    let tmp = TempDir::new().expect("create temp dir");
    let path = tmp.path().join("data").join("leads.db");
    let mut config = AppConfig::default();
    config.crawl.sources = vec![SourceId::Milanuncios];

    let db = Database::open_migrated(&path).await.expect("open db");
    let service = CrawlService::new(
        config,
        SiteRegistry::builtin().expect("builtin sites"),
        db.clone(),
        Arc::new(NoBrowser::default()),
    );
    let outcome = service.run().await.expect("crawl completes");
    db.close().await;

    let reopened = Database::open_migrated(&path).await.expect("reopen db");
    let history = runs::recent_runs(reopened.pool(), 10).await.expect("list runs");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, outcome.run_id);
    assert!(history[0].finished_at.is_some());
}

#[test]
fn test_single_source_reads_its_own_definition() {
    let tmp = TempDir::new().expect("create temp dir");
    std::fs::write(tmp.path().join("milanuncios.toml"), MILANUNCIOS).expect("write definition");

    let mut config = AppConfig::default();
    config.crawl.definitions_dir = Some(tmp.path().to_path_buf());
    config.crawl.sources = vec![SourceId::Milanuncios];

    let registry = load_registry(&config).expect("load registry");
    let ids: Vec<SourceId> = registry
        .ordered(&config.crawl.sources)
        .iter()
        .map(|d| d.id())
        .collect();
    assert_eq!(ids, vec![SourceId::Milanuncios]);
}

#[test]
fn test_single_source_without_definition_file_fails() {
    let tmp = TempDir::new().expect("create temp dir");
    std::fs::write(tmp.path().join("milanuncios.toml"), MILANUNCIOS).expect("write definition");

    let mut config = AppConfig::default();
    config.crawl.definitions_dir = Some(tmp.path().to_path_buf());
    config.crawl.sources = vec![SourceId::Fotocasa];

    let err = load_registry(&config).expect_err("missing fotocasa.toml");
    assert!(format!("{err:#}").contains("fotocasa"));
}
