use anyhow::Context;
use clap::{Parser, Subcommand};
use leadscout_cli::{load_registry, AppState, CrawlRunner, CrawlService};
use leadscout_core::{AppConfig, SourceId};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "leadscout")]
#[command(version, about = "Private-seller property lead crawler")]
struct Cli {
    /// Configuration file (defaults to ~/.config/leadscout/config.toml)
    #[arg(long, global = true, env = "LEADSCOUT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl the configured sources once and store the leads
    Run {
        /// Override the global lead budget
        #[arg(long)]
        max_leads: Option<usize>,
        /// Comma-separated sources, in crawl order
        #[arg(long, value_delimiter = ',')]
        sources: Vec<SourceId>,
        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },
    /// Serve the authenticated HTTP crawl trigger
    Serve {
        /// Listen address (defaults to server.bind_addr)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// List the sites that would be crawled, in order
    Sites,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,leadscout=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load_with_env()?,
    };
    Ok(config)
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_ref()).context("loading configuration")?;

    match cli.command {
        Commands::Run {
            max_leads,
            sources,
            headed,
        } => {
            if let Some(max) = max_leads {
                config.crawl.max_leads = max;
            }
            if !sources.is_empty() {
                config.crawl.sources = sources;
            }
            if headed {
                config.browser.headless = false;
            }
            config.validate()?;

            let service = CrawlService::from_config(config).await?;
            let outcome = service.run().await?;

            println!("=== Summary ===");
            for summary in &outcome.sources {
                let note = match (&summary.error, summary.skipped) {
                    (Some(error), _) => format!(" (failed: {error})"),
                    (None, true) => " (skipped, budget reached)".to_string(),
                    (None, false) => String::new(),
                };
                println!("  {}: {} leads{note}", summary.source, summary.leads);
            }
            println!("  TOTAL: {} leads, {} stored", outcome.total, outcome.stored);
        }
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or(config.server.bind_addr);
            let service = CrawlService::from_config(config).await?;
            let state = AppState::from_env(Arc::new(service))?;
            leadscout_cli::serve(addr, state).await?;
        }
        Commands::Sites => {
            let registry = load_registry(&config)?;
            let definitions = registry.ordered(&config.crawl.sources);
            if definitions.is_empty() {
                println!("No site definitions match the configured sources.");
            }
            for (position, def) in definitions.iter().enumerate() {
                println!(
                    "{}. {} ({}) priority {} - {} categories",
                    position + 1,
                    def.name(),
                    def.id(),
                    def.priority(),
                    def.categories.len()
                );
                for category in &def.categories {
                    println!("     {}: {}", category.name, category.url);
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Starting Leadscout v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "fatal error");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
