//! Configuration management for Leadscout.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::geo::{GeoFilter, BARCELONA, DEFAULT_RADIUS_KM};
use crate::types::{Coordinates, SourceId};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/leadscout/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Crawl budget and source selection
    pub crawl: CrawlConfig,
    /// Reference point and radius
    pub geo: GeoConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Randomized delays between browser steps
    pub pacing: PacingConfig,
    /// Lead store location
    pub storage: StorageConfig,
    /// HTTP trigger settings
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides, then validate.
    ///
    /// Supports the following environment variables:
    /// - `LEADSCOUT_MAX_LEADS`: Override the global lead budget
    /// - `LEADSCOUT_HEADLESS`: Override browser headless mode (true/false)
    /// - `LEADSCOUT_DATABASE_PATH`: Override the `SQLite` file location
    /// - `LEADSCOUT_SOURCES`: Comma-separated, ordered list of sources
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit TOML file, with environment overrides.
    pub fn load_from(path: &std::path::Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("LEADSCOUT_MAX_LEADS") {
            if let Ok(max) = val.trim().parse() {
                self.crawl.max_leads = max;
                tracing::debug!("Override crawl.max_leads from env: {}", max);
            }
        }

        if let Some(val) = lookup("LEADSCOUT_HEADLESS") {
            if let Ok(headless) = val.trim().parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = lookup("LEADSCOUT_DATABASE_PATH") {
            if !val.trim().is_empty() {
                self.storage.database_path = Some(PathBuf::from(val.trim()));
                tracing::debug!("Override storage.database_path from env: {}", val.trim());
            }
        }

        if let Some(val) = lookup("LEADSCOUT_SOURCES") {
            let parsed: Result<Vec<SourceId>, _> = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect();
            match parsed {
                Ok(sources) if !sources.is_empty() => {
                    tracing::debug!("Override crawl.sources from env: {:?}", sources);
                    self.crawl.sources = sources;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Ignoring LEADSCOUT_SOURCES: {}", e),
            }
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.crawl.max_leads == 0 {
            return Err(invalid("crawl.max_leads", "must be greater than 0"));
        }
        if self.crawl.sources.is_empty() {
            return Err(invalid("crawl.sources", "at least one source is required"));
        }
        if !(self.geo.radius_km.is_finite() && self.geo.radius_km > 0.0) {
            return Err(invalid("geo.radius_km", "must be a positive number"));
        }
        if !self.geo.reference().is_valid() {
            return Err(invalid(
                "geo.reference",
                "latitude must be within [-90, 90] and longitude within [-180, 180]",
            ));
        }

        let ranges = [
            ("pacing.listing_settle", self.pacing.listing_settle),
            ("pacing.scroll_settle", self.pacing.scroll_settle),
            ("pacing.detail_settle", self.pacing.detail_settle),
            ("pacing.reveal_settle", self.pacing.reveal_settle),
            ("pacing.next_page_settle", self.pacing.next_page_settle),
            ("pacing.consent_settle", self.pacing.consent_settle),
        ];
        for (field, range) in ranges {
            if range.min_ms > range.max_ms {
                return Err(invalid(field, "min_ms must not exceed max_ms"));
            }
        }

        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| invalid("config_path", "no parent directory"))?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/leadscout/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/leadscout`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    /// Resolved database file, defaulting to `leads.db` in the data directory.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("leads.db")),
        }
    }
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("com", "leadscout", "leadscout").ok_or(ConfigError::NoConfigDir)
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Crawl budget and source selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum number of leads accepted across all sources in one run
    pub max_leads: usize,
    /// Sources to crawl, in priority order
    pub sources: Vec<SourceId>,
    /// Directory with site definition TOML files (built-ins when unset)
    pub definitions_dir: Option<PathBuf>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_leads: 50,
            sources: vec![SourceId::Milanuncios],
            definitions_dir: None,
        }
    }
}

/// Reference point and inclusion radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// Reference latitude in degrees
    pub reference_lat: f64,
    /// Reference longitude in degrees
    pub reference_lng: f64,
    /// Inclusion radius in kilometres
    pub radius_km: f64,
}

impl GeoConfig {
    /// Reference point as coordinates.
    #[must_use]
    pub fn reference(&self) -> Coordinates {
        Coordinates::new(self.reference_lat, self.reference_lng)
    }

    /// Build the radius filter for this configuration.
    #[must_use]
    pub fn filter(&self) -> GeoFilter {
        GeoFilter::new(self.reference(), self.radius_km)
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            reference_lat: BARCELONA.lat,
            reference_lng: BARCELONA.lng,
            radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Listing page navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Detail page navigation timeout in seconds
    pub detail_timeout_secs: u64,
    /// Bounded wait for optional controls (consent, phone reveal) in milliseconds
    pub visibility_timeout_ms: u64,
    /// Explicit Chrome/Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,
}

impl BrowserConfig {
    /// Listing navigation timeout.
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Detail navigation timeout.
    #[must_use]
    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    /// Visibility wait.
    #[must_use]
    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_millis(self.visibility_timeout_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            navigation_timeout_secs: 30,
            detail_timeout_secs: 20,
            visibility_timeout_ms: 3000,
            chrome_executable: None,
        }
    }
}

/// Inclusive range of milliseconds for a randomized delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    /// Lower bound in milliseconds
    pub min_ms: u64,
    /// Upper bound in milliseconds
    pub max_ms: u64,
}

impl DelayRange {
    /// Create a range.
    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that never sleeps.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Lower bound.
    #[must_use]
    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    /// Upper bound.
    #[must_use]
    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }
}

/// Randomized delays applied between browser steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pixels per scroll step
    pub scroll_step_px: u32,
    /// Pause between scroll steps in milliseconds
    pub scroll_step_delay_ms: u64,
    /// After loading a listing page
    pub listing_settle: DelayRange,
    /// After scrolling a listing page
    pub scroll_settle: DelayRange,
    /// After loading a detail page
    pub detail_settle: DelayRange,
    /// After clicking a phone reveal control
    pub reveal_settle: DelayRange,
    /// After activating the next-page control
    pub next_page_settle: DelayRange,
    /// After dismissing a cookie banner
    pub consent_settle: DelayRange,
}

impl PacingConfig {
    /// Pacing with every delay set to zero, for tests and dry runs.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            listing_settle: DelayRange::zero(),
            scroll_settle: DelayRange::zero(),
            detail_settle: DelayRange::zero(),
            reveal_settle: DelayRange::zero(),
            next_page_settle: DelayRange::zero(),
            consent_settle: DelayRange::zero(),
            scroll_step_px: 300,
            scroll_step_delay_ms: 0,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            listing_settle: DelayRange::new(3000, 5000),
            scroll_settle: DelayRange::new(2000, 4000),
            detail_settle: DelayRange::new(2000, 4000),
            reveal_settle: DelayRange::new(1500, 3000),
            next_page_settle: DelayRange::new(4000, 6000),
            consent_settle: DelayRange::new(1000, 2000),
            scroll_step_px: 300,
            scroll_step_delay_ms: 150,
        }
    }
}

/// Lead store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `SQLite` file; defaults to `leads.db` in the data directory
    pub database_path: Option<PathBuf>,
}

/// HTTP trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the trigger endpoint listens on
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
        }
    }
}
