//! Configuration management for DexScan
//!
//! Loads from config files + environment variables via .env

mod types;

pub use types::*;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;
use crate::types::Asset;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub thresholds: Thresholds,
    pub sources: SourcesConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Assets to track (symbol + mint)
    #[serde(default = "default_assets")]
    pub assets: Vec<Asset>,
    /// Time between cycle starts in milliseconds
    pub poll_interval_ms: u64,
    /// Per-source request deadline in milliseconds
    pub source_timeout_ms: u64,
    /// Stop after this many cycles (0 = run forever)
    pub max_cycles: u64,
}

impl ScannerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }
}

/// Gates applied by the outlier filter, the scorer and the route selector
#[derive(Debug, Clone, Deserialize)]
pub struct Thresholds {
    /// Minimum spread (percent) worth reporting
    pub min_spread_pct: f64,
    /// Spreads above this are treated as stale or bad data
    pub max_spread_pct: f64,
    /// Minimum total pool depth (USD) across the filtered quotes
    pub min_liquidity_usd: f64,
    /// Minimum number of agreeing sources
    pub min_sources: usize,
    /// Maximum fractional deviation from the median before a quote is dropped
    pub max_price_deviation: f64,
    /// Minimum confidence score for a route
    pub min_confidence: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_spread_pct: 0.5,
            max_spread_pct: 20.0,
            min_liquidity_usd: 10_000.0,
            min_sources: 2,
            max_price_deviation: 0.30,
            min_confidence: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub jupiter: EndpointConfig,
    pub raydium: EndpointConfig,
    pub orca: EndpointConfig,
    pub birdeye: BirdeyeConfig,
    pub meteora: EndpointConfig,
    pub dexscreener: EndpointConfig,
}

impl SourcesConfig {
    pub fn any_enabled(&self) -> bool {
        self.jupiter.enabled
            || self.raydium.enabled
            || self.orca.enabled
            || self.birdeye.enabled
            || self.meteora.enabled
            || self.dexscreener.enabled
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub enabled: bool,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BirdeyeConfig {
    pub enabled: bool,
    pub base_url: String,
    /// API key sent as X-API-KEY ("public" works with low rate limits)
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Data directory
    pub data_dir: String,
    /// Write the latest cycle report as JSON
    pub json_enabled: bool,
    /// Append summaries, routes and quotes to daily CSV files
    pub csv_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    /// Install the global tracing subscriber. RUST_LOG wins over `level`.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).with_target(false).init();
            }
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let mut builder = Self::defaults()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (DEXSCAN_*)
            .add_source(
                Environment::with_prefix("DEXSCAN")
                    .prefix_separator("_")
                    .separator("__"),
            );

        if let Ok(key) = std::env::var("BIRDEYE_API_KEY") {
            if !key.trim().is_empty() {
                builder = builder.set_override("sources.birdeye.api_key", key)?;
            }
        }

        let config = builder.build().context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let t = Thresholds::default();
        let builder = Config::builder()
            // Scanner defaults
            .set_default("scanner.poll_interval_ms", 2000)?
            .set_default("scanner.source_timeout_ms", 3000)?
            .set_default("scanner.max_cycles", 0)?
            // Threshold defaults
            .set_default("thresholds.min_spread_pct", t.min_spread_pct)?
            .set_default("thresholds.max_spread_pct", t.max_spread_pct)?
            .set_default("thresholds.min_liquidity_usd", t.min_liquidity_usd)?
            .set_default("thresholds.min_sources", t.min_sources as u64)?
            .set_default("thresholds.max_price_deviation", t.max_price_deviation)?
            .set_default("thresholds.min_confidence", t.min_confidence)?
            // Source defaults
            .set_default("sources.jupiter.enabled", true)?
            .set_default("sources.jupiter.base_url", JUPITER_URL)?
            .set_default("sources.raydium.enabled", true)?
            .set_default("sources.raydium.base_url", RAYDIUM_URL)?
            .set_default("sources.orca.enabled", true)?
            .set_default("sources.orca.base_url", ORCA_URL)?
            .set_default("sources.birdeye.enabled", true)?
            .set_default("sources.birdeye.base_url", BIRDEYE_URL)?
            .set_default("sources.birdeye.api_key", "public")?
            .set_default("sources.meteora.enabled", true)?
            .set_default("sources.meteora.base_url", METEORA_URL)?
            .set_default("sources.dexscreener.enabled", true)?
            .set_default("sources.dexscreener.base_url", DEXSCREENER_URL)?
            // Persistence defaults
            .set_default("persistence.data_dir", "./data")?
            .set_default("persistence.json_enabled", true)?
            .set_default("persistence.csv_enabled", true)?
            // Logging defaults
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?;
        Ok(builder)
    }

    /// Reject configurations that cannot produce a meaningful cycle
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scanner.assets.is_empty() {
            return Err(ConfigError::NoAssets);
        }

        let mut seen = HashSet::new();
        for asset in &self.scanner.assets {
            if !seen.insert(asset.symbol.as_str()) {
                return Err(ConfigError::DuplicateAsset(asset.symbol.clone()));
            }
            if asset.mint.trim().is_empty() {
                return Err(ConfigError::EmptyMint(asset.symbol.clone()));
            }
        }

        if self.scanner.poll_interval_ms == 0 {
            return Err(invalid("scanner.poll_interval_ms", "must be positive"));
        }
        if self.scanner.source_timeout_ms == 0 {
            return Err(invalid("scanner.source_timeout_ms", "must be positive"));
        }

        let t = &self.thresholds;
        if !(t.min_spread_pct >= 0.0) {
            return Err(invalid("thresholds.min_spread_pct", "must be >= 0"));
        }
        if t.min_spread_pct > t.max_spread_pct {
            return Err(invalid(
                "thresholds.max_spread_pct",
                format!(
                    "{} is below min_spread_pct {}",
                    t.max_spread_pct, t.min_spread_pct
                ),
            ));
        }
        if !(t.max_price_deviation > 0.0) {
            return Err(invalid("thresholds.max_price_deviation", "must be > 0"));
        }
        if t.min_sources == 0 {
            return Err(invalid("thresholds.min_sources", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&t.min_confidence) {
            return Err(invalid("thresholds.min_confidence", "must be within [0, 1]"));
        }
        if !(t.min_liquidity_usd >= 0.0) {
            return Err(invalid("thresholds.min_liquidity_usd", "must be >= 0"));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(invalid("logging.format", "expected \"pretty\" or \"json\""));
        }

        if !self.sources.any_enabled() {
            return Err(ConfigError::NoSources);
        }

        Ok(())
    }

    /// Generate a digest of the config (without secrets) for logging
    pub fn digest(&self) -> String {
        let symbols: Vec<&str> = self
            .scanner
            .assets
            .iter()
            .map(|a| a.symbol.as_str())
            .collect();
        format!(
            concat!(
                "assets={:?} interval_ms={} timeout_ms={} spread=[{}, {}]% ",
                "min_liq={} min_sources={} max_dev={}"
            ),
            symbols,
            self.scanner.poll_interval_ms,
            self.scanner.source_timeout_ms,
            self.thresholds.min_spread_pct,
            self.thresholds.max_spread_pct,
            self.thresholds.min_liquidity_usd,
            self.thresholds.min_sources,
            self.thresholds.max_price_deviation
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}
