//! DexScan - Solana cross-DEX arbitrage scanner
//!
//! Polls every enabled DEX price source on a fixed interval, aggregates the
//! quotes per asset and reports ranked buy/sell routes.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use dexscan::config::AppConfig;
use dexscan::oracle::{build_sources, QuoteCollector};
use dexscan::persistence::{CsvPersistence, JsonSnapshot, ReportSink};
use dexscan::report::ConsoleReporter;
use dexscan::scanner::{ScanSettings, Scanner};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    config.logging.init();

    info!("🔍 DexScan v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        error!(error = %e, "❌ Invalid configuration");
        return Err(e).context("Configuration rejected");
    }
    info!(config = %config.digest(), "⚙️ Configuration loaded");

    let sources = build_sources(&config.sources, config.scanner.source_timeout())?;
    let collector = QuoteCollector::new(sources, config.scanner.source_timeout());

    let mut sinks: Vec<Arc<dyn ReportSink>> = vec![Arc::new(ConsoleReporter::new())];
    if config.persistence.json_enabled {
        sinks.push(Arc::new(JsonSnapshot::new(&config.persistence.data_dir)?));
    }
    if config.persistence.csv_enabled {
        sinks.push(Arc::new(CsvPersistence::new(&config.persistence.data_dir)?));
    }

    let scanner = Arc::new(Scanner::new(ScanSettings::from(&config), collector, sinks));
    scanner.run().await?;

    info!("👋 DexScan stopped");
    Ok(())
}
