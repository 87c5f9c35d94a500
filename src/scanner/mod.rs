//! Scanner - Cycle orchestration
//!
//! One cycle is collect → filter → summarize → select → rank → publish. The
//! analysis half is a pure function over the merged quotes; the driver adds
//! the fixed-interval loop, per-cycle panic containment and shutdown.

use anyhow::{anyhow, Result};
use chrono::Utc;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::arbitrage;
use crate::config::{AppConfig, Thresholds};
use crate::oracle::{filter_outliers, summarize, QuoteCollector};
use crate::persistence::ReportSink;
use crate::types::{AggregateSummary, ArbitrageRoute, Asset, CycleReport, RawQuoteSet};

/// Output of the pure analysis step
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub summaries: BTreeMap<String, AggregateSummary>,
    /// Configured assets that ended the cycle without a summary
    pub unpriced: Vec<String>,
    /// Ranked best first
    pub routes: Vec<ArbitrageRoute>,
}

/// Filter, summarize and select routes for every configured asset
pub fn analyze(raw: &RawQuoteSet, assets: &[Asset], thresholds: &Thresholds) -> Analysis {
    let mut analysis = Analysis::default();

    for asset in assets {
        let filtered = filter_outliers(raw.get(&asset.symbol), thresholds.max_price_deviation);
        let dropped = raw.get(&asset.symbol).len() - filtered.len();
        if dropped > 0 {
            debug!(asset = %asset, dropped, "Outliers removed");
        }

        let summary = match summarize(&asset.symbol, &filtered, thresholds.min_sources) {
            Some(s) => s,
            None => {
                analysis.unpriced.push(asset.symbol.clone());
                continue;
            }
        };

        match arbitrage::evaluate(&summary, &filtered, thresholds) {
            Ok(route) => analysis.routes.push(route),
            Err(reason) => debug!(asset = %asset, %reason, "No route"),
        }

        analysis.summaries.insert(asset.symbol.clone(), summary);
    }

    arbitrage::rank(&mut analysis.routes);
    analysis
}

const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Loop settings lifted out of the application config
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub assets: Vec<Asset>,
    pub thresholds: Thresholds,
    pub poll_interval: Duration,
    /// 0 runs until shutdown
    pub max_cycles: u64,
    /// How long an in-flight cycle may keep publishing after shutdown
    pub shutdown_grace: Duration,
}

impl From<&AppConfig> for ScanSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            assets: config.scanner.assets.clone(),
            thresholds: config.thresholds.clone(),
            poll_interval: config.scanner.poll_interval(),
            max_cycles: config.scanner.max_cycles,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

pub struct Scanner {
    settings: ScanSettings,
    collector: QuoteCollector,
    sinks: Vec<Arc<dyn ReportSink>>,
    cycles: AtomicU64,
}

impl Scanner {
    pub fn new(
        settings: ScanSettings,
        collector: QuoteCollector,
        sinks: Vec<Arc<dyn ReportSink>>,
    ) -> Self {
        Self {
            settings,
            collector,
            sinks,
            cycles: AtomicU64::new(0),
        }
    }

    /// Run one full cycle and hand the report to every sink.
    ///
    /// A failing sink is logged and skipped; the cycle only errors when every
    /// configured sink failed.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();

        let collection = self.collector.collect_all(&self.settings.assets).await;
        let analysis = analyze(
            &collection.quotes,
            &self.settings.assets,
            &self.settings.thresholds,
        );

        let report = CycleReport {
            cycle_id: Uuid::new_v4(),
            cycle,
            timestamp: Utc::now(),
            sources: collection.statuses,
            quotes: collection.quotes,
            summaries: analysis.summaries,
            unpriced: analysis.unpriced,
            routes: analysis.routes,
        };

        let mut failed = 0;
        for sink in &self.sinks {
            if let Err(e) = sink.publish(&report).await {
                failed += 1;
                warn!(sink = sink.name(), cycle, error = %e, "⚠️ Sink failed");
            }
        }
        if !self.sinks.is_empty() && failed == self.sinks.len() {
            return Err(anyhow!("all {} sinks failed for cycle {}", failed, cycle));
        }

        debug!(
            cycle,
            elapsed_ms = started.elapsed().as_millis() as u64,
            routes = report.routes.len(),
            "Cycle finished"
        );
        Ok(report)
    }

    /// Run until Ctrl-C or until `max_cycles` cycles have completed
    pub async fn run(self: Arc<Self>) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Fixed-interval loop; a cycle that overruns delays the next tick rather
    /// than overlapping with it.
    pub async fn run_until<F>(self: Arc<Self>, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            assets = self.settings.assets.len(),
            sources = self.collector.source_count(),
            interval_ms = self.settings.poll_interval.as_millis() as u64,
            "🚀 Scanner started"
        );

        let mut completed: u64 = 0;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("🛑 Shutdown requested");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let scanner = Arc::clone(&self);
            let mut cycle = tokio::spawn(async move { scanner.run_cycle().await });

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("🛑 Shutdown requested mid-cycle");
                    self.drain(cycle).await;
                    break;
                }
                joined = &mut cycle => match joined {
                    Ok(Ok(report)) => debug!(cycle = report.cycle, "Cycle published"),
                    Ok(Err(e)) => error!(error = %e, "❌ Cycle failed"),
                    Err(e) => error!(error = %e, "💥 Cycle aborted"),
                },
            }

            completed += 1;
            if self.settings.max_cycles > 0 && completed >= self.settings.max_cycles {
                info!(completed, "Reached max cycles");
                break;
            }
        }

        info!(completed, "Scanner stopped");
        Ok(())
    }

    /// Let an in-flight cycle finish within the grace period, then abort it
    async fn drain(&self, mut cycle: JoinHandle<Result<CycleReport>>) {
        match tokio::time::timeout(self.settings.shutdown_grace, &mut cycle).await {
            Ok(Ok(Ok(report))) => info!(cycle = report.cycle, "In-flight cycle published"),
            Ok(Ok(Err(e))) => error!(error = %e, "❌ In-flight cycle failed"),
            Ok(Err(e)) => error!(error = %e, "💥 In-flight cycle aborted"),
            Err(_) => {
                cycle.abort();
                warn!(
                    grace_ms = self.settings.shutdown_grace.as_millis() as u64,
                    "⚠️ In-flight cycle aborted after grace period"
                );
            }
        }
    }
}
