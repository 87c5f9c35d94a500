//! Console reporter
//!
//! Renders each cycle as log lines: source health, a price table per asset,
//! unpriced assets and the ranked routes.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::persistence::ReportSink;
use crate::types::{ArbitrageRoute, CycleReport, SourceOutcome};

/// Routes beyond this rank are counted but not printed
const MAX_ROUTES_SHOWN: usize = 10;

#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    fn route_line(rank: usize, route: &ArbitrageRoute) -> String {
        format!(
            concat!(
                "#{} {} buy {} @ {:.6} → sell {} @ {:.6} | spread {:.2}% ",
                "| profit/unit {:.6} | max size {:.4} | conf {:.3}"
            ),
            rank,
            route.asset,
            route.buy.source,
            route.buy.price,
            route.sell.source,
            route.sell.price,
            route.spread_pct,
            route.profit_per_unit,
            route.max_trade_size,
            route.confidence,
        )
    }
}

#[async_trait]
impl ReportSink for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn publish(&self, report: &CycleReport) -> Result<()> {
        let healthy = report.sources.iter().filter(|s| s.is_ok()).count();
        info!(
            cycle = report.cycle,
            cycle_id = %report.cycle_id,
            sources_ok = healthy,
            sources_total = report.sources.len(),
            quotes = report.quotes.len(),
            "📊 Cycle complete"
        );

        for status in &report.sources {
            match &status.outcome {
                SourceOutcome::Ok { quotes } => info!(
                    source = %status.source,
                    quotes,
                    latency_ms = status.latency_ms,
                    "  source ok"
                ),
                SourceOutcome::Failed { reason } => warn!(
                    source = %status.source,
                    reason = %reason,
                    latency_ms = status.latency_ms,
                    "  source failed"
                ),
                SourceOutcome::TimedOut => warn!(
                    source = %status.source,
                    latency_ms = status.latency_ms,
                    "  source timed out"
                ),
            }
        }

        for summary in report.summaries.values() {
            info!(
                asset = %summary.asset,
                sources = summary.count,
                min = summary.min_price,
                max = summary.max_price,
                mean = summary.mean_price,
                spread_pct = %format!("{:.3}", summary.spread_pct),
                confidence = summary.confidence,
                liquidity = summary.total_liquidity,
                "💰 Price"
            );
        }

        if !report.unpriced.is_empty() {
            warn!(assets = ?report.unpriced, "⚠️ No prices available");
        }

        if report.routes.is_empty() {
            info!("No arbitrage routes this cycle");
        } else {
            info!(count = report.routes.len(), "🎯 Arbitrage routes");
            for (i, route) in report.routes.iter().take(MAX_ROUTES_SHOWN).enumerate() {
                info!("{}", Self::route_line(i + 1, route));
            }
        }

        Ok(())
    }
}
