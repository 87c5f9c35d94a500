//! Persistence Module
//!
//! Output sinks for cycle reports: the latest report as a JSON snapshot and
//! an append-only CSV history of summaries, routes and raw quotes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::types::CycleReport;

/// Destination for one cycle's output
#[async_trait]
pub trait ReportSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn publish(&self, report: &CycleReport) -> Result<()>;
}

/// Aggregate summary row for CSV storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub timestamp: i64,
    pub cycle: u64,
    pub asset: String,
    pub count: usize,
    /// Source names joined with '|'
    pub sources: String,
    pub min_price: f64,
    pub max_price: f64,
    pub mean_price: f64,
    pub spread_pct: f64,
    pub confidence: f64,
    pub total_liquidity: f64,
    pub total_volume_24h: f64,
}

/// Arbitrage route row for CSV storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRecord {
    pub timestamp: i64,
    pub cycle: u64,
    pub rank: usize,
    pub asset: String,
    pub buy_source: String,
    pub buy_price: f64,
    pub buy_liquidity: f64,
    pub sell_source: String,
    pub sell_price: f64,
    pub sell_liquidity: f64,
    pub spread_pct: f64,
    pub profit_per_unit: f64,
    pub max_trade_size: f64,
    pub confidence: f64,
}

/// Raw quote row for CSV storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub timestamp: i64,
    pub cycle: u64,
    pub asset: String,
    pub source: String,
    pub price: f64,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub quote_ts: i64,
}

impl SummaryRecord {
    fn rows(report: &CycleReport) -> Vec<Self> {
        let timestamp = report.timestamp.timestamp_millis();
        report
            .summaries
            .values()
            .map(|s| SummaryRecord {
                timestamp,
                cycle: report.cycle,
                asset: s.asset.clone(),
                count: s.count,
                sources: s
                    .sources
                    .iter()
                    .map(|src| src.as_str())
                    .collect::<Vec<_>>()
                    .join("|"),
                min_price: s.min_price,
                max_price: s.max_price,
                mean_price: s.mean_price,
                spread_pct: s.spread_pct,
                confidence: s.confidence,
                total_liquidity: s.total_liquidity,
                total_volume_24h: s.total_volume_24h,
            })
            .collect()
    }
}

impl RouteRecord {
    fn rows(report: &CycleReport) -> Vec<Self> {
        let timestamp = report.timestamp.timestamp_millis();
        report
            .routes
            .iter()
            .enumerate()
            .map(|(i, r)| RouteRecord {
                timestamp,
                cycle: report.cycle,
                rank: i + 1,
                asset: r.asset.clone(),
                buy_source: r.buy.source.to_string(),
                buy_price: r.buy.price,
                buy_liquidity: r.buy.liquidity,
                sell_source: r.sell.source.to_string(),
                sell_price: r.sell.price,
                sell_liquidity: r.sell.liquidity,
                spread_pct: r.spread_pct,
                profit_per_unit: r.profit_per_unit,
                max_trade_size: r.max_trade_size,
                confidence: r.confidence,
            })
            .collect()
    }
}

impl QuoteRecord {
    fn rows(report: &CycleReport) -> Vec<Self> {
        let timestamp = report.timestamp.timestamp_millis();
        report
            .quotes
            .iter()
            .flat_map(|(_, quotes)| quotes.iter())
            .map(|q| QuoteRecord {
                timestamp,
                cycle: report.cycle,
                asset: q.asset.clone(),
                source: q.source.to_string(),
                price: q.price,
                liquidity: q.liquidity,
                volume_24h: q.volume_24h,
                quote_ts: q.ts,
            })
            .collect()
    }
}

/// Writes the latest report to `<data_dir>/latest_cycle.json`
pub struct JsonSnapshot {
    path: PathBuf,
}

impl JsonSnapshot {
    pub const FILE_NAME: &'static str = "latest_cycle.json";

    pub fn new(data_dir: &str) -> Result<Self> {
        let dir = PathBuf::from(data_dir);
        fs::create_dir_all(&dir).context("Failed to create data directory")?;
        Ok(Self {
            path: dir.join(Self::FILE_NAME),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportSink for JsonSnapshot {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn publish(&self, report: &CycleReport) -> Result<()> {
        let body = serde_json::to_vec_pretty(report).context("Failed to serialize report")?;

        // Readers never observe a half-written snapshot
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body)
            .await
            .with_context(|| format!("Failed writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed moving snapshot to {}", self.path.display()))?;

        debug!(path = %self.path.display(), bytes = body.len(), "Snapshot written");
        Ok(())
    }
}

/// Appending CSV writer that rolls over to a new file each UTC day
struct DailyCsv {
    dir: PathBuf,
    prefix: &'static str,
    day: NaiveDate,
    writer: csv::Writer<std::fs::File>,
}

impl DailyCsv {
    fn open(dir: PathBuf, prefix: &'static str, day: NaiveDate) -> Result<Self> {
        fs::create_dir_all(&dir).with_context(|| format!("Failed creating {}", dir.display()))?;
        let writer = create_writer(&dir, &format!("{}_{}.csv", prefix, day.format("%Y-%m-%d")))?;
        Ok(Self {
            dir,
            prefix,
            day,
            writer,
        })
    }

    fn write_all<T: Serialize>(&mut self, day: NaiveDate, rows: &[T]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        if day != self.day {
            *self = Self::open(self.dir.clone(), self.prefix, day)?;
        }
        for row in rows {
            self.writer
                .serialize(row)
                .with_context(|| format!("Failed to write {} record", self.prefix))?;
        }
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {} writer", self.prefix))?;
        Ok(())
    }
}

fn create_writer(dir: &Path, filename: &str) -> Result<csv::Writer<std::fs::File>> {
    let path = dir.join(filename);
    let file_has_data =
        path.exists() && fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(true)
        .open(&path)
        .context("Failed to open CSV file")?;

    let writer = WriterBuilder::new()
        .has_headers(!file_has_data)
        .from_writer(file);

    Ok(writer)
}

/// CSV persistence manager
pub struct CsvPersistence {
    summary_writer: Mutex<DailyCsv>,
    route_writer: Mutex<DailyCsv>,
    quote_writer: Mutex<DailyCsv>,
}

impl CsvPersistence {
    /// Create a new CSV persistence manager
    pub fn new(data_dir: &str) -> Result<Self> {
        let data_dir = PathBuf::from(data_dir);
        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        let today = Utc::now().date_naive();

        let writer = |kind: &'static str| -> Result<Mutex<DailyCsv>> {
            Ok(Mutex::new(DailyCsv::open(data_dir.join(kind), kind, today)?))
        };

        let persistence = Self {
            summary_writer: writer("summaries")?,
            route_writer: writer("routes")?,
            quote_writer: writer("quotes")?,
        };

        info!(data_dir = %data_dir.display(), "📁 CSV persistence ready");
        Ok(persistence)
    }
}

#[async_trait]
impl ReportSink for CsvPersistence {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn publish(&self, report: &CycleReport) -> Result<()> {
        let day = report.timestamp.date_naive();

        self.summary_writer
            .lock()
            .await
            .write_all(day, &SummaryRecord::rows(report))?;
        self.route_writer
            .lock()
            .await
            .write_all(day, &RouteRecord::rows(report))?;
        self.quote_writer
            .lock()
            .await
            .write_all(day, &QuoteRecord::rows(report))?;

        Ok(())
    }
}
