//! Core types used throughout DexScan
//!
//! Defines the per-cycle data model: assets, quotes, summaries, routes and the
//! report handed to output sinks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Tracked asset: a symbol mapped 1:1 to its on-chain mint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    /// Symbol used as the key everywhere in the pipeline (e.g. "SOL")
    pub symbol: String,
    /// Provider-specific identifier (Solana mint address)
    pub mint: String,
    /// Stablecoins are always priced at exactly 1.0
    #[serde(default)]
    pub stablecoin: bool,
}

impl Asset {
    pub fn new(symbol: &str, mint: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            mint: mint.to_string(),
            stablecoin: false,
        }
    }

    pub fn stable(symbol: &str, mint: &str) -> Self {
        Self {
            stablecoin: true,
            ..Self::new(symbol, mint)
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Quote source identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DexSource {
    Jupiter,
    Raydium,
    Orca,
    Birdeye,
    Meteora,
    DexScreener,
}

impl DexSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DexSource::Jupiter => "Jupiter",
            DexSource::Raydium => "Raydium",
            DexSource::Orca => "Orca",
            DexSource::Birdeye => "Birdeye",
            DexSource::Meteora => "Meteora",
            DexSource::DexScreener => "DexScreener",
        }
    }
}

impl fmt::Display for DexSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One price observation from one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub source: DexSource,
    /// Asset symbol
    pub asset: String,
    /// Price in quote-currency units (USD)
    pub price: f64,
    /// Pool depth in USD, 0 when the source does not report it
    pub liquidity: f64,
    /// 24h volume in USD, 0 when the source does not report it
    pub volume_24h: f64,
    /// Observation timestamp in milliseconds
    pub ts: i64,
}

impl Quote {
    /// Quote with unknown liquidity and volume
    pub fn price_only(source: DexSource, asset: &str, price: f64, ts: i64) -> Self {
        Self {
            source,
            asset: asset.to_string(),
            price,
            liquidity: 0.0,
            volume_24h: 0.0,
            ts,
        }
    }
}

/// Quotes gathered in one cycle, keyed by asset symbol.
///
/// Every quote stored under a key has `asset == key`; `push` enforces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawQuoteSet {
    by_asset: BTreeMap<String, Vec<Quote>>,
}

impl RawQuoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, quote: Quote) {
        self.by_asset
            .entry(quote.asset.clone())
            .or_default()
            .push(quote);
    }

    pub fn get(&self, symbol: &str) -> &[Quote] {
        self.by_asset
            .get(symbol)
            .map(|q| q.as_slice())
            .unwrap_or(&[])
    }

    /// Overwrite the price of every quote stored for `symbol`
    pub fn pin_price(&mut self, symbol: &str, price: f64) {
        if let Some(quotes) = self.by_asset.get_mut(symbol) {
            for quote in quotes.iter_mut() {
                quote.price = price;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Quote>)> {
        self.by_asset.iter()
    }

    /// Total number of quotes across all assets
    pub fn len(&self) -> usize {
        self.by_asset.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Quote> for RawQuoteSet {
    fn from_iter<I: IntoIterator<Item = Quote>>(iter: I) -> Self {
        let mut set = RawQuoteSet::new();
        for quote in iter {
            set.push(quote);
        }
        set
    }
}

/// Per-asset statistics over the filtered quote set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub asset: String,
    /// Number of quotes that survived outlier filtering
    pub count: usize,
    pub sources: Vec<DexSource>,
    pub min_price: f64,
    pub max_price: f64,
    pub mean_price: f64,
    /// (max - min) / min * 100
    pub spread_pct: f64,
    /// Heuristic ranking signal in [0, 1], not a probability
    pub confidence: f64,
    pub total_liquidity: f64,
    pub total_volume_24h: f64,
}

/// One side of an arbitrage route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub source: DexSource,
    pub price: f64,
    pub liquidity: f64,
}

/// Buy-low / sell-high route for one asset within one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageRoute {
    pub asset: String,
    pub buy: RouteLeg,
    pub sell: RouteLeg,
    pub spread_pct: f64,
    pub profit_per_unit: f64,
    /// Units that can be traded without exceeding 5% of the thinner pool
    pub max_trade_size: f64,
    pub confidence: f64,
}

impl ArbitrageRoute {
    /// Display ranking key: higher is better
    pub fn rank_score(&self) -> f64 {
        self.confidence * self.spread_pct
    }
}

/// Outcome of one adapter call within a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Ok { quotes: usize },
    Failed { reason: String },
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub source: DexSource,
    pub latency_ms: u64,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
}

impl SourceStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, SourceOutcome::Ok { .. })
    }
}

/// Everything one cycle produced, handed to the output sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
    pub sources: Vec<SourceStatus>,
    pub quotes: RawQuoteSet,
    pub summaries: BTreeMap<String, AggregateSummary>,
    /// Configured assets without a usable summary this cycle
    pub unpriced: Vec<String>,
    /// Ranked by confidence * spread, best first
    pub routes: Vec<ArbitrageRoute>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_quote_set_keys_by_asset() {
        let set: RawQuoteSet = vec![
            Quote::price_only(DexSource::Jupiter, "SOL", 150.0, 0),
            Quote::price_only(DexSource::Orca, "BONK", 0.00002, 0),
            Quote::price_only(DexSource::Raydium, "SOL", 150.5, 0),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 3);
        assert_eq!(set.get("SOL").len(), 2);
        assert!(set.get("SOL").iter().all(|q| q.asset == "SOL"));
        assert!(set.get("JUP").is_empty());
    }

    #[test]
    fn pin_price_touches_only_one_asset() {
        let mut set: RawQuoteSet = vec![
            Quote::price_only(DexSource::Jupiter, "USDC", 0.998, 0),
            Quote::price_only(DexSource::Orca, "USDC", 1.004, 0),
            Quote::price_only(DexSource::Orca, "SOL", 150.0, 0),
        ]
        .into_iter()
        .collect();

        set.pin_price("USDC", 1.0);
        set.pin_price("BONK", 1.0);

        assert!(set.get("USDC").iter().all(|q| q.price == 1.0));
        assert_eq!(set.get("SOL")[0].price, 150.0);
        assert!(set.get("BONK").is_empty());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn source_status_serializes_flat() {
        let status = SourceStatus {
            source: DexSource::Birdeye,
            latency_ms: 12,
            outcome: SourceOutcome::Failed {
                reason: "HTTP 429".to_string(),
            },
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["source"], "Birdeye");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "HTTP 429");
    }
}
