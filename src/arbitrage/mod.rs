//! Arbitrage Selector - Turns a summary into a buy/sell route
//!
//! Gates:
//! - Minimum number of sources
//! - Spread inside [min, max]; wider spreads are treated as stale data
//! - Minimum confidence
//! - Minimum total liquidity
//!
//! Sizing is conservative: 5% of the thinner pool's depth.

use std::cmp::Ordering;

use crate::config::Thresholds;
use crate::types::{AggregateSummary, ArbitrageRoute, Quote, RouteLeg};

/// Fraction of the thinner pool we are willing to move
pub const POOL_DEPTH_FRACTION: f64 = 0.05;

/// Why a summary did not produce a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooFewSources,
    SpreadTooNarrow,
    SpreadTooWide,
    LowConfidence,
    ThinLiquidity,
    NoQuotes,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::TooFewSources => write!(f, "TOO_FEW_SOURCES"),
            Rejection::SpreadTooNarrow => write!(f, "SPREAD_TOO_NARROW"),
            Rejection::SpreadTooWide => write!(f, "SPREAD_TOO_WIDE"),
            Rejection::LowConfidence => write!(f, "LOW_CONFIDENCE"),
            Rejection::ThinLiquidity => write!(f, "THIN_LIQUIDITY"),
            Rejection::NoQuotes => write!(f, "NO_QUOTES"),
        }
    }
}

/// Evaluate a summary and its filtered quotes against the gates
pub fn evaluate(
    summary: &AggregateSummary,
    quotes: &[Quote],
    thresholds: &Thresholds,
) -> Result<ArbitrageRoute, Rejection> {
    if summary.count < thresholds.min_sources {
        return Err(Rejection::TooFewSources);
    }
    if !(summary.spread_pct >= thresholds.min_spread_pct) {
        return Err(Rejection::SpreadTooNarrow);
    }
    if summary.spread_pct > thresholds.max_spread_pct {
        return Err(Rejection::SpreadTooWide);
    }
    if summary.confidence < thresholds.min_confidence {
        return Err(Rejection::LowConfidence);
    }
    if summary.total_liquidity < thresholds.min_liquidity_usd {
        return Err(Rejection::ThinLiquidity);
    }

    // First quote wins ties at either extreme
    let mut iter = quotes.iter();
    let first = iter.next().ok_or(Rejection::NoQuotes)?;
    let (buy, sell) = iter.fold((first, first), |(lo, hi), q| {
        (
            if q.price < lo.price { q } else { lo },
            if q.price > hi.price { q } else { hi },
        )
    });

    let max_trade_size = buy.liquidity.min(sell.liquidity) * POOL_DEPTH_FRACTION / buy.price;

    Ok(ArbitrageRoute {
        asset: summary.asset.clone(),
        buy: RouteLeg {
            source: buy.source,
            price: buy.price,
            liquidity: buy.liquidity,
        },
        sell: RouteLeg {
            source: sell.source,
            price: sell.price,
            liquidity: sell.liquidity,
        },
        spread_pct: summary.spread_pct,
        profit_per_unit: sell.price - buy.price,
        max_trade_size,
        confidence: summary.confidence,
    })
}

/// Route for one asset, or `None` if any gate fails
pub fn select(
    summary: &AggregateSummary,
    quotes: &[Quote],
    thresholds: &Thresholds,
) -> Option<ArbitrageRoute> {
    evaluate(summary, quotes, thresholds).ok()
}

/// Order routes for display: confidence * spread, best first (stable for ties)
pub fn rank(routes: &mut [ArbitrageRoute]) {
    routes.sort_by(|a, b| {
        b.rank_score()
            .partial_cmp(&a.rank_score())
            .unwrap_or(Ordering::Equal)
    });
}
