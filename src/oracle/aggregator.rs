//! Quote Aggregator - Summarizes one asset's filtered quotes
//!
//! Produces min/max/mean, the cross-source spread, liquidity and volume
//! totals, and the confidence score for the set.

use crate::oracle::confidence;
use crate::types::{AggregateSummary, Quote};

/// Summarize a filtered quote set.
///
/// Returns `None` for an empty set or when the minimum price is not positive,
/// since the spread would be undefined.
pub fn summarize(asset: &str, quotes: &[Quote], min_sources: usize) -> Option<AggregateSummary> {
    if quotes.is_empty() {
        return None;
    }

    let prices: Vec<f64> = quotes.iter().map(|q| q.price).collect();
    let liquidities: Vec<f64> = quotes.iter().map(|q| q.liquidity).collect();

    let min_price = prices.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_price = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !(min_price > 0.0) || !max_price.is_finite() {
        return None;
    }

    let mean_price = prices.iter().sum::<f64>() / prices.len() as f64;
    let spread_pct = (max_price - min_price) / min_price * 100.0;

    Some(AggregateSummary {
        asset: asset.to_string(),
        count: quotes.len(),
        sources: quotes.iter().map(|q| q.source).collect(),
        min_price,
        max_price,
        mean_price,
        spread_pct,
        confidence: confidence::score(&prices, &liquidities, min_sources),
        total_liquidity: liquidities.iter().sum(),
        total_volume_24h: quotes.iter().map(|q| q.volume_24h).sum(),
    })
}
