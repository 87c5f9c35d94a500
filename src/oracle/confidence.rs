//! Confidence scoring
//!
//! The score is a heuristic ranking signal in [0, 1], not a probability. It
//! blends how many sources agree, how tightly their prices cluster, and how
//! much liquidity stands behind them.

/// Source count at which the source factor saturates
const FULL_SOURCE_COUNT: f64 = 5.0;
/// Total liquidity (USD) at which the liquidity factor saturates
const FULL_LIQUIDITY_USD: f64 = 100_000.0;

const SOURCE_WEIGHT: f64 = 0.4;
const CONSISTENCY_WEIGHT: f64 = 0.4;
const LIQUIDITY_WEIGHT: f64 = 0.2;

/// Consistency factor used when dispersion cannot be measured
const UNMEASURED_CONSISTENCY: f64 = 0.5;

/// Score a set of prices and liquidities, rounded to 3 decimals.
///
/// Returns 0 when fewer than `min_sources` prices are given.
pub fn score(prices: &[f64], liquidities: &[f64], min_sources: usize) -> f64 {
    let n = prices.len();
    if n == 0 || n < min_sources {
        return 0.0;
    }

    let source_factor = (n as f64 / FULL_SOURCE_COUNT).min(1.0);
    let consistency_factor = consistency(prices);
    let total_liquidity: f64 = liquidities.iter().filter(|l| l.is_finite()).sum();
    let liquidity_factor = (total_liquidity.max(0.0) / FULL_LIQUIDITY_USD).min(1.0);

    let raw = SOURCE_WEIGHT * source_factor
        + CONSISTENCY_WEIGHT * consistency_factor
        + LIQUIDITY_WEIGHT * liquidity_factor;

    round3(raw.clamp(0.0, 1.0))
}

/// 1 - coefficient of variation (sample stddev / mean), floored at 0
fn consistency(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return UNMEASURED_CONSISTENCY;
    }
    let n = prices.len() as f64;
    let mean = prices.iter().sum::<f64>() / n;
    if !(mean > 0.0) {
        return 0.0;
    }
    let variance = prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (1.0 - variance.sqrt() / mean).max(0.0)
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
