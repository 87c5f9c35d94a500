//! Median-based outlier rejection for one asset's quotes

use crate::types::Quote;

/// Below this many quotes there is no majority to judge an outlier against
pub const MIN_QUOTES_TO_FILTER: usize = 3;

/// Median of a non-empty price list (mean of the two middle values for even counts)
pub fn median(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    let mut sorted = prices.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Drop quotes whose price deviates from the median by more than `max_deviation`
/// (as a fraction of the median).
///
/// Fewer than three quotes are returned unchanged. If every quote would be
/// dropped the input is returned as-is, so an asset is never lost because all
/// sources disagree.
pub fn filter_outliers(quotes: &[Quote], max_deviation: f64) -> Vec<Quote> {
    if quotes.len() < MIN_QUOTES_TO_FILTER {
        return quotes.to_vec();
    }

    let prices: Vec<f64> = quotes.iter().map(|q| q.price).collect();
    let median = match median(&prices) {
        Some(m) if m.is_finite() && m > 0.0 => m,
        _ => return quotes.to_vec(),
    };

    let kept: Vec<Quote> = quotes
        .iter()
        .filter(|q| (q.price - median).abs() / median <= max_deviation)
        .cloned()
        .collect();

    if kept.is_empty() {
        quotes.to_vec()
    } else {
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DexSource;

    fn quotes(prices: &[f64]) -> Vec<Quote> {
        let sources = [
            DexSource::Jupiter,
            DexSource::Raydium,
            DexSource::Orca,
            DexSource::Birdeye,
            DexSource::Meteora,
            DexSource::DexScreener,
        ];
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| Quote::price_only(sources[i % sources.len()], "X", *p, 0))
            .collect()
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn fewer_than_three_quotes_pass_through() {
        let input = quotes(&[10.0, 1000.0]);
        assert_eq!(filter_outliers(&input, 0.30), input);

        let single = quotes(&[5.0]);
        assert_eq!(filter_outliers(&single, 0.30), single);

        assert!(filter_outliers(&[], 0.30).is_empty());
    }

    #[test]
    fn far_outlier_is_dropped() {
        let input = quotes(&[10.0, 10.1, 1000.0]);
        let kept = filter_outliers(&input, 0.30);
        let prices: Vec<f64> = kept.iter().map(|q| q.price).collect();
        assert_eq!(prices, vec![10.0, 10.1]);
    }

    #[test]
    fn consistent_quotes_are_kept_in_order() {
        let input = quotes(&[100.0, 101.0, 102.0]);
        assert_eq!(filter_outliers(&input, 0.30), input);
    }

    #[test]
    fn boundary_deviation_is_kept() {
        // median 100, 130 deviates by exactly 0.30
        let input = quotes(&[100.0, 100.0, 130.0]);
        assert_eq!(filter_outliers(&input, 0.30).len(), 3);
    }

    #[test]
    fn total_disagreement_returns_original_set() {
        // median 50 (even count); every quote deviates by more than 10%
        let input = quotes(&[1.0, 40.0, 60.0, 500.0]);
        let kept = filter_outliers(&input, 0.10);
        assert_eq!(kept, input);
        assert!(!kept.is_empty());
    }
}
