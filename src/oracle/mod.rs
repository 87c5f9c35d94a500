//! Oracle module - Multi-source price aggregation
//!
//! Collects quotes from Jupiter, Raydium, Orca, Birdeye, Meteora and
//! DexScreener, rejects outliers, and produces a per-asset summary with a
//! confidence score.

pub mod aggregator;
pub mod collector;
pub mod confidence;
pub mod filter;
pub mod sources;

pub use aggregator::summarize;
pub use collector::{merge_quotes, Collection, QuoteCollector};
pub use filter::filter_outliers;
pub use sources::{build_sources, QuoteSource};
