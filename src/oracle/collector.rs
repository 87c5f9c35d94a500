//! Quote Collector - Fans out to every source concurrently
//!
//! Each source call runs in its own task under a shared deadline. A source
//! that times out, errors, panics or returns nothing contributes zero quotes
//! and never delays or cancels its siblings. Quotes are merged only after
//! every call has finished or been aborted.

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

use crate::error::SourceError;
use crate::oracle::sources::QuoteSource;
use crate::types::{Asset, DexSource, Quote, RawQuoteSet, SourceOutcome, SourceStatus};

type FetchHandle = JoinHandle<Result<Vec<Quote>, SourceError>>;

/// Result of one collection pass
#[derive(Debug, Clone)]
pub struct Collection {
    pub quotes: RawQuoteSet,
    pub statuses: Vec<SourceStatus>,
}

pub struct QuoteCollector {
    sources: Vec<Arc<dyn QuoteSource>>,
    timeout: Duration,
}

impl QuoteCollector {
    pub fn new(sources: Vec<Arc<dyn QuoteSource>>, timeout: Duration) -> Self {
        Self { sources, timeout }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Query all sources and merge whatever arrived before the deadline
    pub async fn collect_all(&self, assets: &[Asset]) -> Collection {
        let shared: Arc<[Asset]> = Arc::from(assets);
        let started = Instant::now();
        let deadline = started + self.timeout;

        let calls: Vec<_> = self
            .sources
            .iter()
            .map(|source| {
                let id = source.id();
                let source = Arc::clone(source);
                let assets = Arc::clone(&shared);
                let handle = tokio::spawn(async move { source.fetch_quotes(&assets).await });
                Self::await_source(id, handle, started, deadline, self.timeout)
            })
            .collect();

        // Each task owns its own result slot; merging happens only after all
        // of them have resolved or been aborted.
        let results = join_all(calls).await;

        let mut statuses = Vec::with_capacity(results.len());
        let mut merged = Vec::new();
        for (status, quotes) in results {
            statuses.push(status);
            merged.extend(quotes);
        }

        Collection {
            quotes: merge_quotes(merged, assets),
            statuses,
        }
    }

    async fn await_source(
        id: DexSource,
        mut handle: FetchHandle,
        started: Instant,
        deadline: Instant,
        timeout: Duration,
    ) -> (SourceStatus, Vec<Quote>) {
        let joined = timeout_at(deadline, &mut handle).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let (outcome, quotes) = match joined {
            Ok(Ok(Ok(quotes))) => {
                info!(source = %id, count = quotes.len(), latency_ms, "✅ Quotes received");
                (
                    SourceOutcome::Ok {
                        quotes: quotes.len(),
                    },
                    quotes,
                )
            }
            Ok(Ok(Err(e))) => {
                warn!(source = %id, error = %e, latency_ms, "❌ Source failed");
                (
                    SourceOutcome::Failed {
                        reason: e.to_string(),
                    },
                    Vec::new(),
                )
            }
            Ok(Err(e)) => {
                let reason = if e.is_panic() {
                    "source panicked"
                } else {
                    "source task cancelled"
                };
                error!(source = %id, error = %e, latency_ms, "💥 Source task died");
                (
                    SourceOutcome::Failed {
                        reason: reason.to_string(),
                    },
                    Vec::new(),
                )
            }
            Err(_) => {
                handle.abort();
                warn!(
                    source = %id,
                    timeout_ms = timeout.as_millis() as u64,
                    "⏱️ Source timed out"
                );
                (SourceOutcome::TimedOut, Vec::new())
            }
        };

        (
            SourceStatus {
                source: id,
                latency_ms,
                outcome,
            },
            quotes,
        )
    }
}

/// Merge quotes into the per-asset map and pin stablecoins to exactly 1.0.
///
/// Quotes for unconfigured assets or with unusable prices are dropped here so
/// a misbehaving source cannot break the map invariant.
pub fn merge_quotes(quotes: Vec<Quote>, assets: &[Asset]) -> RawQuoteSet {
    let mut set = RawQuoteSet::new();

    for quote in quotes {
        if !assets.iter().any(|a| a.symbol == quote.asset) {
            debug!(
                source = %quote.source,
                asset = %quote.asset,
                "Dropping quote for unknown asset"
            );
            continue;
        }
        if !quote.price.is_finite() || quote.price <= 0.0 {
            debug!(
                source = %quote.source,
                asset = %quote.asset,
                price = quote.price,
                "Dropping unusable price"
            );
            continue;
        }
        set.push(quote);
    }

    for asset in assets.iter().filter(|a| a.stablecoin) {
        set.pin_price(&asset.symbol, 1.0);
    }

    set
}
