//! Quote source implementations (Jupiter, Raydium, Orca, Birdeye, Meteora, DexScreener)

mod birdeye;
mod dexscreener;
mod http;
mod jupiter;
mod meteora;
mod orca;
mod raydium;

pub use birdeye::BirdeyeClient;
pub use dexscreener::DexScreenerClient;
pub use jupiter::JupiterClient;
pub use meteora::MeteoraClient;
pub use orca::OrcaClient;
pub use raydium::RaydiumClient;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SourcesConfig;
use crate::error::SourceError;
use crate::types::{Asset, DexSource, Quote};

/// Trait for quote source clients.
///
/// Implementations return only quotes with a positive price; an asset the
/// source cannot price is simply left out. Missing liquidity or volume is
/// reported as zero. Failures are returned as `SourceError` and absorbed by the
/// collector, so one source can never fail the cycle.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Get the source identifier
    fn id(&self) -> DexSource;

    /// Fetch current quotes for the given assets
    async fn fetch_quotes(&self, assets: &[Asset]) -> Result<Vec<Quote>, SourceError>;
}

/// Build every enabled source, sharing one HTTP client
pub fn build_sources(
    config: &SourcesConfig,
    timeout: Duration,
) -> Result<Vec<Arc<dyn QuoteSource>>> {
    let client = http::build_client(timeout)?;
    let mut sources: Vec<Arc<dyn QuoteSource>> = Vec::new();

    if config.jupiter.enabled {
        sources.push(Arc::new(JupiterClient::new(
            client.clone(),
            &config.jupiter.base_url,
        )));
    }
    if config.raydium.enabled {
        sources.push(Arc::new(RaydiumClient::new(
            client.clone(),
            &config.raydium.base_url,
        )));
    }
    if config.orca.enabled {
        sources.push(Arc::new(OrcaClient::new(client.clone(), &config.orca.base_url)));
    }
    if config.birdeye.enabled {
        sources.push(Arc::new(BirdeyeClient::new(
            client.clone(),
            &config.birdeye.base_url,
            &config.birdeye.api_key,
        )));
    }
    if config.meteora.enabled {
        sources.push(Arc::new(MeteoraClient::new(
            client.clone(),
            &config.meteora.base_url,
        )));
    }
    if config.dexscreener.enabled {
        sources.push(Arc::new(DexScreenerClient::new(
            client,
            &config.dexscreener.base_url,
        )));
    }

    Ok(sources)
}

/// Comma-joined mint list for vendors that take `ids=a,b,c`
pub(crate) fn mint_list(assets: &[Asset]) -> String {
    assets
        .iter()
        .map(|a| a.mint.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Accept only prices that can take part in the pipeline
pub(crate) fn usable_price(price: f64) -> Option<f64> {
    (price.is_finite() && price > 0.0).then_some(price)
}

/// Liquidity/volume fields: unknown or garbage becomes 0
pub(crate) fn non_negative(value: Option<f64>) -> f64 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(0.0)
}
