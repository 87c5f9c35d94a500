//! Meteora DLMM pair client
//!
//! Meteora only exposes pools, not token prices. A tracked token is priced
//! from its deepest pool against a configured stablecoin; tokens without such
//! a pool get no quote, which is a normal outcome for this source.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use super::http::{self, lenient};
use super::{non_negative, usable_price, QuoteSource};
use crate::error::SourceError;
use crate::types::{Asset, DexSource, Quote};

#[derive(Debug, Deserialize)]
struct GroupsResponse {
    #[serde(default)]
    groups: Vec<PairGroup>,
}

#[derive(Debug, Deserialize)]
struct PairGroup {
    #[serde(default)]
    pairs: Vec<DlmmPair>,
}

#[derive(Debug, Deserialize)]
struct DlmmPair {
    #[serde(default)]
    mint_x: Option<String>,
    #[serde(default)]
    mint_y: Option<String>,
    /// Price of X denominated in Y
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    current_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    liquidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    trade_volume_24h: Option<f64>,
}

pub struct MeteoraClient {
    client: Client,
    base_url: String,
}

impl MeteoraClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: http::normalize_base(base_url),
        }
    }

    fn parse(response: GroupsResponse, assets: &[Asset], ts: i64) -> Vec<Quote> {
        let stable_mints: HashSet<&str> = assets
            .iter()
            .filter(|a| a.stablecoin)
            .map(|a| a.mint.as_str())
            .collect();
        let symbol_by_mint: HashMap<&str, &str> = assets
            .iter()
            .map(|a| (a.mint.as_str(), a.symbol.as_str()))
            .collect();

        // symbol -> deepest stable-quoted pool seen so far
        let mut best: HashMap<&str, Quote> = HashMap::new();

        for pair in response.groups.iter().flat_map(|g| g.pairs.iter()) {
            let (Some(mint_x), Some(mint_y), Some(price)) =
                (pair.mint_x.as_deref(), pair.mint_y.as_deref(), pair.current_price)
            else {
                continue;
            };
            let Some(price) = usable_price(price) else {
                continue;
            };

            let (symbol, usd_price) = if stable_mints.contains(mint_y) {
                match symbol_by_mint.get(mint_x) {
                    Some(symbol) => (*symbol, price),
                    None => continue,
                }
            } else if stable_mints.contains(mint_x) {
                match symbol_by_mint.get(mint_y) {
                    Some(symbol) => (*symbol, 1.0 / price),
                    None => continue,
                }
            } else {
                continue;
            };

            let liquidity = non_negative(pair.liquidity);
            let quote = Quote {
                liquidity,
                volume_24h: non_negative(pair.trade_volume_24h),
                ..Quote::price_only(DexSource::Meteora, symbol, usd_price, ts)
            };

            match best.get(symbol) {
                Some(existing) if existing.liquidity >= liquidity => {}
                _ => {
                    best.insert(symbol, quote);
                }
            }
        }

        // Keep configured asset order
        assets
            .iter()
            .filter_map(|a| best.remove(a.symbol.as_str()))
            .collect()
    }
}

#[async_trait]
impl QuoteSource for MeteoraClient {
    fn id(&self) -> DexSource {
        DexSource::Meteora
    }

    async fn fetch_quotes(&self, assets: &[Asset]) -> Result<Vec<Quote>, SourceError> {
        let url = format!("{}/pair/all_by_groups", self.base_url);
        let response: GroupsResponse = http::get_json(&self.client, &url, None).await?;
        Ok(Self::parse(
            response,
            assets,
            chrono::Utc::now().timestamp_millis(),
        ))
    }
}
