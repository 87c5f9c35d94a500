//! DexScreener token pairs client
//!
//! The only source that reports pool depth and 24h volume for every pair, so
//! it feeds the liquidity gate and the liquidity part of the confidence score.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use super::http::{self, lenient};
use super::{mint_list, non_negative, usable_price, QuoteSource};
use crate::error::SourceError;
use crate::types::{Asset, DexSource, Quote};

const CHAIN_ID: &str = "solana";

#[derive(Debug, Deserialize)]
struct TokensResponse {
    #[serde(default)]
    pairs: Option<Vec<Pair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pair {
    #[serde(default)]
    chain_id: Option<String>,
    #[serde(default)]
    base_token: Option<Token>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    price_usd: Option<f64>,
    #[serde(default)]
    liquidity: Option<Liquidity>,
    #[serde(default)]
    volume: Option<Volume>,
}

#[derive(Debug, Deserialize)]
struct Token {
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Liquidity {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    h24: Option<f64>,
}

pub struct DexScreenerClient {
    client: Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: http::normalize_base(base_url),
        }
    }

    fn parse(response: TokensResponse, assets: &[Asset], ts: i64) -> Vec<Quote> {
        let symbol_by_mint: HashMap<&str, &str> = assets
            .iter()
            .map(|a| (a.mint.as_str(), a.symbol.as_str()))
            .collect();
        let mut best: HashMap<&str, Quote> = HashMap::new();

        for pair in response.pairs.unwrap_or_default() {
            if pair.chain_id.as_deref() != Some(CHAIN_ID) {
                continue;
            }
            let Some(symbol) = pair
                .base_token
                .as_ref()
                .and_then(|t| t.address.as_deref())
                .and_then(|mint| symbol_by_mint.get(mint).copied())
            else {
                continue;
            };
            let Some(price) = pair.price_usd.and_then(usable_price) else {
                continue;
            };

            let liquidity = non_negative(pair.liquidity.and_then(|l| l.usd));
            let quote = Quote {
                liquidity,
                volume_24h: non_negative(pair.volume.and_then(|v| v.h24)),
                ..Quote::price_only(DexSource::DexScreener, symbol, price, ts)
            };

            match best.get(symbol) {
                Some(existing) if existing.liquidity >= liquidity => {}
                _ => {
                    best.insert(symbol, quote);
                }
            }
        }

        assets
            .iter()
            .filter_map(|a| best.remove(a.symbol.as_str()))
            .collect()
    }
}

#[async_trait]
impl QuoteSource for DexScreenerClient {
    fn id(&self) -> DexSource {
        DexSource::DexScreener
    }

    async fn fetch_quotes(&self, assets: &[Asset]) -> Result<Vec<Quote>, SourceError> {
        let url = format!(
            "{}/latest/dex/tokens/{}",
            self.base_url,
            mint_list(assets)
        );
        let response: TokensResponse = http::get_json(&self.client, &url, None).await?;
        Ok(Self::parse(
            response,
            assets,
            chrono::Utc::now().timestamp_millis(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn picks_deepest_solana_pair_per_token() {
        let assets = vec![Asset::new("RAY", "4k3D"), Asset::new("SOL", "So111")];
        let response: TokensResponse = serde_json::from_value(json!({
            "schemaVersion": "1.0.0",
            "pairs": [
                {"chainId": "solana", "dexId": "raydium",
                 "baseToken": {"address": "4k3D", "symbol": "RAY"},
                 "priceUsd": "1.90", "liquidity": {"usd": 50000.0}, "volume": {"h24": 1200.0}},
                {"chainId": "solana", "dexId": "orca",
                 "baseToken": {"address": "4k3D", "symbol": "RAY"},
                 "priceUsd": "1.88", "liquidity": {"usd": 250000.0}, "volume": {"h24": 8000.0}},
                {"chainId": "ethereum",
                 "baseToken": {"address": "So111"},
                 "priceUsd": "150", "liquidity": {"usd": 9e9}},
                {"chainId": "solana",
                 "baseToken": {"address": "So111"},
                 "priceUsd": "151.2"}
            ]
        }))
        .unwrap();

        let quotes = DexScreenerClient::parse(response, &assets, 0);
        assert_eq!(quotes.len(), 2);

        assert_eq!(quotes[0].asset, "RAY");
        assert_eq!(quotes[0].price, 1.88);
        assert_eq!(quotes[0].liquidity, 250_000.0);
        assert_eq!(quotes[0].volume_24h, 8000.0);

        assert_eq!(quotes[1].asset, "SOL");
        assert_eq!(quotes[1].price, 151.2);
        assert_eq!(quotes[1].liquidity, 0.0);
    }

    #[test]
    fn null_pairs_is_an_empty_result() {
        let response: TokensResponse =
            serde_json::from_value(json!({"schemaVersion": "1.0.0", "pairs": null})).unwrap();
        assert!(DexScreenerClient::parse(response, &[Asset::new("A", "a")], 0).is_empty());
    }
}
