//! Jupiter Price API client
//!
//! Jupiter aggregates most Solana DEXes, so its price is usually the best
//! single reference. No liquidity or volume is reported.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use super::http::{self, lenient};
use super::{mint_list, usable_price, QuoteSource};
use crate::error::SourceError;
use crate::types::{Asset, DexSource, Quote};

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    data: HashMap<String, Option<PriceEntry>>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    price: Option<f64>,
}

pub struct JupiterClient {
    client: Client,
    base_url: String,
}

impl JupiterClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: http::normalize_base(base_url),
        }
    }

    fn parse(response: PriceResponse, assets: &[Asset], ts: i64) -> Vec<Quote> {
        assets
            .iter()
            .filter_map(|asset| {
                let entry = response.data.get(&asset.mint)?.as_ref()?;
                let price = usable_price(entry.price?)?;
                Some(Quote::price_only(DexSource::Jupiter, &asset.symbol, price, ts))
            })
            .collect()
    }
}

#[async_trait]
impl QuoteSource for JupiterClient {
    fn id(&self) -> DexSource {
        DexSource::Jupiter
    }

    async fn fetch_quotes(&self, assets: &[Asset]) -> Result<Vec<Quote>, SourceError> {
        let url = format!("{}/v4/price?ids={}", self.base_url, mint_list(assets));
        let response: PriceResponse = http::get_json(&self.client, &url, None).await?;
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
    fn parses_known_mints_and_skips_the_rest() {
        let assets = vec![
            Asset::new("SOL", "So111"),
            Asset::new("JUP", "JUPy"),
            Asset::new("RAY", "4k3D"),
        ];
        let payload = json!({
            "data": {
                "So111": {"id": "So111", "mintSymbol": "SOL", "price": 151.25},
                "JUPy": {"id": "JUPy", "price": "0.91"},
                "unrelated": {"price": 3.0}
            },
            "timeTaken": 0.002
        });

        let response: PriceResponse = serde_json::from_value(payload).unwrap();
        let quotes = JupiterClient::parse(response, &assets, 42);

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].asset, "SOL");
        assert_eq!(quotes[0].price, 151.25);
        assert_eq!(quotes[0].liquidity, 0.0);
        assert_eq!(quotes[1].asset, "JUP");
        assert_eq!(quotes[1].price, 0.91);
        assert!(quotes.iter().all(|q| q.source == DexSource::Jupiter && q.ts == 42));
    }

    #[test]
    fn null_and_zero_prices_are_omitted() {
        let assets = vec![Asset::new("A", "a"), Asset::new("B", "b")];
        let payload = json!({"data": {"a": null, "b": {"price": 0}}});
        let response: PriceResponse = serde_json::from_value(payload).unwrap();
        assert!(JupiterClient::parse(response, &assets, 0).is_empty());
    }

    #[test]
    fn missing_data_field_is_tolerated() {
        let response: PriceResponse = serde_json::from_value(json!({"error": "x"})).unwrap();
        assert!(JupiterClient::parse(response, &[Asset::new("A", "a")], 0).is_empty());
    }
}
