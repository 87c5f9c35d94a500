//! Orca token list client (Whirlpool USD prices)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use super::http::{self, lenient};
use super::{usable_price, QuoteSource};
use crate::error::SourceError;
use crate::types::{Asset, DexSource, Quote};

#[derive(Debug, Deserialize)]
struct TokenList {
    #[serde(default)]
    tokens: Vec<OrcaToken>,
}

#[derive(Debug, Deserialize)]
struct OrcaToken {
    #[serde(default)]
    mint: Option<String>,
    #[serde(default, rename = "usdPrice", deserialize_with = "lenient::f64_opt")]
    usd_price: Option<f64>,
}

pub struct OrcaClient {
    client: Client,
    base_url: String,
}

impl OrcaClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: http::normalize_base(base_url),
        }
    }

    fn parse(list: TokenList, assets: &[Asset], ts: i64) -> Vec<Quote> {
        let price_by_mint: HashMap<String, f64> = list
            .tokens
            .into_iter()
            .filter_map(|t| Some((t.mint?, usable_price(t.usd_price?)?)))
            .collect();

        assets
            .iter()
            .filter_map(|asset| {
                let price = *price_by_mint.get(&asset.mint)?;
                Some(Quote::price_only(DexSource::Orca, &asset.symbol, price, ts))
            })
            .collect()
    }
}

#[async_trait]
impl QuoteSource for OrcaClient {
    fn id(&self) -> DexSource {
        DexSource::Orca
    }

    async fn fetch_quotes(&self, assets: &[Asset]) -> Result<Vec<Quote>, SourceError> {
        let url = format!("{}/v1/token/list", self.base_url);
        let list: TokenList = http::get_json(&self.client, &url, None).await?;
        Ok(Self::parse(list, assets, chrono::Utc::now().timestamp_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_token_list_to_quotes() {
        let assets = vec![Asset::new("ORCA", "orca"), Asset::new("SOL", "So111")];
        let list: TokenList = serde_json::from_value(json!({
            "tokens": [
                {"mint": "orca", "symbol": "ORCA", "usdPrice": 3.42, "decimals": 6},
                {"mint": "So111", "usdPrice": null},
                {"symbol": "NOMINT", "usdPrice": 1.0}
            ]
        }))
        .unwrap();

        let quotes = OrcaClient::parse(list, &assets, 0);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].asset, "ORCA");
        assert_eq!(quotes[0].price, 3.42);
        assert_eq!(quotes[0].source, DexSource::Orca);
    }

    #[test]
    fn empty_payload_yields_no_quotes() {
        let list: TokenList = serde_json::from_value(json!({})).unwrap();
        assert!(OrcaClient::parse(list, &[Asset::new("A", "a")], 0).is_empty());
    }
}
