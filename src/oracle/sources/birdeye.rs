//! Birdeye multi-price client
//!
//! Requires an `X-API-KEY` header; "public" works with tight rate limits.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::Deserialize;
use std::collections::HashMap;

use super::http::{self, lenient};
use super::{mint_list, non_negative, usable_price, QuoteSource};
use crate::error::SourceError;
use crate::types::{Asset, DexSource, Quote};

#[derive(Debug, Deserialize)]
struct MultiPriceResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: HashMap<String, Option<PriceData>>,
}

#[derive(Debug, Deserialize)]
struct PriceData {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    liquidity: Option<f64>,
}

pub struct BirdeyeClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl BirdeyeClient {
    pub fn new(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: http::normalize_base(base_url),
            api_key: api_key.to_string(),
        }
    }

    fn headers(&self) -> Result<HeaderMap, SourceError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| SourceError::Decode("Birdeye API key is not a valid header".into()))?;
        headers.insert("X-API-KEY", key);
        headers.insert("x-chain", HeaderValue::from_static("solana"));
        Ok(headers)
    }

    fn parse(
        response: MultiPriceResponse,
        assets: &[Asset],
        ts: i64,
    ) -> Result<Vec<Quote>, SourceError> {
        if !response.success {
            return Err(SourceError::Decode(
                "Birdeye response flagged success=false".into(),
            ));
        }

        Ok(assets
            .iter()
            .filter_map(|asset| {
                let data = response.data.get(&asset.mint)?.as_ref()?;
                let price = usable_price(data.value?)?;
                Some(Quote {
                    liquidity: non_negative(data.liquidity),
                    ..Quote::price_only(DexSource::Birdeye, &asset.symbol, price, ts)
                })
            })
            .collect())
    }
}

#[async_trait]
impl QuoteSource for BirdeyeClient {
    fn id(&self) -> DexSource {
        DexSource::Birdeye
    }

    async fn fetch_quotes(&self, assets: &[Asset]) -> Result<Vec<Quote>, SourceError> {
        let url = format!(
            "{}/public/multi_price?list_address={}",
            self.base_url,
            mint_list(assets)
        );
        let response: MultiPriceResponse =
            http::get_json(&self.client, &url, Some(self.headers()?)).await?;
        Self::parse(response, assets, chrono::Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_values_and_optional_liquidity() {
        let assets = vec![
            Asset::new("SOL", "So111"),
            Asset::new("BONK", "Dez"),
            Asset::new("JUP", "JUPy"),
        ];
        let response: MultiPriceResponse = serde_json::from_value(json!({
            "success": true,
            "data": {
                "So111": {"value": 150.4, "updateUnixTime": 1700000000, "liquidity": 2500000.0},
                "Dez": {"value": 0.000021},
                "JUPy": {"value": 0}
            }
        }))
        .unwrap();

        let quotes = BirdeyeClient::parse(response, &assets, 0).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].asset, "SOL");
        assert_eq!(quotes[0].liquidity, 2_500_000.0);
        assert_eq!(quotes[1].asset, "BONK");
        assert_eq!(quotes[1].liquidity, 0.0);
    }

    #[test]
    fn unsuccessful_response_is_an_error() {
        let response: MultiPriceResponse =
            serde_json::from_value(json!({"success": false, "message": "Unauthorized"})).unwrap();
        let result = BirdeyeClient::parse(response, &[Asset::new("A", "a")], 0);
        assert!(matches!(result, Err(SourceError::Decode(_))));
    }
}
