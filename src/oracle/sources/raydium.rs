//! Raydium price API client
//!
//! The endpoint returns a flat `mint -> price` map for every token Raydium
//! pools know about.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;

use super::http;
use super::{usable_price, QuoteSource};
use crate::error::SourceError;
use crate::types::{Asset, DexSource, Quote};

pub struct RaydiumClient {
    client: Client,
    base_url: String,
}

impl RaydiumClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: http::normalize_base(base_url),
        }
    }

    fn parse(prices: &HashMap<String, Value>, assets: &[Asset], ts: i64) -> Vec<Quote> {
        assets
            .iter()
            .filter_map(|asset| {
                let raw = prices.get(&asset.mint)?;
                let price = match raw {
                    Value::Number(n) => n.as_f64()?,
                    Value::String(s) => s.parse::<f64>().ok()?,
                    _ => return None,
                };
                let price = usable_price(price)?;
                Some(Quote::price_only(DexSource::Raydium, &asset.symbol, price, ts))
            })
            .collect()
    }
}

#[async_trait]
impl QuoteSource for RaydiumClient {
    fn id(&self) -> DexSource {
        DexSource::Raydium
    }

    async fn fetch_quotes(&self, assets: &[Asset]) -> Result<Vec<Quote>, SourceError> {
        let url = format!("{}/v2/main/price", self.base_url);
        let prices: HashMap<String, Value> = http::get_json(&self.client, &url, None).await?;
        Ok(Self::parse(
            &prices,
            assets,
            chrono::Utc::now().timestamp_millis(),
        ))
    }
}
