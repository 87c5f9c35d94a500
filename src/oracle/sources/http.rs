//! Shared HTTP plumbing for the REST quote sources

use anyhow::{Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::SourceError;

/// Build the pooled client used by every source.
///
/// The client timeout is a backstop; the collector enforces the real
/// per-source deadline.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .context("Failed to create HTTP client")
}

/// GET `url` and decode the JSON body, mapping non-2xx to `SourceError::Status`.
///
/// Decoding runs on the blocking pool since some payloads are several MB.
pub async fn get_json<T>(
    client: &Client,
    url: &str,
    headers: Option<HeaderMap>,
) -> Result<T, SourceError>
where
    T: DeserializeOwned + Send + 'static,
{
    let mut request = client.get(url);
    if let Some(headers) = headers {
        request = request.headers(headers);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    tokio::task::spawn_blocking(move || serde_json::from_slice::<T>(&body))
        .await
        .map_err(|e| SourceError::Decode(format!("decode task failed: {}", e)))?
        .map_err(SourceError::from)
}

/// Trim a trailing slash so `format!("{}/path", base)` stays well-formed
pub fn normalize_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Vendors disagree on whether numbers are JSON numbers or strings
pub mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    pub fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<NumberOrString>::deserialize(deserializer)?;
        Ok(match value {
            Some(NumberOrString::Number(n)) => Some(n),
            Some(NumberOrString::Text(s)) => s.trim().parse::<f64>().ok(),
            Some(NumberOrString::Other(_)) | None => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient::f64_opt")]
        value: Option<f64>,
    }

    #[test]
    fn lenient_number_parsing() {
        let p: Probe = serde_json::from_str(r#"{"value": 1.25}"#).unwrap();
        assert_eq!(p.value, Some(1.25));
        let p: Probe = serde_json::from_str(r#"{"value": "2.5"}"#).unwrap();
        assert_eq!(p.value, Some(2.5));
        let p: Probe = serde_json::from_str(r#"{"value": "n/a"}"#).unwrap();
        assert_eq!(p.value, None);
        let p: Probe = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(p.value, None);
        let p: Probe = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.value, None);
        let p: Probe = serde_json::from_str(r#"{"value": {"nested": 1}}"#).unwrap();
        assert_eq!(p.value, None);
    }

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(normalize_base("https://x.io/"), "https://x.io");
        assert_eq!(normalize_base("https://x.io"), "https://x.io");
    }
}
