//! Error taxonomy
//!
//! Source-level failures are absorbed by the collector; configuration errors
//! abort startup. Everything else flows through `anyhow`.

use thiserror::Error;

/// Why a quote source contributed nothing this cycle
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Decode(e.to_string())
    }
}

/// Startup configuration errors
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("no assets configured")]
    NoAssets,

    #[error("duplicate asset symbol: {0}")]
    DuplicateAsset(String),

    #[error("asset {0} has an empty mint")]
    EmptyMint(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("no quote sources enabled")]
    NoSources,
}
