//! DexScan Library
//!
//! Cross-DEX price aggregation and arbitrage route detection for Solana

pub mod arbitrage;
pub mod config;
pub mod error;
pub mod oracle;
pub mod persistence;
pub mod report;
pub mod scanner;
pub mod types;
