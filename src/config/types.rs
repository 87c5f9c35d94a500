//! Static defaults: tracked Solana mints and vendor endpoints

use crate::types::Asset;

pub const JUPITER_URL: &str = "https://price.jup.ag";
pub const RAYDIUM_URL: &str = "https://api.raydium.io";
pub const ORCA_URL: &str = "https://api.mainnet.orca.so";
pub const BIRDEYE_URL: &str = "https://public-api.birdeye.so";
pub const METEORA_URL: &str = "https://dlmm-api.meteora.ag";
pub const DEXSCREENER_URL: &str = "https://api.dexscreener.com";

/// Default token set (Solana mainnet mints)
pub fn default_assets() -> Vec<Asset> {
    vec![
        Asset::new("SOL", "So11111111111111111111111111111111111111112"),
        Asset::stable("USDC", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
        Asset::stable("USDT", "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB"),
        Asset::new("BONK", "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263"),
        Asset::new("JUP", "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN"),
        Asset::new("RAY", "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R"),
        Asset::new("ORCA", "orcaEKTdK7LKz57vaAYr9QeNsVEPfiu6QeMU1kektZE"),
    ]
}
