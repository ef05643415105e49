//! External data sources
//!
//! The analyzer only talks to these traits. Concrete clients:
//! - `ExplorerClient` - Etherscan v2 compatible block explorer
//! - `DexScreenerClient` - pair market data
//! - `CoinGeckoClient` - native currency USD price
//! - `MarketDataClient` - DexScreener + CoinGecko with wrapped-native fallback

pub mod coingecko;
pub mod dexscreener;
pub mod explorer;
pub mod market;

use crate::analysis::{MarketSnapshot, RawNativeTx, RawTokenTransfer, TokenInfo};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use coingecko::CoinGeckoClient;
pub use dexscreener::DexScreenerClient;
pub use explorer::ExplorerClient;
pub use market::MarketDataClient;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(err.to_string())
    }
}

/// On-chain history of a wallet for a single token
#[async_trait]
pub trait ChainDataSource: Send + Sync {
    /// Token metadata; `None` when the explorer has no record
    async fn token_info(&self, contract: &str) -> Result<Option<TokenInfo>, SourceError>;

    /// Raw integer token balance
    async fn token_balance(&self, contract: &str, address: &str) -> Result<Option<String>, SourceError>;

    /// Token transfers touching `address`, oldest first
    async fn token_transfers(&self, contract: &str, address: &str) -> Result<Vec<RawTokenTransfer>, SourceError>;

    /// Direct native-currency transactions of `address`, oldest first
    async fn native_transactions(&self, address: &str) -> Result<Vec<RawNativeTx>, SourceError>;

    /// Internal native-currency transactions of `address`, oldest first
    async fn internal_transactions(&self, address: &str) -> Result<Vec<RawNativeTx>, SourceError>;

    /// Internal native-currency transactions created by one transaction
    async fn internal_transactions_by_hash(&self, address: &str, tx_hash: &str) -> Result<Vec<RawNativeTx>, SourceError>;

    /// Get source name for logging
    fn source_name(&self) -> &'static str;
}

/// Current market data
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Market data of the token's most liquid pair
    async fn market_snapshot(&self, token: &str) -> Result<Option<MarketSnapshot>, SourceError>;

    /// USD price of the chain's native currency
    async fn native_price_usd(&self) -> Result<Option<f64>, SourceError>;
}

/// Shared HTTP client with a request timeout
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, SourceError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("paperhand/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Lenient float field: accepts JSON numbers, numeric strings and null
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}
