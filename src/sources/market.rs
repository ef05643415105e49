//! Market data combining DexScreener and CoinGecko

use super::{CoinGeckoClient, DexScreenerClient, MarketDataSource, SourceError};
use crate::analysis::MarketSnapshot;
use async_trait::async_trait;
use log::warn;

pub struct MarketDataClient {
    dex: DexScreenerClient,
    coingecko: CoinGeckoClient,
    wrapped_native: String,
}

impl MarketDataClient {
    pub fn new(dex: DexScreenerClient, coingecko: CoinGeckoClient, wrapped_native: &str) -> Self {
        Self {
            dex,
            coingecko,
            wrapped_native: wrapped_native.to_string(),
        }
    }
}

#[async_trait]
impl MarketDataSource for MarketDataClient {
    async fn market_snapshot(&self, token: &str) -> Result<Option<MarketSnapshot>, SourceError> {
        self.dex.fetch_market_snapshot(token).await
    }

    /// CoinGecko first, then the wrapped native token's DexScreener price
    async fn native_price_usd(&self) -> Result<Option<f64>, SourceError> {
        match self.coingecko.fetch_price_usd().await {
            Ok(Some(price)) => return Ok(Some(price)),
            Ok(None) => warn!("⚠️  CoinGecko returned no native price, trying DexScreener"),
            Err(e) => warn!("⚠️  CoinGecko native price failed ({}), trying DexScreener", e),
        }
        self.dex.fetch_price_usd(&self.wrapped_native).await
    }
}
