//! DexScreener API Integration
//!
//! Provides current market data for a token:
//! - Price (USD) and 24h price change
//! - 24h volume and liquidity
//! - Fully diluted valuation (used as market cap)
//!
//! ## API Reference
//!
//! Endpoint: https://api.dexscreener.com/latest/dex/tokens/{address}
//! Returns: `{"pairs": [...]}` across all chains; pairs are filtered by
//! `chainId` and the most liquid one wins.

use super::{lenient_f64, SourceError};
use crate::analysis::MarketSnapshot;
use log::debug;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokensResponse {
    #[serde(default)]
    pub pairs: Option<Vec<DexScreenerPair>>,
}

/// DexScreener pair response structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexScreenerPair {
    #[serde(rename = "chainId", default)]
    pub chain_id: String,
    #[serde(rename = "baseToken", default)]
    pub base_token: PairToken,
    #[serde(rename = "priceUsd", default, deserialize_with = "lenient_f64")]
    pub price_usd: f64,
    #[serde(rename = "priceChange", default)]
    pub price_change: Option<Timeframes>,
    #[serde(default)]
    pub volume: Option<Timeframes>,
    #[serde(default)]
    pub liquidity: Option<Liquidity>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fdv: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairToken {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Timeframes {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub h24: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Liquidity {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub usd: f64,
}

impl DexScreenerPair {
    fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().map(|l| l.usd).unwrap_or(0.0)
    }

    pub fn to_snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            price_usd: self.price_usd,
            price_change_24h: self.price_change.as_ref().map(|t| t.h24).unwrap_or(0.0),
            volume_24h_usd: self.volume.as_ref().map(|t| t.h24).unwrap_or(0.0),
            liquidity_usd: self.liquidity_usd(),
            market_cap: self.fdv,
        }
    }
}

/// Most liquid pair on `chain_id`, optionally restricted to pairs where
/// `base_address` is the base token
pub fn select_main_pair<'a>(
    pairs: &'a [DexScreenerPair],
    chain_id: &str,
    base_address: Option<&str>,
) -> Option<&'a DexScreenerPair> {
    pairs
        .iter()
        .filter(|p| p.chain_id == chain_id)
        .filter(|p| base_address.map_or(true, |addr| p.base_token.address.eq_ignore_ascii_case(addr)))
        .fold(None, |best: Option<&DexScreenerPair>, pair| match best {
            Some(current) if current.liquidity_usd() >= pair.liquidity_usd() => Some(current),
            _ => Some(pair),
        })
}

pub struct DexScreenerClient {
    http: reqwest::Client,
    base_url: String,
    chain_id: String,
}

impl DexScreenerClient {
    pub fn new(http: reqwest::Client, base_url: &str, chain_id: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain_id: chain_id.to_string(),
        }
    }

    /// Fetch all pairs listing `token`
    pub async fn fetch_pairs(&self, token: &str) -> Result<Vec<DexScreenerPair>, SourceError> {
        let url = format!("{}/latest/dex/tokens/{}", self.base_url, token);

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body: TokensResponse = response.json().await?;
        let pairs = body.pairs.unwrap_or_default();
        debug!("DexScreener returned {} pairs for {}", pairs.len(), token);
        Ok(pairs)
    }

    /// Market data of the token's most liquid pair on the configured chain
    pub async fn fetch_market_snapshot(&self, token: &str) -> Result<Option<MarketSnapshot>, SourceError> {
        let pairs = self.fetch_pairs(token).await?;
        Ok(select_main_pair(&pairs, &self.chain_id, None).map(DexScreenerPair::to_snapshot))
    }

    /// USD price of `token`, preferring pairs where it is the base token
    pub async fn fetch_price_usd(&self, token: &str) -> Result<Option<f64>, SourceError> {
        let pairs = self.fetch_pairs(token).await?;
        let pair = select_main_pair(&pairs, &self.chain_id, Some(token))
            .or_else(|| select_main_pair(&pairs, &self.chain_id, None));
        Ok(pair.map(|p| p.price_usd).filter(|price| *price > 0.0))
    }
}
