//! CoinGecko simple price lookup
//!
//! Endpoint: `{base}/simple/price?ids={id}&vs_currencies=usd`
//! Returns: `{"binancecoin": {"usd": 612.4}}`

use super::SourceError;
use std::collections::HashMap;

#[derive(Debug, serde::Deserialize)]
struct UsdQuote {
    usd: Option<f64>,
}

fn extract_usd(body: &HashMap<String, UsdQuote>, coin_id: &str) -> Option<f64> {
    body.get(coin_id)
        .and_then(|quote| quote.usd)
        .filter(|price| *price > 0.0)
}

pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
    coin_id: String,
}

impl CoinGeckoClient {
    pub fn new(http: reqwest::Client, base_url: &str, coin_id: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            coin_id: coin_id.to_string(),
        }
    }

    pub async fn fetch_price_usd(&self) -> Result<Option<f64>, SourceError> {
        let url = format!("{}/simple/price", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("ids", self.coin_id.as_str()), ("vs_currencies", "usd")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body: HashMap<String, UsdQuote> = response.json().await?;
        Ok(extract_usd(&body, &self.coin_id))
    }
}
