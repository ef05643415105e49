//! Etherscan v2 compatible block explorer client
//!
//! ## API Reference
//!
//! Endpoint: `{base}?chainid={id}&module=...&action=...&apikey=...`
//! Every response is wrapped in `{"status": "1"|"0", "message": ..., "result": ...}`.
//! `status == "0"` with a "No ... found" message is an empty result, any other
//! `"0"` is an upstream error.

use super::{ChainDataSource, SourceError};
use crate::analysis::{RawNativeTx, RawTokenTransfer, TokenInfo};
use crate::units::{parse_decimals, DEFAULT_TOKEN_DECIMALS};
use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

impl Envelope {
    /// Unwrap the result, mapping "no records" to `None`
    fn into_result(self) -> Result<Option<Value>, SourceError> {
        if self.status == "1" {
            return Ok(Some(self.result));
        }
        if self.message.starts_with("No ") || (self.message.is_empty() && self.result.is_null()) {
            return Ok(None);
        }
        let detail = match &self.result {
            Value::String(s) => format!("{}: {}", self.message, s),
            _ => self.message,
        };
        Err(SourceError::Upstream(detail))
    }
}

/// Parse a list result, tolerating the explorer's empty-list conventions
fn parse_list<T: DeserializeOwned>(envelope: Envelope) -> Result<Vec<T>, SourceError> {
    match envelope.into_result()? {
        Some(value @ Value::Array(_)) => Ok(serde_json::from_value(value)?),
        Some(other) => Err(SourceError::Decode(format!("expected array result, got {}", other))),
        None => Ok(Vec::new()),
    }
}

#[derive(Debug, Deserialize)]
struct RawTokenInfo {
    #[serde(default, alias = "tokenSymbol")]
    symbol: String,
    #[serde(default, alias = "tokenName")]
    name: String,
    #[serde(default, alias = "divisor", alias = "tokenDecimal")]
    decimals: Value,
}

/// Token info result may be an object or a single-element array
fn parse_token_info(result: Value) -> Result<Option<TokenInfo>, SourceError> {
    let entry = match result {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        Value::Array(_) | Value::Null => return Ok(None),
        other => other,
    };
    let raw: RawTokenInfo = serde_json::from_value(entry)?;

    let decimals = match &raw.decimals {
        Value::String(s) => parse_decimals(s),
        Value::Number(n) => n.as_u64().and_then(|d| u8::try_from(d).ok()),
        _ => None,
    };

    let defaults = TokenInfo::default();
    Ok(Some(TokenInfo {
        symbol: if raw.symbol.is_empty() { defaults.symbol } else { raw.symbol },
        name: if raw.name.is_empty() { defaults.name } else { raw.name },
        decimals: decimals.unwrap_or(DEFAULT_TOKEN_DECIMALS),
    }))
}

pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: String,
    chain_id: u64,
    api_key: String,
    page_size: u32,
}

impl ExplorerClient {
    pub fn new(http: reqwest::Client, base_url: &str, chain_id: u64, api_key: &str, page_size: u32) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain_id,
            api_key: api_key.to_string(),
            page_size,
        }
    }

    async fn request(&self, params: &[(&str, &str)]) -> Result<Envelope, SourceError> {
        let chain_id = self.chain_id.to_string();
        let mut query: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 2);
        query.push(("chainid", chain_id.as_str()));
        query.extend_from_slice(params);
        query.push(("apikey", self.api_key.as_str()));

        let action = params.iter().find(|(k, _)| *k == "action").map(|(_, v)| *v).unwrap_or("?");
        debug!("Explorer request: action={}", action);

        let response = self.http.get(&self.base_url).query(&query).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }
        Ok(response.json::<Envelope>().await?)
    }

    /// First page of an account listing, oldest first
    async fn account_list<T: DeserializeOwned>(
        &self,
        action: &str,
        extra: &[(&str, &str)],
    ) -> Result<Vec<T>, SourceError> {
        let offset = self.page_size.to_string();
        let mut params: Vec<(&str, &str)> = vec![("module", "account"), ("action", action)];
        params.extend_from_slice(extra);
        params.extend_from_slice(&[("page", "1"), ("offset", offset.as_str()), ("sort", "asc")]);

        parse_list(self.request(&params).await?)
    }
}

#[async_trait]
impl ChainDataSource for ExplorerClient {
    async fn token_info(&self, contract: &str) -> Result<Option<TokenInfo>, SourceError> {
        let envelope = self
            .request(&[("module", "token"), ("action", "tokeninfo"), ("contractaddress", contract)])
            .await?;
        match envelope.into_result()? {
            Some(result) => parse_token_info(result),
            None => Ok(None),
        }
    }

    async fn token_balance(&self, contract: &str, address: &str) -> Result<Option<String>, SourceError> {
        let envelope = self
            .request(&[
                ("module", "account"),
                ("action", "tokenbalance"),
                ("contractaddress", contract),
                ("address", address),
                ("tag", "latest"),
            ])
            .await?;
        Ok(match envelope.into_result()? {
            Some(Value::String(raw)) => Some(raw),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    async fn token_transfers(&self, contract: &str, address: &str) -> Result<Vec<RawTokenTransfer>, SourceError> {
        self.account_list("tokentx", &[("contractaddress", contract), ("address", address)])
            .await
    }

    async fn native_transactions(&self, address: &str) -> Result<Vec<RawNativeTx>, SourceError> {
        self.account_list("txlist", &[("address", address)]).await
    }

    async fn internal_transactions(&self, address: &str) -> Result<Vec<RawNativeTx>, SourceError> {
        self.account_list("txlistinternal", &[("address", address)]).await
    }

    async fn internal_transactions_by_hash(&self, address: &str, tx_hash: &str) -> Result<Vec<RawNativeTx>, SourceError> {
        let envelope = self
            .request(&[
                ("module", "account"),
                ("action", "txlistinternal"),
                ("address", address),
                ("txhash", tx_hash),
            ])
            .await?;
        let mut txs: Vec<RawNativeTx> = parse_list(envelope)?;

        // Lookups by hash omit the hash field on each entry
        for tx in txs.iter_mut().filter(|tx| tx.hash.is_empty()) {
            tx.hash = tx_hash.to_string();
        }
        Ok(txs)
    }

    fn source_name(&self) -> &'static str {
        "explorer"
    }
}
