//! Raw explorer records and the normalized transfer events derived from them

use crate::units::{format_native, format_units, parse_decimals};
use serde::{Deserialize, Serialize};

/// Token transfer record as returned by the explorer `tokentx` action
///
/// All numeric fields arrive as strings; parsing happens in the classifier so
/// a single malformed record can be skipped without failing the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTokenTransfer {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "timeStamp", default)]
    pub time_stamp: String,
    #[serde(default)]
    pub hash: String,
    #[serde(rename = "tokenDecimal", default)]
    pub token_decimal: String,
    #[serde(rename = "tokenSymbol", default)]
    pub token_symbol: String,
    #[serde(rename = "tokenName", default)]
    pub token_name: String,
    #[serde(rename = "contractAddress", default)]
    pub contract_address: String,
}

impl RawTokenTransfer {
    /// Token amount using the record's own decimals, falling back to `default_decimals`
    pub fn amount(&self, default_decimals: u8) -> Option<f64> {
        let decimals = parse_decimals(&self.token_decimal).unwrap_or(default_decimals);
        format_units(&self.value, decimals).ok()
    }

    /// Block timestamp in milliseconds
    pub fn timestamp_ms(&self) -> Option<i64> {
        parse_timestamp_ms(&self.time_stamp)
    }
}

/// Native-currency transaction record (`txlist` / `txlistinternal`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNativeTx {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "timeStamp", default)]
    pub time_stamp: String,
    #[serde(default)]
    pub hash: String,
    #[serde(rename = "isError", default)]
    pub is_error: String,
}

/// Parsed native-currency movement
#[derive(Debug, Clone, PartialEq)]
pub struct NativeTransfer {
    pub from: String,
    pub to: String,
    pub value: f64,
    pub timestamp_ms: i64,
    pub tx_hash: String,
}

impl NativeTransfer {
    /// Parse a raw record, dropping failed, zero-valued or malformed entries
    pub fn from_raw(raw: &RawNativeTx) -> Option<Self> {
        if raw.is_error.trim() == "1" {
            return None;
        }
        let value = format_native(&raw.value).ok()?;
        if value <= 0.0 {
            return None;
        }
        Some(Self {
            from: raw.from.trim().to_ascii_lowercase(),
            to: raw.to.trim().to_ascii_lowercase(),
            value,
            timestamp_ms: parse_timestamp_ms(&raw.time_stamp)?,
            tx_hash: raw.hash.trim().to_ascii_lowercase(),
        })
    }
}

/// Direction of a token transfer relative to the subject wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

/// Which resolution step produced a native value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeValueSource {
    DirectHash,
    DirectWindow,
    InternalHash,
    InternalWindow,
    /// Derived from current prices, not observed on chain
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NativeValue {
    pub amount: f64,
    pub source: NativeValueSource,
}

impl NativeValue {
    pub fn is_estimate(&self) -> bool {
        self.source == NativeValueSource::Estimated
    }
}

/// One token movement into or out of the subject wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub action: TradeAction,
    pub amount: f64,
    pub timestamp_ms: i64,
    pub tx_hash: String,
    pub native_value: Option<NativeValue>,
}

impl TransferEvent {
    pub fn is_buy(&self) -> bool {
        matches!(self.action, TradeAction::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self.action, TradeAction::Sell)
    }

    /// Observed native amount, ignoring price-based estimates
    pub fn observed_native(&self) -> Option<f64> {
        self.native_value
            .filter(|v| !v.is_estimate())
            .map(|v| v.amount)
    }
}

/// Parse a unix-seconds string into milliseconds; negative values are malformed
pub fn parse_timestamp_ms(field: &str) -> Option<i64> {
    field
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| secs.checked_mul(1000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_explorer_token_transfer() {
        let json = r#"{"blockNumber":"41234567","timeStamp":"1718000000","hash":"0xABCDEF","from":"0x1111111111111111111111111111111111111111","contractAddress":"0x35078db252d16db8acca206498b4193a25de4774","to":"0x2222222222222222222222222222222222222222","value":"2500000000000000000000","tokenName":"Movement","tokenSymbol":"MOVE","tokenDecimal":"18","gas":"100000"}"#;

        let transfer: RawTokenTransfer = serde_json::from_str(json).unwrap();
        assert_eq!(transfer.token_symbol, "MOVE");
        assert_eq!(transfer.amount(9), Some(2500.0));
        assert_eq!(transfer.timestamp_ms(), Some(1_718_000_000_000));
    }

    #[test]
    fn test_record_decimals_fall_back() {
        let transfer = RawTokenTransfer {
            value: "1500000".to_string(),
            token_decimal: String::new(),
            ..Default::default()
        };
        assert_eq!(transfer.amount(6), Some(1.5));
    }

    #[test]
    fn test_native_transfer_filters() {
        let ok = RawNativeTx {
            from: "0xAAA".to_string(),
            to: "0xBBB".to_string(),
            value: "1000000000000000000".to_string(),
            time_stamp: "100".to_string(),
            hash: "0xHASH".to_string(),
            is_error: "0".to_string(),
        };
        let parsed = NativeTransfer::from_raw(&ok).unwrap();
        assert_eq!(parsed.value, 1.0);
        assert_eq!(parsed.from, "0xaaa");
        assert_eq!(parsed.tx_hash, "0xhash");
        assert_eq!(parsed.timestamp_ms, 100_000);

        let failed = RawNativeTx { is_error: "1".to_string(), ..ok.clone() };
        assert!(NativeTransfer::from_raw(&failed).is_none());

        let zero = RawNativeTx { value: "0".to_string(), ..ok.clone() };
        assert!(NativeTransfer::from_raw(&zero).is_none());

        let bad_time = RawNativeTx { time_stamp: "soon".to_string(), ..ok };
        assert!(NativeTransfer::from_raw(&bad_time).is_none());
    }

    #[test]
    fn test_estimated_value_not_observed() {
        let event = TransferEvent {
            action: TradeAction::Sell,
            amount: 10.0,
            timestamp_ms: 0,
            tx_hash: "0x1".to_string(),
            native_value: Some(NativeValue { amount: 2.0, source: NativeValueSource::Estimated }),
        };
        assert!(event.is_sell());
        assert_eq!(event.observed_native(), None);
    }

    #[test]
    fn test_timestamp_parsing() {
        assert_eq!(parse_timestamp_ms(" 1718000000 "), Some(1_718_000_000_000));
        assert_eq!(parse_timestamp_ms("-1"), None);
        assert_eq!(parse_timestamp_ms("9223372036854775807"), None);
        assert_eq!(parse_timestamp_ms(""), None);
    }
}
