//! Analyzer configuration from environment variables

use crate::address::{parse_address, WalletAddress};
use crate::error::ConfigError;
use std::env;
use std::time::Duration;

pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x35078DB252d16DB8aCca206498b4193a25DE4774";
pub const DEFAULT_EXPLORER_API_BASE: &str = "https://api.etherscan.io/v2/api";
pub const DEFAULT_DEXSCREENER_API_BASE: &str = "https://api.dexscreener.com";
pub const DEFAULT_NATIVE_PRICE_API_BASE: &str = "https://api.coingecko.com/api/v3";
/// WBNB on BNB Smart Chain
pub const DEFAULT_WRAPPED_NATIVE_ADDRESS: &str = "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c";

/// Configuration for the analyzer and its data sources
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Token contract being analyzed
    pub contract: WalletAddress,

    /// Explorer API key; the explorer is not queried without one
    pub explorer_api_key: Option<String>,

    pub explorer_api_base: String,
    pub explorer_chain_id: u64,

    /// Records requested per explorer listing
    pub explorer_page_size: u32,

    pub dexscreener_api_base: String,

    /// DexScreener `chainId` used to filter pairs
    pub dex_chain_id: String,

    pub native_price_api_base: String,
    pub native_coingecko_id: String,
    pub wrapped_native_address: String,

    pub http_timeout: Duration,
    pub bind_addr: String,
}

impl AnalyzerConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `CONTRACT_ADDRESS` (default: 0x35078DB252d16DB8aCca206498b4193a25DE4774)
    /// - `EXPLORER_API_KEY` or `BSCSCAN_API_KEY` (optional)
    /// - `EXPLORER_API_BASE` (default: https://api.etherscan.io/v2/api)
    /// - `EXPLORER_CHAIN_ID` (default: 56)
    /// - `EXPLORER_PAGE_SIZE` (default: 100)
    /// - `DEXSCREENER_API_BASE` (default: https://api.dexscreener.com)
    /// - `DEX_CHAIN_ID` (default: bsc)
    /// - `NATIVE_PRICE_API_BASE` (default: https://api.coingecko.com/api/v3)
    /// - `NATIVE_COINGECKO_ID` (default: binancecoin)
    /// - `WRAPPED_NATIVE_ADDRESS` (default: WBNB)
    /// - `HTTP_TIMEOUT_SECS` (default: 10)
    /// - `BIND_ADDR` (default: 0.0.0.0:3000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let string_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let contract_raw = string_or("CONTRACT_ADDRESS", DEFAULT_CONTRACT_ADDRESS);
        let contract = parse_address(&contract_raw)
            .map_err(|_| ConfigError::InvalidValue(format!("CONTRACT_ADDRESS={}", contract_raw)))?;

        Ok(Self {
            contract,

            explorer_api_key: get("EXPLORER_API_KEY").or_else(|| get("BSCSCAN_API_KEY")),

            explorer_api_base: string_or("EXPLORER_API_BASE", DEFAULT_EXPLORER_API_BASE),

            explorer_chain_id: get("EXPLORER_CHAIN_ID")
                .and_then(|s| s.parse().ok())
                .unwrap_or(56),

            explorer_page_size: get("EXPLORER_PAGE_SIZE")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(100),

            dexscreener_api_base: string_or("DEXSCREENER_API_BASE", DEFAULT_DEXSCREENER_API_BASE),
            dex_chain_id: string_or("DEX_CHAIN_ID", "bsc"),

            native_price_api_base: string_or("NATIVE_PRICE_API_BASE", DEFAULT_NATIVE_PRICE_API_BASE),
            native_coingecko_id: string_or("NATIVE_COINGECKO_ID", "binancecoin"),
            wrapped_native_address: string_or("WRAPPED_NATIVE_ADDRESS", DEFAULT_WRAPPED_NATIVE_ADDRESS),

            http_timeout: Duration::from_secs(
                get("HTTP_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .filter(|n| *n > 0)
                    .unwrap_or(10),
            ),

            bind_addr: string_or("BIND_ADDR", "0.0.0.0:3000"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AnalyzerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AnalyzerConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.contract.checksummed(), DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(config.explorer_api_key, None);
        assert_eq!(config.explorer_api_base, DEFAULT_EXPLORER_API_BASE);
        assert_eq!(config.explorer_chain_id, 56);
        assert_eq!(config.explorer_page_size, 100);
        assert_eq!(config.dex_chain_id, "bsc");
        assert_eq!(config.native_coingecko_id, "binancecoin");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_api_key_alias() {
        let config = config_from(&[("BSCSCAN_API_KEY", "legacy")]).unwrap();
        assert_eq!(config.explorer_api_key.as_deref(), Some("legacy"));

        let config = config_from(&[("BSCSCAN_API_KEY", "legacy"), ("EXPLORER_API_KEY", "primary")]).unwrap();
        assert_eq!(config.explorer_api_key.as_deref(), Some("primary"));

        let config = config_from(&[("EXPLORER_API_KEY", "  ")]).unwrap();
        assert_eq!(config.explorer_api_key, None);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[
            ("EXPLORER_CHAIN_ID", "bsc"),
            ("EXPLORER_PAGE_SIZE", "0"),
            ("HTTP_TIMEOUT_SECS", "-3"),
        ])
        .unwrap();

        assert_eq!(config.explorer_chain_id, 56);
        assert_eq!(config.explorer_page_size, 100);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CONTRACT_ADDRESS", "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
            ("EXPLORER_CHAIN_ID", "1"),
            ("DEX_CHAIN_ID", "ethereum"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ])
        .unwrap();

        assert_eq!(config.contract.checksummed(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(config.explorer_chain_id, 1);
        assert_eq!(config.dex_chain_id, "ethereum");
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_contract_rejected() {
        let err = config_from(&[("CONTRACT_ADDRESS", "not-an-address")]).unwrap_err();
        assert!(err.to_string().contains("CONTRACT_ADDRESS"));
    }
}
