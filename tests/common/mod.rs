//! Mock data sources shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use paperhand::analysis::{MarketSnapshot, RawNativeTx, RawTokenTransfer, TokenInfo};
use paperhand::sources::{ChainDataSource, MarketDataSource, SourceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const CONTRACT: &str = "0x35078DB252d16DB8aCca206498b4193a25DE4774";
pub const WALLET: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
pub const WALLET_CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
pub const PAIR: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";

/// 2024-06-10 06:13:20 UTC
pub const BASE_TS: i64 = 1_718_000_000;
pub const HOUR: i64 = 3_600;

pub fn token_transfer(from: &str, to: &str, tokens: u64, ts: i64, hash: &str) -> RawTokenTransfer {
    RawTokenTransfer {
        from: from.to_string(),
        to: to.to_string(),
        value: format!("{}000000000000000000", tokens),
        time_stamp: ts.to_string(),
        hash: hash.to_string(),
        token_decimal: "18".to_string(),
        token_symbol: "MOVE".to_string(),
        token_name: "Movement".to_string(),
        contract_address: CONTRACT.to_lowercase(),
    }
}

pub fn native_tx(from: &str, to: &str, wei: &str, ts: i64, hash: &str) -> RawNativeTx {
    RawNativeTx {
        from: from.to_string(),
        to: to.to_string(),
        value: wei.to_string(),
        time_stamp: ts.to_string(),
        hash: hash.to_string(),
        is_error: "0".to_string(),
    }
}

/// Canned explorer data with a call counter
#[derive(Default)]
pub struct MockChain {
    pub token_info: Option<TokenInfo>,
    pub balance: Option<String>,
    pub transfers: Vec<RawTokenTransfer>,
    pub native: Vec<RawNativeTx>,
    pub internal: Vec<RawNativeTx>,
    /// Internal legs returned only by per-hash lookups
    pub internal_by_hash: Vec<RawNativeTx>,
    pub fail_transfers: bool,
    pub fail_everything_else: bool,
    pub calls: AtomicUsize,
    pub hash_lookups: AtomicUsize,
}

impl MockChain {
    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_everything_else {
            return Err(SourceError::Status(503));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainDataSource for MockChain {
    async fn token_info(&self, _contract: &str) -> Result<Option<TokenInfo>, SourceError> {
        self.hit()?;
        Ok(self.token_info.clone())
    }

    async fn token_balance(&self, _contract: &str, _address: &str) -> Result<Option<String>, SourceError> {
        self.hit()?;
        Ok(self.balance.clone())
    }

    async fn token_transfers(&self, _contract: &str, _address: &str) -> Result<Vec<RawTokenTransfer>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_transfers {
            return Err(SourceError::Upstream("NOTOK: Max rate limit reached".to_string()));
        }
        Ok(self.transfers.clone())
    }

    async fn native_transactions(&self, _address: &str) -> Result<Vec<RawNativeTx>, SourceError> {
        self.hit()?;
        Ok(self.native.clone())
    }

    async fn internal_transactions(&self, _address: &str) -> Result<Vec<RawNativeTx>, SourceError> {
        self.hit()?;
        Ok(self.internal.clone())
    }

    async fn internal_transactions_by_hash(&self, _address: &str, tx_hash: &str) -> Result<Vec<RawNativeTx>, SourceError> {
        self.hit()?;
        self.hash_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .internal_by_hash
            .iter()
            .filter(|tx| tx.hash.eq_ignore_ascii_case(tx_hash))
            .cloned()
            .collect())
    }

    fn source_name(&self) -> &'static str {
        "mock"
    }
}

#[derive(Default)]
pub struct MockMarket {
    pub snapshot: Option<MarketSnapshot>,
    pub native_price: Option<f64>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl MockMarket {
    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for MockMarket {
    async fn market_snapshot(&self, _token: &str) -> Result<Option<MarketSnapshot>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SourceError::Status(429));
        }
        Ok(self.snapshot.clone())
    }

    async fn native_price_usd(&self) -> Result<Option<f64>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SourceError::Decode("unexpected body".to_string()));
        }
        Ok(self.native_price)
    }
}

pub fn analyzer(chain: Arc<MockChain>, market: Arc<MockMarket>) -> paperhand::WalletAnalyzer {
    let contract = paperhand::parse_address(CONTRACT).unwrap();
    let chain: Arc<dyn ChainDataSource> = chain;
    let market: Arc<dyn MarketDataSource> = market;
    paperhand::WalletAnalyzer::new(contract, Some(chain), Some(market))
}
