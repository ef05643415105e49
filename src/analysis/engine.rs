//! Snapshot → result pipeline
//!
//! Everything here is synchronous and deterministic: the analyzer gathers a
//! `WalletSnapshot` from the data sources, then `analyze_snapshot` turns it
//! into an `AnalysisResult` without further I/O.

use super::classifier::classify_transfers;
use super::fifo::match_fifo;
use super::metrics::{compute_metrics, Metrics};
use super::native_matcher::{NativeLedger, NativeValueMatcher, PriceContext};
use super::scorer::{ActivitySummary, ScoreComposer};
use super::transfers::{RawNativeTx, RawTokenTransfer, TransferEvent};
use super::valuation::{value_trades, MarketSnapshot, ValuationInputs};
use crate::address::WalletAddress;
use crate::units::{format_units, DEFAULT_TOKEN_DECIMALS};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

impl Default for TokenInfo {
    fn default() -> Self {
        Self {
            symbol: "TOKEN".to_string(),
            name: "Token".to_string(),
            decimals: DEFAULT_TOKEN_DECIMALS,
        }
    }
}

impl TokenInfo {
    /// Fill in metadata from the first transfer record, keeping defaults for blank fields
    pub fn from_transfer(transfer: &RawTokenTransfer) -> Self {
        let defaults = Self::default();
        let non_blank = |s: &str, fallback: String| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                fallback
            } else {
                trimmed.to_string()
            }
        };
        Self {
            symbol: non_blank(&transfer.token_symbol, defaults.symbol),
            name: non_blank(&transfer.token_name, defaults.name),
            decimals: crate::units::parse_decimals(&transfer.token_decimal).unwrap_or(defaults.decimals),
        }
    }

    /// Symbol or name is still the placeholder
    pub fn is_incomplete(&self) -> bool {
        let defaults = Self::default();
        self.symbol == defaults.symbol || self.name == defaults.name
    }

    /// Replace placeholder fields with the transfer's metadata
    ///
    /// Decimals are taken from the transfer too when the record was incomplete.
    pub fn completed_from(self, transfer: &RawTokenTransfer) -> Self {
        if !self.is_incomplete() {
            return self;
        }
        let defaults = Self::default();
        let found = Self::from_transfer(transfer);
        Self {
            symbol: if self.symbol == defaults.symbol { found.symbol } else { self.symbol },
            name: if self.name == defaults.name { found.name } else { self.name },
            decimals: crate::units::parse_decimals(&transfer.token_decimal).unwrap_or(self.decimals),
        }
    }
}

/// All data gathered for one wallet before analysis
#[derive(Debug, Clone)]
pub struct WalletSnapshot {
    pub address: WalletAddress,
    pub contract: WalletAddress,
    pub token: TokenInfo,
    /// Raw integer balance as reported by the explorer
    pub raw_balance: Option<String>,
    pub token_transfers: Vec<RawTokenTransfer>,
    pub native_txs: Vec<RawNativeTx>,
    /// Address-wide internal transactions
    pub internal_txs: Vec<RawNativeTx>,
    /// Per-hash internal lookups; they replace address-wide legs of the same hash
    pub internal_lookups: Vec<RawNativeTx>,
    pub market: Option<MarketSnapshot>,
    pub native_price_usd: Option<f64>,
}

impl WalletSnapshot {
    /// Snapshot with no fetched data
    pub fn empty(address: WalletAddress, contract: WalletAddress) -> Self {
        Self {
            address,
            contract,
            token: TokenInfo::default(),
            raw_balance: None,
            token_transfers: Vec::new(),
            native_txs: Vec::new(),
            internal_txs: Vec::new(),
            internal_lookups: Vec::new(),
            market: None,
            native_price_usd: None,
        }
    }
}

/// Analysis outcome for one wallet
///
/// `marketCapAtBuy`, `marketCapAtSell` and `marketCapAth` are estimates
/// derived from average trade prices, not historical market data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub address: String,
    pub token_symbol: String,
    pub token_name: String,
    pub token_decimals: u8,
    pub token_balance: f64,
    pub total_transactions: usize,
    pub buys: usize,
    pub sells: usize,
    pub total_bought: f64,
    pub total_sold: f64,
    pub total_bought_native: f64,
    pub total_sold_native: f64,
    pub total_bought_usd: f64,
    pub total_sold_usd: f64,
    pub profit_loss: f64,
    pub profit_loss_usd: f64,
    pub is_profitable: bool,
    pub has_ever_sold: bool,
    pub score: u8,
    pub reasons: Vec<String>,
    pub metrics: Metrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_tx: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tx: Option<String>,
    pub token_price_usd: f64,
    pub price_change_24h: f64,
    pub volume_24h_usd: f64,
    pub liquidity_usd: f64,
    pub market_cap: f64,
    pub market_cap_ath: f64,
    pub market_cap_at_buy: f64,
    pub market_cap_at_sell: f64,
    pub holding_value_usd: f64,
}

fn format_date(timestamp_ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Sum of on-chain native values, ignoring estimates
fn observed_native_total(events: &[TransferEvent]) -> f64 {
    events.iter().filter_map(TransferEvent::observed_native).sum()
}

/// Run the full pipeline on a snapshot
pub fn analyze_snapshot(snapshot: &WalletSnapshot) -> AnalysisResult {
    analyze_snapshot_with(snapshot, &ScoreComposer::with_defaults())
}

pub fn analyze_snapshot_with(snapshot: &WalletSnapshot, composer: &ScoreComposer) -> AnalysisResult {
    let decimals = snapshot.token.decimals;
    let balance = snapshot
        .raw_balance
        .as_deref()
        .and_then(|raw| format_units(raw, decimals).ok())
        .unwrap_or(0.0);

    let market = snapshot.market.clone().unwrap_or_default();
    let native_price = snapshot.native_price_usd.filter(|p| *p > 0.0).unwrap_or(0.0);
    let prices = PriceContext::new(Some(market.price_usd), Some(native_price));

    let mut classification =
        classify_transfers(&snapshot.address, &snapshot.contract, &snapshot.token_transfers, decimals);

    let ledger = NativeLedger::from_sources(&snapshot.native_txs, &snapshot.internal_txs, &snapshot.internal_lookups);
    let matcher = NativeValueMatcher::new(snapshot.address.lower());
    for event in classification.events_mut() {
        event.native_value = matcher.resolve(event, &ledger, &prices);
    }

    let bought_native = observed_native_total(&classification.buys);
    let sold_native = observed_native_total(&classification.sells);

    let fifo = match_fifo(&classification.buys, &classification.sells);
    let metrics = compute_metrics(&fifo.matches, &classification.buys, &classification.sells, &prices);

    let activity = ActivitySummary {
        buys: classification.buys.len(),
        sells: classification.sells.len(),
        balance,
    };
    let report = composer.compose(&activity, &metrics);

    let valuation = value_trades(&ValuationInputs {
        buys: activity.buys,
        sells: activity.sells,
        total_bought: classification.total_bought,
        total_sold: classification.total_sold,
        bought_native,
        sold_native,
        balance,
        token_price_usd: market.price_usd,
        native_price_usd: native_price,
        market_cap: market.market_cap,
    });

    let timestamps = || snapshot.token_transfers.iter().filter_map(RawTokenTransfer::timestamp_ms);
    let first_tx = timestamps().min().and_then(format_date);
    let last_tx = timestamps().max().and_then(format_date);

    debug!(
        "{}: {} buys, {} sells, {} matches, {} unmatched sells, ledger {}/{} native txs",
        snapshot.address,
        activity.buys,
        activity.sells,
        fifo.matches.len(),
        fifo.unmatched_sells.len(),
        ledger.direct_len(),
        ledger.internal_len()
    );

    AnalysisResult {
        address: snapshot.address.checksummed().to_string(),
        token_symbol: snapshot.token.symbol.clone(),
        token_name: snapshot.token.name.clone(),
        token_decimals: decimals,
        token_balance: balance,
        total_transactions: snapshot.token_transfers.len(),
        buys: activity.buys,
        sells: activity.sells,
        total_bought: classification.total_bought,
        total_sold: classification.total_sold,
        total_bought_native: bought_native,
        total_sold_native: sold_native,
        total_bought_usd: valuation.total_bought_usd,
        total_sold_usd: valuation.total_sold_usd,
        profit_loss: valuation.profit_loss,
        profit_loss_usd: valuation.profit_loss_usd,
        is_profitable: valuation.is_profitable,
        has_ever_sold: activity.sells > 0,
        score: report.score,
        reasons: report.reasons,
        metrics,
        first_tx,
        last_tx,
        token_price_usd: market.price_usd,
        price_change_24h: market.price_change_24h,
        volume_24h_usd: market.volume_24h_usd,
        liquidity_usd: market.liquidity_usd,
        market_cap: market.market_cap,
        market_cap_ath: valuation.market_cap_ath,
        market_cap_at_buy: valuation.market_cap_at_buy,
        market_cap_at_sell: valuation.market_cap_at_sell,
        holding_value_usd: valuation.holding_value_usd,
    }
}
