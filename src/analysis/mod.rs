//! Analysis Core - Wallet Trade Reconstruction and Scoring
//!
//! Turns a wallet's raw token and native-currency history into a
//! paperhand score with human-readable reasons.
//!
//! # Architecture
//!
//! ```text
//! WalletSnapshot (raw explorer records + market data)
//!     ↓
//! Trade Classifier (BUY / SELL relative to wallet and contract)
//!     ↓
//! NativeValueMatcher (hash join, ±5s window, price estimate)
//!     ↓
//! FIFO matcher (lot array + remaining vector)
//!     ↓
//! Metrics → ScoreComposer → Valuation
//!     ↓
//! AnalysisResult
//! ```

pub mod classifier;
pub mod engine;
pub mod fifo;
pub mod metrics;
pub mod native_matcher;
pub mod scorer;
pub mod transfers;
pub mod valuation;

pub use classifier::{classify_transfers, Classification};
pub use engine::{analyze_snapshot, analyze_snapshot_with, AnalysisResult, TokenInfo, WalletSnapshot};
pub use fifo::{match_fifo, FifoOutcome, MatchedTrade, UnmatchedSell};
pub use metrics::{compute_metrics, Metrics};
pub use native_matcher::{NativeLedger, NativeValueMatcher, PriceContext};
pub use scorer::{score_by_threshold, ScoreComposer, ScoreReport, ScoreWeights};
pub use transfers::{NativeValue, NativeValueSource, RawNativeTx, RawTokenTransfer, TradeAction, TransferEvent};
pub use valuation::{value_trades, MarketSnapshot, Valuation};
