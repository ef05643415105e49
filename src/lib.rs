//! Paperhand - wallet trading behavior scoring
//!
//! Reconstructs a wallet's buys and sells of one token from explorer data,
//! pairs them FIFO and scores how quickly the wallet tends to sell.

pub mod address;
pub mod analysis;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod server;
pub mod sources;
pub mod units;

pub use address::{parse_address, WalletAddress};
pub use analysis::{analyze_snapshot, AnalysisResult, WalletSnapshot};
pub use analyzer::WalletAnalyzer;
pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, ConfigError};
