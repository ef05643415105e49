//! Error types surfaced to callers of the analyzer
//!
//! Only input validation and unexpected failures propagate this far; data
//! source problems are absorbed inside the analyzer (see `sources::SourceError`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Wallet address is required")]
    MissingAddress,

    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalyzerError {
    /// True when the error was caused by caller input rather than the service
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AnalyzerError::MissingAddress | AnalyzerError::InvalidAddress(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}
