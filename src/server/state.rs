//! Shared application state for the HTTP server

use crate::analyzer::WalletAnalyzer;
use std::sync::Arc;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<WalletAnalyzer>,

    /// Server startup time
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(analyzer: WalletAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            startup_time: chrono::Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.startup_time).num_seconds()
    }
}
