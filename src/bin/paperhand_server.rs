//! Paperhand Server - wallet analysis HTTP API
//!
//! Usage:
//!   cargo run --release --bin paperhand_server
//!
//! Environment variables:
//!   EXPLORER_API_KEY - Explorer API key (BSCSCAN_API_KEY also accepted)
//!   CONTRACT_ADDRESS - Token contract to analyze (default: 0x35078DB252d16DB8aCca206498b4193a25DE4774)
//!   BIND_ADDR - Listen address (default: 0.0.0.0:3000)
//!   HTTP_TIMEOUT_SECS - Upstream request timeout (default: 10)

use dotenv::dotenv;
use log::{error, info};
use paperhand::analyzer::WalletAnalyzer;
use paperhand::config::AnalyzerConfig;
use paperhand::server::{start_server, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize environment and logging
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("🚀 Paperhand Server");
    info!("   └─ Version: {}", env!("CARGO_PKG_VERSION"));

    let config = AnalyzerConfig::from_env()?;

    info!("✅ Configuration loaded");
    info!("   ├─ Contract: {}", config.contract);
    info!("   ├─ Explorer: {} (chain {})", config.explorer_api_base, config.explorer_chain_id);
    info!(
        "   ├─ Explorer API key: {}",
        if config.explorer_api_key.is_some() { "set" } else { "missing" }
    );
    info!("   ├─ DexScreener chain: {}", config.dex_chain_id);
    info!("   └─ HTTP timeout: {}s", config.http_timeout.as_secs());

    let analyzer = WalletAnalyzer::from_config(&config)?;
    let state = AppState::new(analyzer);

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("");
                info!("⚠️  Received CTRL+C, shutting down...");
            }
            Err(err) => {
                error!("❌ Failed to listen for CTRL+C: {}", err);
            }
        }
    };

    start_server(state, &config.bind_addr, shutdown).await?;

    info!("👋 Paperhand Server stopped");
    Ok(())
}
