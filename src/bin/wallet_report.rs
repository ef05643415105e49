//! Wallet Report - analyze one wallet and print the result
//!
//! Usage:
//!   cargo run --bin wallet_report -- <WALLET_ADDRESS>
//!
//! Reads the same environment variables as `paperhand_server`. Output is the
//! analysis result as pretty-printed JSON on stdout; logs go to stderr.

use dotenv::dotenv;
use log::{error, info};
use paperhand::analyzer::WalletAnalyzer;
use paperhand::config::AnalyzerConfig;
use std::env;
use std::process;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <WALLET_ADDRESS>", args[0]);
        process::exit(1);
    }

    let config = AnalyzerConfig::from_env()?;
    let analyzer = WalletAnalyzer::from_config(&config)?;

    info!("🔍 Analyzing {} for token {}", args[1], config.contract);

    match analyzer.analyze(&args[1]).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(err) if err.is_input_error() => {
            eprintln!("❌ {}", err);
            process::exit(2);
        }
        Err(err) => {
            error!("❌ Analysis failed: {}", err);
            Err(err.into())
        }
    }
}
