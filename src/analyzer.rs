//! Wallet analyzer: fetch, snapshot, analyze
//!
//! Data source failures never fail an analysis. Each fetch that errors is
//! logged and treated as "no data", so a wallet is always scored on whatever
//! could be gathered.

use crate::address::{parse_address, WalletAddress};
use crate::analysis::{
    analyze_snapshot_with, classify_transfers, AnalysisResult, RawNativeTx, ScoreComposer, TokenInfo,
    WalletSnapshot,
};
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::sources::{
    build_http_client, ChainDataSource, CoinGeckoClient, DexScreenerClient, ExplorerClient, MarketDataClient,
    MarketDataSource, SourceError,
};
use futures::future::join_all;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

/// Log a failed fetch and fall back to an empty value
fn or_empty<T: Default>(what: &str, result: Result<T, SourceError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("⚠️  Failed to fetch {}: {}", what, e);
            T::default()
        }
    }
}

pub struct WalletAnalyzer {
    contract: WalletAddress,
    chain: Option<Arc<dyn ChainDataSource>>,
    market: Option<Arc<dyn MarketDataSource>>,
    composer: ScoreComposer,
}

impl WalletAnalyzer {
    /// Create an analyzer over the given sources
    ///
    /// A missing `chain` source means no on-chain history is available; the
    /// wallet is then scored as having no activity.
    pub fn new(
        contract: WalletAddress,
        chain: Option<Arc<dyn ChainDataSource>>,
        market: Option<Arc<dyn MarketDataSource>>,
    ) -> Self {
        Self {
            contract,
            chain,
            market,
            composer: ScoreComposer::with_defaults(),
        }
    }

    /// Build the live HTTP sources described by `config`
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, SourceError> {
        let http = build_http_client(config.http_timeout)?;

        let chain: Option<Arc<dyn ChainDataSource>> = match &config.explorer_api_key {
            Some(api_key) => Some(Arc::new(ExplorerClient::new(
                http.clone(),
                &config.explorer_api_base,
                config.explorer_chain_id,
                api_key,
                config.explorer_page_size,
            ))),
            None => {
                warn!("⚠️  No explorer API key configured, on-chain history disabled");
                None
            }
        };

        let dex = DexScreenerClient::new(http.clone(), &config.dexscreener_api_base, &config.dex_chain_id);
        let coingecko = CoinGeckoClient::new(http, &config.native_price_api_base, &config.native_coingecko_id);
        let market: Arc<dyn MarketDataSource> =
            Arc::new(MarketDataClient::new(dex, coingecko, &config.wrapped_native_address));

        Ok(Self::new(config.contract.clone(), chain, Some(market)))
    }

    pub fn contract(&self) -> &WalletAddress {
        &self.contract
    }

    /// Validate `address`, gather its data and score it
    ///
    /// # Returns
    /// * `Ok(AnalysisResult)` - Always, once the address is valid
    /// * `Err(AnalyzerError::MissingAddress | InvalidAddress)` - Before any fetch
    pub async fn analyze(&self, address: &str) -> Result<AnalysisResult, AnalyzerError> {
        let wallet = parse_address(address)?;
        let snapshot = self.fetch_snapshot(wallet).await;
        let result = analyze_snapshot_with(&snapshot, &self.composer);

        info!(
            "📊 {} scored {} ({} buys, {} sells, {} transfers)",
            result.address, result.score, result.buys, result.sells, result.total_transactions
        );
        Ok(result)
    }

    /// Gather everything the pipeline needs for `wallet`
    pub async fn fetch_snapshot(&self, wallet: WalletAddress) -> WalletSnapshot {
        let mut snapshot = WalletSnapshot::empty(wallet, self.contract.clone());
        let contract = self.contract.lower().to_string();
        let address = snapshot.address.lower().to_string();

        let mut token_info: Option<TokenInfo> = None;

        if let Some(chain) = &self.chain {
            debug!("Fetching {} history from {}", address, chain.source_name());
            token_info = or_empty("token info", chain.token_info(&contract).await);
            snapshot.raw_balance = or_empty("token balance", chain.token_balance(&contract, &address).await);
        }

        if let Some(market) = &self.market {
            snapshot.market = or_empty("market data", market.market_snapshot(&contract).await);
            snapshot.native_price_usd = or_empty("native price", market.native_price_usd().await);
        }

        if let Some(chain) = &self.chain {
            snapshot.token_transfers = or_empty("token transfers", chain.token_transfers(&contract, &address).await);
            snapshot.native_txs = or_empty("native transactions", chain.native_transactions(&address).await);
            snapshot.internal_txs = or_empty("internal transactions", chain.internal_transactions(&address).await);
        }

        let token = token_info.unwrap_or_default();
        snapshot.token = match snapshot.token_transfers.first() {
            Some(first) => token.completed_from(first),
            None => token,
        };

        if let Some(chain) = &self.chain {
            snapshot.internal_lookups = self.internal_lookups(chain.as_ref(), &snapshot).await;
        }

        snapshot
    }

    /// Per-sell internal transaction lookups, run concurrently
    async fn internal_lookups(
        &self,
        chain: &dyn ChainDataSource,
        snapshot: &WalletSnapshot,
    ) -> Vec<RawNativeTx> {
        let classification = classify_transfers(
            &snapshot.address,
            &snapshot.contract,
            &snapshot.token_transfers,
            snapshot.token.decimals,
        );

        let mut seen = HashSet::new();
        let hashes: Vec<&str> = classification
            .sells
            .iter()
            .map(|sell| sell.tx_hash.as_str())
            .filter(|hash| !hash.is_empty() && seen.insert(*hash))
            .collect();
        if hashes.is_empty() {
            return Vec::new();
        }

        let address = snapshot.address.lower();
        let results = join_all(
            hashes
                .iter()
                .map(|hash| chain.internal_transactions_by_hash(address, hash)),
        )
        .await;

        results
            .into_iter()
            .zip(hashes.iter())
            .flat_map(|(result, hash)| or_empty(&format!("internal transactions for {}", hash), result))
            .collect()
    }
}
