//! Native-currency value resolution for token transfers
//!
//! A DEX swap moves the token and the native currency in the same transaction,
//! but explorers report the two legs in separate lists. This module joins them
//! back together by transaction hash, falling back to timestamp proximity.
//!
//! # Resolution order (first success wins)
//! 1. Direct transaction, same hash, expected direction
//! 2. Direct transaction, expected direction, within the time window
//! 3. Internal transactions, same hash, expected direction (legs summed)
//! 4. Internal transaction, expected direction, within the time window
//! 5. Sells only: estimate from current token and native USD prices
//!
//! When several transactions fall inside the window the one closest in time
//! is used; equal distances keep list order.

use super::transfers::{NativeTransfer, NativeValue, NativeValueSource, RawNativeTx, TradeAction, TransferEvent};
use std::collections::{BTreeMap, HashSet};

/// Timestamp proximity window for correlating native legs
pub const NATIVE_MATCH_WINDOW_MS: i64 = 5_000;

/// Current USD prices available to the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceContext {
    pub token_price_usd: Option<f64>,
    pub native_price_usd: Option<f64>,
}

impl PriceContext {
    pub fn new(token_price_usd: Option<f64>, native_price_usd: Option<f64>) -> Self {
        Self {
            token_price_usd: token_price_usd.filter(|p| *p > 0.0),
            native_price_usd: native_price_usd.filter(|p| *p > 0.0),
        }
    }

    /// Current token price expressed in native currency
    pub fn native_per_token(&self) -> Option<f64> {
        match (self.token_price_usd, self.native_price_usd) {
            (Some(token), Some(native)) if token > 0.0 && native > 0.0 => Some(token / native),
            _ => None,
        }
    }
}

/// Indexed list of native transfers
#[derive(Debug, Clone, Default)]
struct IndexedTransfers {
    transfers: Vec<NativeTransfer>,
    by_time: BTreeMap<i64, Vec<usize>>,
}

impl IndexedTransfers {
    fn new(transfers: Vec<NativeTransfer>) -> Self {
        let mut by_time: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, transfer) in transfers.iter().enumerate() {
            by_time.entry(transfer.timestamp_ms).or_default().push(idx);
        }
        Self { transfers, by_time }
    }

    fn by_hash<'a>(&'a self, hash: &'a str) -> impl Iterator<Item = &'a NativeTransfer> + 'a {
        self.transfers.iter().filter(move |t| t.tx_hash == hash)
    }

    /// Closest transfer satisfying `accept` strictly inside `window_ms` of `timestamp_ms`
    fn closest_in_window<F>(&self, timestamp_ms: i64, window_ms: i64, accept: F) -> Option<&NativeTransfer>
    where
        F: Fn(&NativeTransfer) -> bool,
    {
        let range_start = timestamp_ms.saturating_sub(window_ms - 1);
        let range_end = timestamp_ms.saturating_add(window_ms - 1);

        self.by_time
            .range(range_start..=range_end)
            .flat_map(|(_, indices)| indices.iter().copied())
            .filter(|&idx| accept(&self.transfers[idx]))
            .min_by_key(|&idx| ((self.transfers[idx].timestamp_ms - timestamp_ms).abs(), idx))
            .map(|idx| &self.transfers[idx])
    }
}

/// Native-currency transactions of the subject wallet
#[derive(Debug, Clone, Default)]
pub struct NativeLedger {
    direct: IndexedTransfers,
    internal: IndexedTransfers,
}

impl NativeLedger {
    /// Build a ledger from the address-wide explorer lists
    pub fn from_raw(direct: &[RawNativeTx], internal: &[RawNativeTx]) -> Self {
        Self::from_sources(direct, internal, &[])
    }

    /// Build a ledger, letting per-hash internal lookups replace the
    /// address-wide entries of the hashes they cover
    ///
    /// Identical legs inside one list are distinct payouts and are all kept.
    pub fn from_sources(direct: &[RawNativeTx], internal: &[RawNativeTx], lookups: &[RawNativeTx]) -> Self {
        let direct: Vec<NativeTransfer> = direct.iter().filter_map(NativeTransfer::from_raw).collect();

        let looked_up: Vec<NativeTransfer> = lookups.iter().filter_map(NativeTransfer::from_raw).collect();
        let covered: HashSet<&str> = looked_up.iter().map(|t| t.tx_hash.as_str()).collect();

        let mut internal: Vec<NativeTransfer> = internal
            .iter()
            .filter_map(NativeTransfer::from_raw)
            .filter(|t| !covered.contains(t.tx_hash.as_str()))
            .collect();
        internal.extend(looked_up.iter().cloned());

        Self {
            direct: IndexedTransfers::new(direct),
            internal: IndexedTransfers::new(internal),
        }
    }

    pub fn direct_len(&self) -> usize {
        self.direct.transfers.len()
    }

    pub fn internal_len(&self) -> usize {
        self.internal.transfers.len()
    }
}

pub struct NativeValueMatcher {
    subject: String,
    window_ms: i64,
}

impl NativeValueMatcher {
    pub fn new(subject: &str) -> Self {
        Self::with_window(subject, NATIVE_MATCH_WINDOW_MS)
    }

    pub fn with_window(subject: &str, window_ms: i64) -> Self {
        Self {
            subject: subject.trim().to_ascii_lowercase(),
            window_ms: window_ms.max(1),
        }
    }

    /// Whether a native transfer moves in the direction expected for `action`
    ///
    /// Buys pay native currency out of the wallet; sells receive it.
    fn expected_direction(&self, action: TradeAction, transfer: &NativeTransfer) -> bool {
        match action {
            TradeAction::Buy => transfer.from == self.subject,
            TradeAction::Sell => transfer.to == self.subject,
        }
    }

    /// Resolve the native value tied to a transfer event
    ///
    /// # Returns
    /// * `Some(NativeValue)` - value and the step that produced it
    /// * `None` - nothing correlated and no estimate possible
    pub fn resolve(
        &self,
        event: &TransferEvent,
        ledger: &NativeLedger,
        prices: &PriceContext,
    ) -> Option<NativeValue> {
        let hash = event.tx_hash.to_ascii_lowercase();
        let action = event.action;
        let accept = |t: &NativeTransfer| self.expected_direction(action, t);

        // 1. Direct, same hash
        if let Some(tx) = ledger.direct.by_hash(&hash).find(|t| accept(t)) {
            return Some(NativeValue { amount: tx.value, source: NativeValueSource::DirectHash });
        }

        // 2. Direct, time window
        if let Some(tx) = ledger.direct.closest_in_window(event.timestamp_ms, self.window_ms, accept) {
            return Some(NativeValue { amount: tx.value, source: NativeValueSource::DirectWindow });
        }

        // 3. Internal, same hash (a swap may pay out in several legs)
        let internal_sum: f64 = ledger.internal.by_hash(&hash).filter(|t| accept(t)).map(|t| t.value).sum();
        if internal_sum > 0.0 {
            return Some(NativeValue { amount: internal_sum, source: NativeValueSource::InternalHash });
        }

        // 4. Internal, time window
        if let Some(tx) = ledger.internal.closest_in_window(event.timestamp_ms, self.window_ms, accept) {
            return Some(NativeValue { amount: tx.value, source: NativeValueSource::InternalWindow });
        }

        // 5. Price-based estimate for sells
        if event.is_sell() {
            if let Some(native_per_token) = prices.native_per_token() {
                let estimate = event.amount * native_per_token;
                if estimate > 0.0 {
                    return Some(NativeValue { amount: estimate, source: NativeValueSource::Estimated });
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBJECT: &str = "0xabc0000000000000000000000000000000000001";
    const ROUTER: &str = "0xdef0000000000000000000000000000000000002";

    fn native_tx(from: &str, to: &str, bnb_wei: &str, ts_secs: i64, hash: &str) -> RawNativeTx {
        RawNativeTx {
            from: from.to_string(),
            to: to.to_string(),
            value: bnb_wei.to_string(),
            time_stamp: ts_secs.to_string(),
            hash: hash.to_string(),
            is_error: "0".to_string(),
        }
    }

    fn event(action: TradeAction, amount: f64, ts_secs: i64, hash: &str) -> TransferEvent {
        TransferEvent {
            action,
            amount,
            timestamp_ms: ts_secs * 1000,
            tx_hash: hash.to_string(),
            native_value: None,
        }
    }

    const ONE: &str = "1000000000000000000";
    const HALF: &str = "500000000000000000";

    #[test]
    fn test_direct_hash_match_for_buy() {
        let ledger = NativeLedger::from_raw(&[native_tx(SUBJECT, ROUTER, ONE, 100, "0xAA")], &[]);
        let matcher = NativeValueMatcher::new(SUBJECT);

        let value = matcher
            .resolve(&event(TradeAction::Buy, 10.0, 100, "0xaa"), &ledger, &PriceContext::default())
            .unwrap();
        assert_eq!(value.amount, 1.0);
        assert_eq!(value.source, NativeValueSource::DirectHash);
    }

    #[test]
    fn test_hash_match_requires_direction() {
        // Inflow with the same hash must not price a buy
        let ledger = NativeLedger::from_raw(&[native_tx(ROUTER, SUBJECT, ONE, 100, "0xaa")], &[]);
        let matcher = NativeValueMatcher::new(SUBJECT);

        // Window fallback also rejects the wrong direction
        assert!(matcher
            .resolve(&event(TradeAction::Buy, 10.0, 100, "0xaa"), &ledger, &PriceContext::default())
            .is_none());
    }

    #[test]
    fn test_direct_window_picks_closest() {
        let ledger = NativeLedger::from_raw(
            &[
                native_tx(ROUTER, SUBJECT, ONE, 996, "0x01"),
                native_tx(ROUTER, SUBJECT, HALF, 1001, "0x02"),
            ],
            &[],
        );
        let matcher = NativeValueMatcher::new(SUBJECT);

        let value = matcher
            .resolve(&event(TradeAction::Sell, 10.0, 1000, "0xff"), &ledger, &PriceContext::default())
            .unwrap();
        assert_eq!(value.amount, 0.5);
        assert_eq!(value.source, NativeValueSource::DirectWindow);
    }

    #[test]
    fn test_window_is_exclusive_at_five_seconds() {
        let ledger = NativeLedger::from_raw(&[native_tx(ROUTER, SUBJECT, ONE, 1005, "0x01")], &[]);
        let matcher = NativeValueMatcher::new(SUBJECT);

        assert!(matcher
            .resolve(&event(TradeAction::Sell, 10.0, 1000, "0xff"), &ledger, &PriceContext::default())
            .is_none());
    }

    #[test]
    fn test_internal_hash_legs_summed() {
        let ledger = NativeLedger::from_raw(
            &[],
            &[
                native_tx(ROUTER, SUBJECT, HALF, 100, "0xbb"),
                native_tx(ROUTER, SUBJECT, HALF, 100, "0xbb"),
                native_tx(ROUTER, SUBJECT, ONE, 100, "0xbb"),
            ],
        );
        let matcher = NativeValueMatcher::new(SUBJECT);

        // Identical legs are separate payouts: 0.5 + 0.5 + 1.0
        let value = matcher
            .resolve(&event(TradeAction::Sell, 10.0, 100, "0xbb"), &ledger, &PriceContext::default())
            .unwrap();
        assert_eq!(value.amount, 2.0);
        assert_eq!(value.source, NativeValueSource::InternalHash);
    }

    #[test]
    fn test_hash_lookups_replace_address_wide_legs() {
        let address_wide = [
            native_tx(ROUTER, SUBJECT, HALF, 100, "0xbb"),
            native_tx(ROUTER, SUBJECT, ONE, 200, "0xcc"),
        ];
        let lookups = [
            native_tx(ROUTER, SUBJECT, HALF, 100, "0xBB"),
            native_tx(ROUTER, SUBJECT, HALF, 100, "0xbb"),
        ];
        let ledger = NativeLedger::from_sources(&[], &address_wide, &lookups);
        assert_eq!(ledger.internal_len(), 3);

        let matcher = NativeValueMatcher::new(SUBJECT);
        let looked_up = matcher
            .resolve(&event(TradeAction::Sell, 10.0, 100, "0xbb"), &ledger, &PriceContext::default())
            .unwrap();
        assert_eq!(looked_up.amount, 1.0);

        // Hashes without a lookup keep their address-wide legs
        let untouched = matcher
            .resolve(&event(TradeAction::Sell, 10.0, 200, "0xcc"), &ledger, &PriceContext::default())
            .unwrap();
        assert_eq!(untouched.amount, 1.0);
    }

    #[test]
    fn test_internal_window_fallback() {
        let ledger = NativeLedger::from_raw(&[], &[native_tx(ROUTER, SUBJECT, ONE, 103, "0xcc")]);
        let matcher = NativeValueMatcher::new(SUBJECT);

        let value = matcher
            .resolve(&event(TradeAction::Sell, 10.0, 100, "0xdd"), &ledger, &PriceContext::default())
            .unwrap();
        assert_eq!(value.source, NativeValueSource::InternalWindow);
    }

    #[test]
    fn test_direct_beats_internal() {
        let ledger = NativeLedger::from_raw(
            &[native_tx(ROUTER, SUBJECT, HALF, 102, "0x01")],
            &[native_tx(ROUTER, SUBJECT, ONE, 100, "0xee")],
        );
        let matcher = NativeValueMatcher::new(SUBJECT);

        let value = matcher
            .resolve(&event(TradeAction::Sell, 10.0, 100, "0xee"), &ledger, &PriceContext::default())
            .unwrap();
        assert_eq!(value.source, NativeValueSource::DirectWindow);
        assert_eq!(value.amount, 0.5);
    }

    #[test]
    fn test_sell_estimate_from_prices() {
        let matcher = NativeValueMatcher::new(SUBJECT);
        let prices = PriceContext::new(Some(0.02), Some(400.0));

        let value = matcher
            .resolve(&event(TradeAction::Sell, 1000.0, 100, "0x01"), &NativeLedger::default(), &prices)
            .unwrap();
        assert!((value.amount - 0.05).abs() < 1e-12);
        assert!(value.is_estimate());

        // Buys are never estimated
        assert!(matcher
            .resolve(&event(TradeAction::Buy, 1000.0, 100, "0x01"), &NativeLedger::default(), &prices)
            .is_none());
    }

    #[test]
    fn test_no_estimate_without_native_price() {
        let matcher = NativeValueMatcher::new(SUBJECT);
        let prices = PriceContext::new(Some(0.02), None);

        assert!(matcher
            .resolve(&event(TradeAction::Sell, 1000.0, 100, "0x01"), &NativeLedger::default(), &prices)
            .is_none());
    }
}
