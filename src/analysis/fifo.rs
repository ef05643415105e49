//! First-in-first-out pairing of sells against earlier buys
//!
//! Buys form an immutable lot array; consumption is tracked in a parallel
//! `remaining` vector with a head cursor, so no lot is ever mutated or cloned.

use super::transfers::TransferEvent;
use serde::Serialize;

/// Remaining amounts at or below this are treated as fully consumed
pub const AMOUNT_EPSILON: f64 = 1e-9;

/// One buy (or part of one) paired with one sell (or part of one)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedTrade {
    pub buy_timestamp: i64,
    pub sell_timestamp: i64,
    pub matched_amount: f64,
    pub original_buy_amount: f64,
    pub buy_tx_hash: String,
    pub sell_tx_hash: String,
    /// Buy-side native value scaled to the matched portion
    pub buy_native_value: Option<f64>,
    /// Sell-side native value scaled to the matched portion
    pub sell_native_value: Option<f64>,
    pub sell_native_estimated: bool,
}

impl MatchedTrade {
    pub fn hold_ms(&self) -> i64 {
        self.sell_timestamp.saturating_sub(self.buy_timestamp)
    }

    pub fn hold_hours(&self) -> f64 {
        self.hold_ms() as f64 / 3_600_000.0
    }
}

/// Sell quantity left over after the buy queue ran dry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedSell {
    pub sell_tx_hash: String,
    pub sell_timestamp: i64,
    pub unmatched_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FifoOutcome {
    pub matches: Vec<MatchedTrade>,
    /// Remaining amount per buy lot, in chronological lot order
    pub lot_remaining: Vec<f64>,
    pub unmatched_sells: Vec<UnmatchedSell>,
}

impl FifoOutcome {
    pub fn total_matched(&self) -> f64 {
        self.matches.iter().map(|m| m.matched_amount).sum()
    }
}

/// Stable chronological order; equal timestamps keep input order
fn sorted_by_time(events: &[TransferEvent]) -> Vec<&TransferEvent> {
    let mut sorted: Vec<&TransferEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.timestamp_ms);
    sorted
}

fn scale(total: Option<f64>, portion: f64, whole: f64) -> Option<f64> {
    if whole <= 0.0 {
        return None;
    }
    total.map(|value| portion * value / whole)
}

/// Pair sells with buys in FIFO order
///
/// A sell larger than all open lots is matched as far as possible; the rest
/// is reported in `unmatched_sells` and produces no `MatchedTrade`.
pub fn match_fifo(buys: &[TransferEvent], sells: &[TransferEvent]) -> FifoOutcome {
    let lots = sorted_by_time(buys);
    let mut remaining: Vec<f64> = lots.iter().map(|lot| lot.amount.max(0.0)).collect();
    let mut head = 0usize;
    let mut matches = Vec::new();
    let mut unmatched_sells = Vec::new();

    for sell in sorted_by_time(sells) {
        let sell_native = sell.native_value.map(|v| v.amount);
        let sell_estimated = sell.native_value.map(|v| v.is_estimate()).unwrap_or(false);
        let mut sell_left = sell.amount.max(0.0);

        while sell_left > AMOUNT_EPSILON {
            // Zero-sized lots never take part in matching
            while head < lots.len() && remaining[head] <= AMOUNT_EPSILON {
                head += 1;
            }
            if head >= lots.len() {
                break;
            }
            let lot = lots[head];
            let matched = sell_left.min(remaining[head]);

            matches.push(MatchedTrade {
                buy_timestamp: lot.timestamp_ms,
                sell_timestamp: sell.timestamp_ms,
                matched_amount: matched,
                original_buy_amount: lot.amount,
                buy_tx_hash: lot.tx_hash.clone(),
                sell_tx_hash: sell.tx_hash.clone(),
                buy_native_value: scale(lot.native_value.map(|v| v.amount), matched, lot.amount),
                sell_native_value: scale(sell_native, matched, sell.amount),
                sell_native_estimated: sell_native.is_some() && sell_estimated,
            });

            sell_left -= matched;
            remaining[head] = (remaining[head] - matched).max(0.0);

            if remaining[head] <= AMOUNT_EPSILON {
                remaining[head] = 0.0;
            }
        }

        if sell_left > AMOUNT_EPSILON {
            unmatched_sells.push(UnmatchedSell {
                sell_tx_hash: sell.tx_hash.clone(),
                sell_timestamp: sell.timestamp_ms,
                unmatched_amount: sell_left,
            });
        }
    }

    FifoOutcome {
        matches,
        lot_remaining: remaining,
        unmatched_sells,
    }
}
