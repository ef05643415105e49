//! Behavioral metrics derived from matched trades

use super::fifo::MatchedTrade;
use super::native_matcher::PriceContext;
use super::transfers::TransferEvent;
use serde::Serialize;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Holds up to this long count toward the 24h sell ratio
pub const QUICK_SELL_WINDOW_HOURS: f64 = 24.0;

/// A match consuming at least this share of its buy lot is a full dump
pub const FULL_DUMP_SHARE: f64 = 0.98;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub avg_hold_hours: f64,
    /// Hours from first buy to first sell, floored at 0 when the first sell comes first
    pub time_to_first_sell_hours: f64,
    /// Share of bought tokens sold within 24h of purchase (0.0-1.0)
    pub sell_ratio_24h: f64,
    /// Share of matches sold below their buy price (0.0-1.0)
    pub loss_fraction: f64,
    /// Share of matches liquidating their whole buy lot (0.0-1.0)
    pub full_dump_fraction: f64,
    /// Whether any match could be evaluated for profit or loss
    #[serde(skip)]
    pub loss_data_available: bool,
}

/// Whether a match was sold below its buy price, when that can be told
///
/// The sell side falls back to the current price when the observed value is
/// missing or was itself estimated.
fn evaluate_loss(trade: &MatchedTrade, prices: &PriceContext) -> Option<bool> {
    if trade.matched_amount <= 0.0 {
        return None;
    }
    let buy_per_token = trade.buy_native_value? / trade.matched_amount;
    if buy_per_token <= 0.0 {
        return None;
    }

    let observed_sell = trade
        .sell_native_value
        .filter(|_| !trade.sell_native_estimated)
        .map(|value| value / trade.matched_amount);

    let sell_per_token = observed_sell.or_else(|| prices.native_per_token())?;
    Some(sell_per_token < buy_per_token)
}

/// Compute metrics from FIFO matches and the classified buys and sells
pub fn compute_metrics(
    matches: &[MatchedTrade],
    buys: &[TransferEvent],
    sells: &[TransferEvent],
    prices: &PriceContext,
) -> Metrics {
    let mut metrics = Metrics::default();

    if !matches.is_empty() {
        let total_hold: f64 = matches.iter().map(|m| m.hold_ms() as f64).sum();
        metrics.avg_hold_hours = total_hold / matches.len() as f64 / MS_PER_HOUR;
    }

    let first_buy = buys.iter().map(|e| e.timestamp_ms).min();
    let first_sell = sells.iter().map(|e| e.timestamp_ms).min();
    if let (Some(buy), Some(sell)) = (first_buy, first_sell) {
        metrics.time_to_first_sell_hours = (sell.saturating_sub(buy) as f64 / MS_PER_HOUR).max(0.0);
    }

    let total_bought: f64 = buys.iter().map(|e| e.amount).sum();
    if total_bought > 0.0 {
        let quick_sold: f64 = matches
            .iter()
            .filter(|m| m.hold_hours() <= QUICK_SELL_WINDOW_HOURS)
            .map(|m| m.matched_amount)
            .sum();
        metrics.sell_ratio_24h = (quick_sold / total_bought).clamp(0.0, 1.0);
    }

    if !matches.is_empty() {
        let total = matches.len() as f64;

        let mut evaluated = 0usize;
        let mut losses = 0usize;
        for trade in matches {
            if let Some(is_loss) = evaluate_loss(trade, prices) {
                evaluated += 1;
                if is_loss {
                    losses += 1;
                }
            }
        }
        metrics.loss_data_available = evaluated > 0;
        metrics.loss_fraction = (losses as f64 / total).clamp(0.0, 1.0);

        let dumps = matches
            .iter()
            .filter(|m| m.original_buy_amount > 0.0 && m.matched_amount >= FULL_DUMP_SHARE * m.original_buy_amount)
            .count();
        metrics.full_dump_fraction = (dumps as f64 / total).clamp(0.0, 1.0);
    }

    metrics
}
