//! Paperhand scoring
//!
//! Higher scores mean weaker hands: quick flips, early exits, selling at a
//! loss and dumping whole positions all push the score toward 100.

use super::metrics::Metrics;
use serde::Serialize;

/// Average hold time at which the hold sub-score starts to fall
pub const HOLD_THRESHOLD_HOURS: f64 = 24.0;

/// Time to first sell at which the TTFS sub-score starts to fall
pub const FIRST_SELL_THRESHOLD_HOURS: f64 = 6.0;

const PURE_HOLDER_SCORE: u8 = 5;
const NEUTRAL_SCORE: u8 = 50;
const DIAMOND_HANDS_SCORE: u8 = 0;

/// Map a duration onto 0-100 where shorter is higher
///
/// 100 at or below `0.1 × threshold`, 0 at or above `4 × threshold`, and a
/// curve on `threshold / value` in between.
pub fn score_by_threshold(value: f64, threshold: f64) -> f64 {
    if value >= threshold * 4.0 {
        return 0.0;
    }
    if value <= threshold * 0.1 {
        return 100.0;
    }
    let ratio = threshold / value.max(0.0001);
    let curved = (ratio.min(4.0) - 0.1) / 3.9 * 100.0;
    curved.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWeights {
    pub hold_time: f64,
    pub time_to_first_sell: f64,
    pub sell_ratio: f64,
    pub loss: f64,
    pub dumps: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            hold_time: 0.25,
            time_to_first_sell: 0.20,
            sell_ratio: 0.25,
            loss: 0.15,
            dumps: 0.15,
        }
    }
}

impl ScoreWeights {
    fn total(&self) -> f64 {
        self.hold_time + self.time_to_first_sell + self.sell_ratio + self.loss + self.dumps
    }

    /// Weights with the loss term removed
    fn without_loss(self) -> Self {
        Self { loss: 0.0, ..self }
    }
}

/// Per-factor sub-scores on the 0-100 scale
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    pub hold_time: f64,
    pub time_to_first_sell: f64,
    pub sell_ratio: f64,
    pub loss: f64,
    pub dumps: f64,
}

impl SubScores {
    pub fn from_metrics(metrics: &Metrics) -> Self {
        Self {
            hold_time: score_by_threshold(metrics.avg_hold_hours, HOLD_THRESHOLD_HOURS),
            time_to_first_sell: score_by_threshold(metrics.time_to_first_sell_hours, FIRST_SELL_THRESHOLD_HOURS),
            sell_ratio: (metrics.sell_ratio_24h * 100.0).min(100.0),
            loss: metrics.loss_fraction * 100.0,
            dumps: metrics.full_dump_fraction * 100.0,
        }
    }
}

/// Trade counts and balance the composer needs besides metrics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActivitySummary {
    pub buys: usize,
    pub sells: usize,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub score: u8,
    pub reasons: Vec<String>,
}

impl ScoreReport {
    fn fixed(score: u8, reason: &str) -> Self {
        Self {
            score,
            reasons: vec![reason.to_string()],
        }
    }
}

pub struct ScoreComposer {
    weights: ScoreWeights,
}

impl ScoreComposer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn with_defaults() -> Self {
        Self::new(ScoreWeights::default())
    }

    /// Weighted composite of the sub-scores, rounded and clamped to 0-100
    ///
    /// The loss weight drops out when no match could be evaluated for loss,
    /// and the remaining weights are renormalized.
    pub fn composite(&self, metrics: &Metrics) -> u8 {
        let weights = if metrics.loss_data_available {
            self.weights
        } else {
            self.weights.without_loss()
        };
        let total = weights.total();
        if total <= 0.0 {
            return NEUTRAL_SCORE;
        }

        let sub = SubScores::from_metrics(metrics);
        let weighted = sub.hold_time * weights.hold_time
            + sub.time_to_first_sell * weights.time_to_first_sell
            + sub.sell_ratio * weights.sell_ratio
            + sub.loss * weights.loss
            + sub.dumps * weights.dumps;

        let score = (weighted / total).round();
        if score.is_nan() {
            return NEUTRAL_SCORE;
        }
        score.clamp(0.0, 100.0) as u8
    }

    /// Score a wallet and explain the result
    ///
    /// # Special cases
    /// - No trades, tokens held: pure holder (5)
    /// - No trades, nothing held: neutral (50)
    /// - Buys but no sells: diamond hands (0)
    /// - Sells but no buys: neutral (50), nothing to match against
    pub fn compose(&self, activity: &ActivitySummary, metrics: &Metrics) -> ScoreReport {
        let special = match (activity.buys, activity.sells) {
            (0, 0) if activity.balance > 0.0 => Some((PURE_HOLDER_SCORE, "Pure holder - never sold")),
            (0, 0) => Some((NEUTRAL_SCORE, "No trading activity found")),
            (_, 0) => Some((DIAMOND_HANDS_SCORE, "Bought but never sold - diamond hands")),
            (0, _) => Some((NEUTRAL_SCORE, "Only outgoing transfers found - no buys to match")),
            _ => None,
        };
        if let Some((score, reason)) = special {
            return ScoreReport::fixed(score, reason);
        }

        ScoreReport {
            score: self.composite(metrics),
            reasons: reasons_for(metrics),
        }
    }
}

fn reasons_for(metrics: &Metrics) -> Vec<String> {
    let mut reasons = Vec::new();

    if metrics.avg_hold_hours < HOLD_THRESHOLD_HOURS {
        reasons.push(format!(
            "Average hold time {:.1}h (< {}h threshold)",
            metrics.avg_hold_hours, HOLD_THRESHOLD_HOURS
        ));
    }
    if metrics.time_to_first_sell_hours < FIRST_SELL_THRESHOLD_HOURS {
        reasons.push(format!(
            "First sell after {:.1}h (< {}h threshold)",
            metrics.time_to_first_sell_hours, FIRST_SELL_THRESHOLD_HOURS
        ));
    }
    if metrics.sell_ratio_24h > 0.5 {
        reasons.push(format!("Sold {:.0}% within 24h", metrics.sell_ratio_24h * 100.0));
    }
    if metrics.loss_fraction > 0.5 {
        reasons.push(format!("{:.0}% of sells were at a loss", metrics.loss_fraction * 100.0));
    }
    if metrics.full_dump_fraction > 0.3 {
        reasons.push(format!(
            "{:.0}% of sells were full position dumps",
            metrics.full_dump_fraction * 100.0
        ));
    }

    reasons
}
