//! Splits the raw token transfer history into buys and sells
//!
//! Transfers touching the token contract itself (mint, burn, tax routing)
//! are not trades and are dropped.

use super::transfers::{RawTokenTransfer, TradeAction, TransferEvent};
use crate::address::WalletAddress;
use log::debug;

/// Buys and sells of the subject wallet, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub buys: Vec<TransferEvent>,
    pub sells: Vec<TransferEvent>,
    pub total_bought: f64,
    pub total_sold: f64,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    /// All events, buys first
    pub fn events_mut(&mut self) -> impl Iterator<Item = &mut TransferEvent> {
        self.buys.iter_mut().chain(self.sells.iter_mut())
    }
}

fn classify_action(
    subject: &WalletAddress,
    contract: &WalletAddress,
    transfer: &RawTokenTransfer,
) -> Option<TradeAction> {
    if subject.matches(&transfer.to) && !contract.matches(&transfer.from) {
        Some(TradeAction::Buy)
    } else if subject.matches(&transfer.from) && !contract.matches(&transfer.to) {
        Some(TradeAction::Sell)
    } else {
        None
    }
}

/// Classify raw transfers relative to `subject`
///
/// # Arguments
/// * `subject` - Wallet being analyzed
/// * `contract` - Token contract address
/// * `transfers` - Explorer `tokentx` records
/// * `default_decimals` - Token decimals used when a record carries none
pub fn classify_transfers(
    subject: &WalletAddress,
    contract: &WalletAddress,
    transfers: &[RawTokenTransfer],
    default_decimals: u8,
) -> Classification {
    let mut result = Classification::default();

    for transfer in transfers {
        let Some(action) = classify_action(subject, contract, transfer) else {
            continue;
        };

        let Some(amount) = transfer.amount(default_decimals) else {
            debug!("Skipping transfer {} with malformed value {:?}", transfer.hash, transfer.value);
            continue;
        };
        let Some(timestamp_ms) = transfer.timestamp_ms() else {
            debug!("Skipping transfer {} with malformed timestamp {:?}", transfer.hash, transfer.time_stamp);
            continue;
        };

        let event = TransferEvent {
            action,
            amount,
            timestamp_ms,
            tx_hash: transfer.hash.trim().to_ascii_lowercase(),
            native_value: None,
        };

        match action {
            TradeAction::Buy => {
                result.total_bought += amount;
                result.buys.push(event);
            }
            TradeAction::Sell => {
                result.total_sold += amount;
                result.sells.push(event);
            }
        }
    }

    result
}
