//! Fill settlement
//!
//! Applies the value side of a matcher fill: the share transfer and the
//! payment are one logical operation and must never be separated. The
//! matcher has already consumed the bid's recorded lock, so the vault holds
//! exactly `bid_limit × quantity` for this fill — split here into the
//! seller's payment and the buyer's spread refund.

use serde::{Deserialize, Serialize};
use types::errors::MarketError;
use types::fill::Fill;

use crate::balance::BalanceBook;
use crate::market::{Market, SettlementMode};

/// What settling one fill moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Paid to the seller (or accrued to their pool entry).
    pub payment: u64,
    /// Returned to the buyer when execution beat their limit.
    pub spread_refund: u64,
    /// True when the payment went to the settlement pool instead of the
    /// seller's balance.
    pub deferred: bool,
}

/// Settle one fill against the market and its balance book.
///
/// Failures here indicate broken invariants upstream (the matcher only
/// produces fills whose funding was locked at placement); they abort the
/// surrounding operation rather than being handled.
pub fn apply_fill(
    market: &mut Market,
    balances: &mut BalanceBook,
    fill: &Fill,
) -> Result<Settlement, MarketError> {
    let payment = fill.payment()?;
    let spread_refund = fill.spread_refund()?;

    market.ledger_mut(fill.share_outcome).transfer_reserved(
        fill.seller,
        fill.buyer,
        fill.quantity.get(),
    )?;

    let deferred = match market.settlement_mode() {
        SettlementMode::Immediate => {
            market.vault_debit(payment)?;
            balances.get_mut(&fill.seller)?.credit(payment)?;
            false
        }
        SettlementMode::Deferred => {
            // Funds stay in the vault, earmarked in the pool until claimed.
            market.defer_payout(fill.seller, payment)?;
            true
        }
    };

    if spread_refund > 0 {
        market.vault_debit(spread_refund)?;
        balances.get_mut(&fill.buyer)?.credit(spread_refund)?;
    }

    Ok(Settlement {
        payment,
        spread_refund,
        deferred,
    })
}
