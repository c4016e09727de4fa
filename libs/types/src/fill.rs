//! Match results handed from the matcher to clearing
//!
//! A `Fill` is the record of one maker/taker pairing. The matcher produces
//! fills after updating book-side state; clearing consumes them to move
//! shares and collateral. The two halves must always be applied together.

use crate::errors::MarketError;
use crate::ids::{OrderId, TraderId};
use crate::numeric::{Price, Quantity};
use crate::outcome::Outcome;
use serde::{Deserialize, Serialize};

/// Which matching phase produced the fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillKind {
    /// Both orders on the same outcome, opposite sides
    SameOutcome,
    /// Orders on complementary outcomes, opposite sides
    CrossOutcome,
}

/// One maker/taker pairing produced by the matcher.
///
/// In every fill exactly one of the pair is a bid and one is an ask:
/// `seller` is the ask's trader, `buyer` the bid's trader, and
/// `share_outcome` the ask's outcome (which for cross fills differs from the
/// bid's). `execution_price` is what the seller is paid per share;
/// `bid_limit_price` is what the paying bid locked per share, so any spread
/// between the two is refunded to the buyer when the fill settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub kind: FillKind,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub seller: TraderId,
    pub buyer: TraderId,
    pub share_outcome: Outcome,
    pub execution_price: Price,
    pub quantity: Quantity,
    pub bid_order_id: OrderId,
    pub bid_limit_price: Price,
}

impl Fill {
    /// Amount paid to the seller for this fill.
    pub fn payment(&self) -> Result<u64, MarketError> {
        self.execution_price.cost(self.quantity)
    }

    /// Unconsumed portion of the bid's lock for the filled quantity,
    /// returned to the buyer at settlement. Zero whenever execution happens
    /// at the bid's own price.
    pub fn spread_refund(&self) -> Result<u64, MarketError> {
        let spread = self
            .bid_limit_price
            .ticks()
            .checked_sub(self.execution_price.ticks())
            .ok_or(MarketError::Overflow)?;
        spread
            .checked_mul(self.quantity.get())
            .ok_or(MarketError::Overflow)
    }

    /// Total drawn from the bid's lock: payment plus refund.
    pub fn lock_consumed(&self) -> Result<u64, MarketError> {
        self.bid_limit_price.cost(self.quantity)
    }
}
