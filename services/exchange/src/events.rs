//! Market events for external indexing and UIs
//!
//! Events are immutable records appended to a per-market log as operations
//! complete; the host drains the log after each call. A single match
//! produces a matched event (`AutoMatched` or `CrossAssetMatched`) plus the
//! paired `SharesTransferred` and `TradeSettled` records.

use serde::{Deserialize, Serialize};
use types::ids::{OrderId, TraderId};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::outcome::Outcome;

/// A new order entered the book (before matching).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub trader: TraderId,
    pub outcome: Outcome,
    pub price: Price,
    pub quantity: Quantity,
    pub side: Side,
}

/// An order's unfilled remainder was cancelled by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
    pub trader: TraderId,
    pub filled_quantity: u64,
    pub unfilled_quantity: u64,
}

/// Locked collateral returned on cancellation of a bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRefunded {
    pub order_id: OrderId,
    pub trader: TraderId,
    pub amount: u64,
}

/// Same-outcome match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoMatched {
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub outcome: Outcome,
    pub price: Price,
    pub quantity: Quantity,
}

/// Complementary-outcome match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossAssetMatched {
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    /// The outcome whose shares changed hands (the ask side's outcome).
    pub share_outcome: Outcome,
    pub price: Price,
    pub quantity: Quantity,
}

/// Payment leg of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSettled {
    pub seller: TraderId,
    pub buyer: TraderId,
    pub amount: u64,
    /// True when the payment accrued to the settlement pool.
    pub deferred: bool,
}

/// Share leg of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharesTransferred {
    pub from: TraderId,
    pub to: TraderId,
    pub outcome: Outcome,
    pub quantity: Quantity,
}

/// A trader pulled accrued settlement out of the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementClaimed {
    pub trader: TraderId,
    pub amount: u64,
}

/// Enum wrapper for all market events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEvent {
    OrderPlaced(OrderPlaced),
    OrderCancelled(OrderCancelled),
    OrderRefunded(OrderRefunded),
    AutoMatched(AutoMatched),
    CrossAssetMatched(CrossAssetMatched),
    TradeSettled(TradeSettled),
    SharesTransferred(SharesTransferred),
    SettlementClaimed(SettlementClaimed),
}
