//! Order lifecycle types
//!
//! An order is created by placement, accumulates fills monotonically, and
//! terminates by filling completely or being cancelled. Orders never leave
//! the active index except through one of those two transitions.

use crate::ids::{MarketId, OrderId, TraderId};
use crate::numeric::{Price, Quantity};
use crate::outcome::Outcome;
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order: locks `price × quantity` collateral at placement
    Bid,
    /// Sell order: reserves `quantity` shares of the outcome at placement
    Ask,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Resting with no fills
    Open,
    /// Resting with some quantity consumed
    PartiallyFilled,
    /// Completely matched (terminal)
    Filled,
    /// Cancelled by owner (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A limit order resting in (or passing through) the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub trader: TraderId,
    pub market_id: MarketId,
    pub outcome: Outcome,
    pub price: Price,
    pub quantity: Quantity,
    pub filled_quantity: u64,
    pub side: Side,
    /// Logical placement stamp issued by the book
    pub created_at: u64,
    /// Remaining collateral held in the vault for this order.
    /// Always `price × (quantity − filled_quantity)` for bids, 0 for asks.
    pub locked_collateral: u64,
    pub status: OrderStatus,
}

impl Order {
    /// Create a new open order.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: OrderId,
        trader: TraderId,
        market_id: MarketId,
        outcome: Outcome,
        price: Price,
        quantity: Quantity,
        side: Side,
        created_at: u64,
        locked_collateral: u64,
    ) -> Self {
        Self {
            order_id,
            trader,
            market_id,
            outcome,
            price,
            quantity,
            filled_quantity: 0,
            side,
            created_at,
            locked_collateral,
            status: OrderStatus::Open,
        }
    }

    /// Unfilled quantity.
    pub fn remaining(&self) -> u64 {
        self.quantity.get() - self.filled_quantity
    }

    /// Check if order is completely filled.
    pub fn is_filled(&self) -> bool {
        self.filled_quantity == self.quantity.get()
    }

    /// Advance the fill counter and adjust status.
    ///
    /// # Panics
    /// Panics if the fill would exceed total quantity — that is an engine
    /// defect, not a runtime condition.
    pub fn add_fill(&mut self, fill_quantity: u64) {
        assert!(
            fill_quantity <= self.remaining(),
            "fill would exceed order quantity"
        );
        self.filled_quantity += fill_quantity;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }

    /// Consume part of a bid's lock as a fill settles.
    ///
    /// # Panics
    /// Panics on asks or when consuming more than is locked.
    pub fn consume_lock(&mut self, amount: u64) {
        assert!(self.side == Side::Bid, "only bids hold locked collateral");
        assert!(amount <= self.locked_collateral, "lock underflow");
        self.locked_collateral -= amount;
    }

    /// Release the whole remaining lock (cancellation path).
    pub fn release_lock(&mut self) -> u64 {
        std::mem::take(&mut self.locked_collateral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order(side: Side, price: u64, qty: u64) -> Order {
        let price = Price::try_new(price).unwrap();
        let quantity = Quantity::try_new(qty).unwrap();
        let locked = match side {
            Side::Bid => price.cost(quantity).unwrap(),
            Side::Ask => 0,
        };
        Order::new(
            OrderId::from_sequence(1),
            TraderId::new(),
            MarketId::new(),
            Outcome::OptionA,
            price,
            quantity,
            side,
            0,
            locked,
        )
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Bid.opposite(), Side::Ask);
        assert_eq!(Side::Ask.opposite(), Side::Bid);
    }

    #[test]
    fn test_new_bid_locks_cost() {
        let order = sample_order(Side::Bid, 40, 10);
        assert_eq!(order.locked_collateral, 400);
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.remaining(), 10);
    }

    #[test]
    fn test_new_ask_locks_nothing() {
        let order = sample_order(Side::Ask, 40, 10);
        assert_eq!(order.locked_collateral, 0);
    }

    #[test]
    fn test_fill_progression() {
        let mut order = sample_order(Side::Bid, 40, 10);

        order.add_fill(4);
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining(), 6);

        order.add_fill(6);
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.is_filled());
        assert!(order.status.is_terminal());
    }

    #[test]
    #[should_panic(expected = "fill would exceed order quantity")]
    fn test_overfill_panics() {
        let mut order = sample_order(Side::Bid, 40, 10);
        order.add_fill(11);
    }

    #[test]
    fn test_consume_and_release_lock() {
        let mut order = sample_order(Side::Bid, 30, 10);
        order.add_fill(4);
        order.consume_lock(120);
        assert_eq!(order.locked_collateral, 180);
        assert_eq!(order.release_lock(), 180);
        assert_eq!(order.locked_collateral, 0);
    }

    #[test]
    #[should_panic(expected = "only bids hold locked collateral")]
    fn test_ask_consume_lock_panics() {
        let mut order = sample_order(Side::Ask, 30, 10);
        order.add_fill(1);
        order.consume_lock(30);
    }

    #[test]
    fn test_order_serialization() {
        let order = sample_order(Side::Bid, 55, 3);
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
