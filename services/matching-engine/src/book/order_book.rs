//! Per-market order book
//!
//! One book holds the resting orders of both outcomes. Four indexes are
//! maintained over the authoritative order table:
//!
//! - `active`: ids that may still match or be cancelled
//! - `bid_ids` / `ask_ids`: insertion-order side lists, retained after an
//!   order fills so historical orders stay queryable
//! - `bid_levels` / `ask_levels`: price-sorted FIFO queues of *active* ids,
//!   used for price-priority matching and best-price queries
//!
//! A fully filled order leaves `active` and its price level but keeps its
//! side-list entry; a cancelled order is removed everywhere, including the
//! order table.

use std::collections::{BTreeMap, HashMap, HashSet};
use types::errors::MarketError;
use types::ids::{MarketId, OrderId, TraderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderStatus, Side};
use types::outcome::Outcome;

use super::price_level::PriceLevel;

/// The per-market order book.
#[derive(Debug)]
pub struct OrderBook {
    market_id: MarketId,
    pub(crate) orders: HashMap<OrderId, Order>,
    pub(crate) active: HashSet<OrderId>,
    bid_ids: Vec<OrderId>,
    ask_ids: Vec<OrderId>,
    pub(crate) bid_levels: BTreeMap<Price, PriceLevel>,
    pub(crate) ask_levels: BTreeMap<Price, PriceLevel>,
    next_order_id: u64,
    clock: u64,
}

impl OrderBook {
    /// Create an empty book for a market.
    pub fn new(market_id: MarketId) -> Self {
        Self {
            market_id,
            orders: HashMap::new(),
            active: HashSet::new(),
            bid_ids: Vec::new(),
            ask_ids: Vec::new(),
            bid_levels: BTreeMap::new(),
            ask_levels: BTreeMap::new(),
            next_order_id: 1,
            clock: 0,
        }
    }

    pub fn market_id(&self) -> MarketId {
        self.market_id
    }

    /// Insert a validated order and index it everywhere.
    ///
    /// Validation (funds, shares, market state) happens before this is
    /// called; placement itself cannot fail.
    pub fn place(
        &mut self,
        trader: TraderId,
        outcome: Outcome,
        price: Price,
        quantity: Quantity,
        side: Side,
        locked_collateral: u64,
    ) -> OrderId {
        let order_id = OrderId::from_sequence(self.next_order_id);
        self.next_order_id += 1;
        let created_at = self.clock;
        self.clock += 1;

        let order = Order::new(
            order_id,
            trader,
            self.market_id,
            outcome,
            price,
            quantity,
            side,
            created_at,
            locked_collateral,
        );

        match side {
            Side::Bid => {
                self.bid_ids.push(order_id);
                self.bid_levels.entry(price).or_default().push(order_id);
            }
            Side::Ask => {
                self.ask_ids.push(order_id);
                self.ask_levels.entry(price).or_default().push(order_id);
            }
        }
        self.active.insert(order_id);
        self.orders.insert(order_id, order);
        order_id
    }

    /// Cancel the unfilled remainder of an order.
    ///
    /// Partially filled orders are cancellable; only the remainder comes off
    /// the book (the fill history is not reversed). Returns the removed
    /// order so the caller can refund its remaining lock or reservation.
    pub fn cancel(&mut self, order_id: OrderId, caller: TraderId) -> Result<Order, MarketError> {
        let order = self
            .orders
            .get(&order_id)
            .ok_or(MarketError::OrderNotFound {
                order_id: order_id.as_u64(),
            })?;
        if order.trader != caller {
            return Err(MarketError::Unauthorized);
        }
        if !self.active.contains(&order_id) {
            // Fully filled orders have nothing left to cancel.
            return Err(MarketError::OrderNotFound {
                order_id: order_id.as_u64(),
            });
        }

        let (side, price) = (order.side, order.price);
        match side {
            Side::Bid => self.bid_ids.retain(|id| *id != order_id),
            Side::Ask => self.ask_ids.retain(|id| *id != order_id),
        }
        self.remove_from_level(side, price, order_id);
        self.active.remove(&order_id);

        let mut order = self.orders.remove(&order_id).expect("checked above");
        order.status = OrderStatus::Cancelled;
        Ok(order)
    }

    /// Drop a fully filled order from the active index and its price level.
    /// Its side-list and order-table entries remain for historical queries.
    pub(crate) fn retire(&mut self, order_id: OrderId) {
        let (side, price) = {
            let order = &self.orders[&order_id];
            debug_assert!(order.is_filled(), "retiring an unfilled order");
            (order.side, order.price)
        };
        self.active.remove(&order_id);
        self.remove_from_level(side, price, order_id);
    }

    fn remove_from_level(&mut self, side: Side, price: Price, order_id: OrderId) {
        let levels = match side {
            Side::Bid => &mut self.bid_levels,
            Side::Ask => &mut self.ask_levels,
        };
        if let Some(level) = levels.get_mut(&price) {
            level.remove(order_id);
            if level.is_empty() {
                levels.remove(&price);
            }
        }
    }

    /// Best active bid price, if any bid is active.
    pub fn top_bid(&self) -> Option<Price> {
        self.bid_levels.keys().next_back().copied()
    }

    /// Best active ask price, if any ask is active.
    pub fn top_ask(&self) -> Option<Price> {
        self.ask_levels.keys().next().copied()
    }

    /// Side-list lengths: includes fully filled (historical) entries,
    /// excludes cancelled ones. Callers needing live depth should
    /// cross-reference [`OrderBook::is_active`].
    pub fn depth(&self) -> (usize, usize) {
        (self.bid_ids.len(), self.ask_ids.len())
    }

    /// Look up an order (resting, filled, or in-flight; not cancelled).
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// Whether the order may still match or be cancelled.
    pub fn is_active(&self, order_id: OrderId) -> bool {
        self.active.contains(&order_id)
    }

    /// Number of active orders.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> OrderBook {
        OrderBook::new(MarketId::new())
    }

    fn price(p: u64) -> Price {
        Price::try_new(p).unwrap()
    }

    fn qty(q: u64) -> Quantity {
        Quantity::try_new(q).unwrap()
    }

    fn place_bid(book: &mut OrderBook, trader: TraderId, p: u64, q: u64) -> OrderId {
        let cost = price(p).cost(qty(q)).unwrap();
        book.place(trader, Outcome::OptionA, price(p), qty(q), Side::Bid, cost)
    }

    #[test]
    fn test_place_assigns_monotonic_ids() {
        let mut book = book();
        let trader = TraderId::new();
        let id1 = place_bid(&mut book, trader, 40, 10);
        let id2 = place_bid(&mut book, trader, 41, 10);
        assert!(id1 < id2);
        assert_eq!(id1.as_u64(), 1);
        assert_eq!(id2.as_u64(), 2);
    }

    #[test]
    fn test_place_indexes_order() {
        let mut book = book();
        let trader = TraderId::new();
        let id = place_bid(&mut book, trader, 40, 10);

        assert!(book.is_active(id));
        assert_eq!(book.depth(), (1, 0));
        assert_eq!(book.top_bid(), Some(price(40)));
        assert_eq!(book.order(id).unwrap().locked_collateral, 400);
    }

    #[test]
    fn test_top_bid_is_best_price_not_first_inserted() {
        let mut book = book();
        let trader = TraderId::new();
        place_bid(&mut book, trader, 40, 10);
        place_bid(&mut book, trader, 55, 10);
        place_bid(&mut book, trader, 47, 10);
        assert_eq!(book.top_bid(), Some(price(55)));
    }

    #[test]
    fn test_top_ask_is_lowest() {
        let mut book = book();
        let trader = TraderId::new();
        book.place(trader, Outcome::OptionA, price(60), qty(5), Side::Ask, 0);
        book.place(trader, Outcome::OptionA, price(45), qty(5), Side::Ask, 0);
        assert_eq!(book.top_ask(), Some(price(45)));
    }

    #[test]
    fn test_cancel_removes_everywhere() {
        let mut book = book();
        let trader = TraderId::new();
        let id = place_bid(&mut book, trader, 40, 10);

        let cancelled = book.cancel(id, trader).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.locked_collateral, 400);
        assert!(!book.is_active(id));
        assert!(book.order(id).is_none());
        assert_eq!(book.depth(), (0, 0));
        assert_eq!(book.top_bid(), None);
    }

    #[test]
    fn test_cancel_unknown_order() {
        let mut book = book();
        let trader = TraderId::new();
        let err = book.cancel(OrderId::from_sequence(7), trader).unwrap_err();
        assert_eq!(err, MarketError::OrderNotFound { order_id: 7 });
    }

    #[test]
    fn test_cancel_by_non_owner() {
        let mut book = book();
        let owner = TraderId::new();
        let stranger = TraderId::new();
        let id = place_bid(&mut book, owner, 40, 10);

        let err = book.cancel(id, stranger).unwrap_err();
        assert_eq!(err, MarketError::Unauthorized);
        assert!(book.is_active(id), "failed cancel must not disturb the order");
    }

    #[test]
    fn test_retire_keeps_side_list_entry() {
        let mut book = book();
        let trader = TraderId::new();
        let id = place_bid(&mut book, trader, 40, 10);

        book.orders.get_mut(&id).unwrap().add_fill(10);
        book.retire(id);

        assert!(!book.is_active(id));
        assert_eq!(book.depth(), (1, 0), "filled orders stay visible");
        assert_eq!(book.top_bid(), None);
        assert!(book.order(id).is_some());
    }

    #[test]
    fn test_cancel_filled_order_rejected() {
        let mut book = book();
        let trader = TraderId::new();
        let id = place_bid(&mut book, trader, 40, 10);
        book.orders.get_mut(&id).unwrap().add_fill(10);
        book.retire(id);

        let err = book.cancel(id, trader).unwrap_err();
        assert!(matches!(err, MarketError::OrderNotFound { .. }));
    }
}
