//! The exchange facade
//!
//! One `Exchange` owns every market. Each market is a shard behind its own
//! mutex: the order book, the market aggregate (vault, ledgers, pool), the
//! balance book, and the event log. Public operations lock exactly one
//! shard for their whole duration, which reproduces the host runtime's
//! per-book call serialization.

use std::collections::HashMap;
use parking_lot::Mutex;
use tracing::{debug, info};

use clearing::{apply_fill, BalanceBook, Market, SettlementMode};
use matching_engine::{match_order, OrderBook};
use types::errors::MarketError;
use types::fill::{Fill, FillKind};
use types::ids::{MarketId, OrderId, TraderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};
use types::outcome::Outcome;

use crate::events::{
    AutoMatched, CrossAssetMatched, MarketEvent, OrderCancelled, OrderPlaced, OrderRefunded,
    SettlementClaimed, SharesTransferred, TradeSettled,
};

struct MarketShard {
    market: Market,
    book: OrderBook,
    balances: BalanceBook,
    events: Vec<MarketEvent>,
}

/// The public operation surface of the market core.
pub struct Exchange {
    admin: TraderId,
    markets: HashMap<MarketId, Mutex<MarketShard>>,
}

impl Exchange {
    /// Create an exchange administered by the given trader.
    pub fn new(admin: TraderId) -> Self {
        Self {
            admin,
            markets: HashMap::new(),
        }
    }

    fn shard(&self, market_id: MarketId) -> Result<&Mutex<MarketShard>, MarketError> {
        self.markets
            .get(&market_id)
            .ok_or(MarketError::MarketNotFound)
    }

    fn require_admin(&self, caller: TraderId) -> Result<(), MarketError> {
        if caller != self.admin {
            return Err(MarketError::Unauthorized);
        }
        Ok(())
    }

    // ───────────────────────── Administration ─────────────────────────

    /// Create a market with immediate maker settlement. Admin-only.
    pub fn create_market(
        &mut self,
        caller: TraderId,
        question: impl Into<String>,
        option_a_name: impl Into<String>,
        option_b_name: impl Into<String>,
    ) -> Result<MarketId, MarketError> {
        self.create_market_with_mode(
            caller,
            question,
            option_a_name,
            option_b_name,
            SettlementMode::Immediate,
        )
    }

    /// Create a market with an explicit settlement mode. Admin-only.
    pub fn create_market_with_mode(
        &mut self,
        caller: TraderId,
        question: impl Into<String>,
        option_a_name: impl Into<String>,
        option_b_name: impl Into<String>,
        mode: SettlementMode,
    ) -> Result<MarketId, MarketError> {
        self.require_admin(caller)?;
        let market_id = MarketId::new();
        let shard = MarketShard {
            market: Market::with_mode(market_id, question, option_a_name, option_b_name, mode),
            book: OrderBook::new(market_id),
            balances: BalanceBook::new(),
            events: Vec::new(),
        };
        self.markets.insert(market_id, Mutex::new(shard));
        info!(%market_id, ?mode, "market created");
        Ok(market_id)
    }

    /// Open or close a market for new orders. Admin-only.
    pub fn set_market_active(
        &self,
        caller: TraderId,
        market_id: MarketId,
        active: bool,
    ) -> Result<(), MarketError> {
        self.require_admin(caller)?;
        let mut shard = self.shard(market_id)?.lock();
        shard.market.set_active(active);
        info!(%market_id, active, "market activity changed");
        Ok(())
    }

    /// Grant outcome shares to a trader (host bootstrap mint). Admin-only.
    pub fn credit_shares(
        &self,
        caller: TraderId,
        market_id: MarketId,
        trader: TraderId,
        outcome: Outcome,
        quantity: u64,
    ) -> Result<(), MarketError> {
        self.require_admin(caller)?;
        if quantity == 0 {
            return Err(MarketError::InvalidQuantity { shares: 0 });
        }
        let mut shard = self.shard(market_id)?.lock();
        shard.market.credit_shares(trader, outcome, quantity)
    }

    // ───────────────────────── Funds ─────────────────────────

    /// Create the trader's balance record; one per (trader, market).
    pub fn create_user_balance(
        &self,
        trader: TraderId,
        market_id: MarketId,
    ) -> Result<(), MarketError> {
        let mut shard = self.shard(market_id)?.lock();
        shard.balances.create(trader, market_id)
    }

    /// Credit funds to the trader's balance.
    pub fn deposit(
        &self,
        trader: TraderId,
        market_id: MarketId,
        amount: u64,
    ) -> Result<(), MarketError> {
        if amount == 0 {
            return Err(MarketError::InvalidAmount);
        }
        let mut shard = self.shard(market_id)?.lock();
        shard.balances.get_mut(&trader)?.credit(amount)
    }

    /// Remove funds from the trader's balance, returning the amount moved.
    pub fn withdraw(
        &self,
        trader: TraderId,
        market_id: MarketId,
        amount: u64,
    ) -> Result<u64, MarketError> {
        if amount == 0 {
            return Err(MarketError::InvalidAmount);
        }
        let mut shard = self.shard(market_id)?.lock();
        shard.balances.get_mut(&trader)?.debit(amount)?;
        Ok(amount)
    }

    // ───────────────────────── Orders ─────────────────────────

    /// Place a limit order and run matching synchronously.
    ///
    /// For bids, `price × quantity` is locked into the vault before the
    /// order enters the book; for asks, `quantity` shares of the outcome
    /// are reserved. Either reservation fails before any state changes.
    pub fn place_order(
        &self,
        trader: TraderId,
        market_id: MarketId,
        outcome: Outcome,
        price: u64,
        quantity: u64,
        side: Side,
    ) -> Result<OrderId, MarketError> {
        let price = Price::try_new(price)?;
        let quantity = Quantity::try_new(quantity)?;
        let mut guard = self.shard(market_id)?.lock();
        let shard = &mut *guard;

        if !shard.market.is_active() {
            return Err(MarketError::MarketInactive);
        }
        // Ownership check: the caller must hold a balance in this market.
        shard.balances.get(&trader)?;

        let locked_collateral = match side {
            Side::Bid => {
                let cost = price.cost(quantity)?;
                let balance = shard.balances.get_mut(&trader)?;
                shard.market.lock_collateral(balance, cost)?;
                cost
            }
            Side::Ask => {
                shard
                    .market
                    .ledger_mut(outcome)
                    .reserve(trader, quantity.get())?;
                0
            }
        };

        let order_id = shard
            .book
            .place(trader, outcome, price, quantity, side, locked_collateral);
        shard.events.push(MarketEvent::OrderPlaced(OrderPlaced {
            order_id,
            trader,
            outcome,
            price,
            quantity,
            side,
        }));
        info!(%market_id, %order_id, %trader, %outcome, %price, %quantity, ?side, "order placed");

        let fills = match_order(&mut shard.book, order_id);
        for fill in &fills {
            Self::settle_and_record(shard, fill)?;
        }
        if !fills.is_empty() {
            debug!(%order_id, fills = fills.len(), "matching complete");
        }
        Ok(order_id)
    }

    /// Thin `u8`-encoded wrapper over [`Exchange::place_order`]
    /// (`0` = OptionA/bid, `1` = OptionB/ask).
    #[allow(clippy::too_many_arguments)]
    pub fn place_order_cli(
        &self,
        trader: TraderId,
        market_id: MarketId,
        outcome: u8,
        price: u64,
        quantity: u64,
        side: u8,
    ) -> Result<OrderId, MarketError> {
        let outcome =
            Outcome::try_from_u8(outcome).ok_or(MarketError::InvalidOutcome { raw: outcome })?;
        let side = match side {
            0 => Side::Bid,
            1 => Side::Ask,
            raw => return Err(MarketError::InvalidSide { raw }),
        };
        self.place_order(trader, market_id, outcome, price, quantity, side)
    }

    /// Cancel the unfilled remainder of the caller's order.
    pub fn cancel_order(
        &self,
        trader: TraderId,
        market_id: MarketId,
        order_id: OrderId,
    ) -> Result<(), MarketError> {
        let mut guard = self.shard(market_id)?.lock();
        let shard = &mut *guard;

        let cancelled = shard.book.cancel(order_id, trader)?;
        shard.events.push(MarketEvent::OrderCancelled(OrderCancelled {
            order_id,
            trader,
            filled_quantity: cancelled.filled_quantity,
            unfilled_quantity: cancelled.remaining(),
        }));

        match cancelled.side {
            Side::Bid => {
                let refund = cancelled.locked_collateral;
                if refund > 0 {
                    let balance = shard.balances.get_mut(&trader)?;
                    shard.market.refund(balance, refund)?;
                    shard.events.push(MarketEvent::OrderRefunded(OrderRefunded {
                        order_id,
                        trader,
                        amount: refund,
                    }));
                }
            }
            Side::Ask => {
                shard
                    .market
                    .ledger_mut(cancelled.outcome)
                    .release(trader, cancelled.remaining());
            }
        }
        info!(%market_id, %order_id, %trader, "order cancelled");
        Ok(())
    }

    /// Pull accrued deferred settlement; returns the claimed amount.
    pub fn claim_settlement(
        &self,
        trader: TraderId,
        market_id: MarketId,
    ) -> Result<u64, MarketError> {
        let mut guard = self.shard(market_id)?.lock();
        let shard = &mut *guard;
        let balance = shard.balances.get_mut(&trader)?;
        let amount = shard.market.claim_settlement(balance)?;
        shard
            .events
            .push(MarketEvent::SettlementClaimed(SettlementClaimed {
                trader,
                amount,
            }));
        info!(%market_id, %trader, amount, "settlement claimed");
        Ok(amount)
    }

    // ───────────────────────── Read-only surface ─────────────────────────

    /// Best active bid price in ticks, 0 when no bid is active.
    pub fn top_bid(&self, market_id: MarketId) -> Result<u64, MarketError> {
        let shard = self.shard(market_id)?.lock();
        Ok(shard.book.top_bid().map_or(0, Price::ticks))
    }

    /// Best active ask price in ticks, 0 when no ask is active.
    pub fn top_ask(&self, market_id: MarketId) -> Result<u64, MarketError> {
        let shard = self.shard(market_id)?.lock();
        Ok(shard.book.top_ask().map_or(0, Price::ticks))
    }

    /// Side-list lengths (includes filled, historical orders).
    pub fn depth(&self, market_id: MarketId) -> Result<(usize, usize), MarketError> {
        let shard = self.shard(market_id)?.lock();
        Ok(shard.book.depth())
    }

    /// A trader's holdings and uncommitted funds:
    /// `(a_shares, b_shares, balance)`.
    pub fn user_position(
        &self,
        market_id: MarketId,
        trader: TraderId,
    ) -> Result<(u64, u64, u64), MarketError> {
        let shard = self.shard(market_id)?.lock();
        let (a_shares, b_shares) = shard.market.position(&trader);
        let balance = shard.balances.get(&trader)?.balance();
        Ok((a_shares, b_shares, balance))
    }

    /// Snapshot of a resting or filled order.
    pub fn order(
        &self,
        market_id: MarketId,
        order_id: OrderId,
    ) -> Result<Option<Order>, MarketError> {
        let shard = self.shard(market_id)?.lock();
        Ok(shard.book.order(order_id).cloned())
    }

    /// Current vault holdings: locked bid collateral plus unclaimed
    /// settlement. Exposed for invariant monitoring.
    pub fn vault_balance(&self, market_id: MarketId) -> Result<u64, MarketError> {
        let shard = self.shard(market_id)?.lock();
        Ok(shard.market.vault())
    }

    /// Sum of all unclaimed settlement in the market's pool.
    pub fn settlement_pool_total(&self, market_id: MarketId) -> Result<u64, MarketError> {
        let shard = self.shard(market_id)?.lock();
        Ok(shard.market.pool_total())
    }

    /// Drain the market's ordered event log.
    pub fn drain_events(&self, market_id: MarketId) -> Result<Vec<MarketEvent>, MarketError> {
        let mut shard = self.shard(market_id)?.lock();
        Ok(std::mem::take(&mut shard.events))
    }

    // ───────────────────────── Internals ─────────────────────────

    /// Apply one fill's value movement and append its event triple.
    fn settle_and_record(shard: &mut MarketShard, fill: &Fill) -> Result<(), MarketError> {
        let settlement = apply_fill(&mut shard.market, &mut shard.balances, fill)?;
        debug!(
            maker = %fill.maker_order_id,
            taker = %fill.taker_order_id,
            ?fill.kind,
            price = %fill.execution_price,
            quantity = %fill.quantity,
            payment = settlement.payment,
            "fill settled"
        );

        shard.events.push(match fill.kind {
            FillKind::SameOutcome => MarketEvent::AutoMatched(AutoMatched {
                maker_order_id: fill.maker_order_id,
                taker_order_id: fill.taker_order_id,
                outcome: fill.share_outcome,
                price: fill.execution_price,
                quantity: fill.quantity,
            }),
            FillKind::CrossOutcome => MarketEvent::CrossAssetMatched(CrossAssetMatched {
                maker_order_id: fill.maker_order_id,
                taker_order_id: fill.taker_order_id,
                share_outcome: fill.share_outcome,
                price: fill.execution_price,
                quantity: fill.quantity,
            }),
        });
        shard
            .events
            .push(MarketEvent::SharesTransferred(SharesTransferred {
                from: fill.seller,
                to: fill.buyer,
                outcome: fill.share_outcome,
                quantity: fill.quantity,
            }));
        shard.events.push(MarketEvent::TradeSettled(TradeSettled {
            seller: fill.seller,
            buyer: fill.buyer,
            amount: settlement.payment,
            deferred: settlement.deferred,
        }));
        Ok(())
    }
}
