//! Two-phase matcher
//!
//! Runs once, synchronously, for a newly inserted order. Phase 1 pairs the
//! taker with resting orders on the same outcome (opposite side, crossing
//! prices, executed at the maker's price). Phase 2 pairs any remainder with
//! resting orders on the complementary outcome (opposite side, prices
//! summing to at most the full payout).
//!
//! In every fill exactly one of the pair is a bid; the bid pays its own
//! locked price per share and receives the ask's outcome shares. For phase 1
//! this makes execution-at-maker-price exact for maker bids and leaves a
//! spread refund for taker bids; for phase 2 the bid's lock is consumed with
//! no residue.
//!
//! Resting orders are never re-evaluated against each other: only the taker
//! drives matching. Levels are visited in price order (best for the taker
//! first), FIFO within a level. A trader's own resting orders are skipped.

use types::fill::{Fill, FillKind};
use types::ids::OrderId;
use types::numeric::Quantity;
use types::order::Side;

use crate::book::OrderBook;
use super::crossing;

/// Match a newly inserted order against the book.
///
/// Returns the fills in execution order; book-side state (fill counters,
/// bid locks, active index, price levels) is already updated when this
/// returns. Funds and shares move when clearing applies the fills.
pub fn match_order(book: &mut OrderBook, taker_id: OrderId) -> Vec<Fill> {
    let mut fills = Vec::new();
    run_phase(book, taker_id, FillKind::SameOutcome, &mut fills);
    if book.is_active(taker_id) {
        run_phase(book, taker_id, FillKind::CrossOutcome, &mut fills);
    }
    fills
}

fn run_phase(book: &mut OrderBook, taker_id: OrderId, kind: FillKind, fills: &mut Vec<Fill>) {
    while !book.orders[&taker_id].is_filled() {
        let Some(maker_id) = find_maker(book, taker_id, kind) else {
            break;
        };
        fills.push(execute(book, maker_id, taker_id, kind));
    }
}

/// Best eligible counter-order for the taker in the given phase, or `None`.
///
/// Opposite-side levels are scanned best-price-first; within a level, FIFO.
/// Entries on the wrong outcome or owned by the taker are skipped without
/// ending the scan.
fn find_maker(book: &OrderBook, taker_id: OrderId, kind: FillKind) -> Option<OrderId> {
    let taker = &book.orders[&taker_id];
    let want_outcome = match kind {
        FillKind::SameOutcome => taker.outcome,
        FillKind::CrossOutcome => taker.outcome.complement(),
    };

    let eligible = |candidate: OrderId| {
        let order = &book.orders[&candidate];
        order.outcome == want_outcome && order.trader != taker.trader
    };

    match taker.side {
        Side::Bid => {
            // Counter-side is the asks, cheapest first. Both predicates are
            // monotone in the ask price here, so the scan ends at the first
            // incompatible level.
            for (&level_price, level) in book.ask_levels.iter() {
                let compatible = match kind {
                    FillKind::SameOutcome => crossing::can_match(taker.price, level_price),
                    FillKind::CrossOutcome => crossing::cross_compatible(taker.price, level_price),
                };
                if !compatible {
                    break;
                }
                if let Some(id) = level.iter().find(|id| eligible(*id)) {
                    return Some(id);
                }
            }
            None
        }
        Side::Ask => {
            // Counter-side is the bids, highest first.
            for (&level_price, level) in book.bid_levels.iter().rev() {
                match kind {
                    FillKind::SameOutcome => {
                        // Descending scan: once the bid drops below the ask,
                        // nothing further crosses.
                        if !crossing::can_match(level_price, taker.price) {
                            break;
                        }
                    }
                    FillKind::CrossOutcome => {
                        // The payout cap excludes the *highest* bids; keep
                        // descending until compatible levels appear.
                        if !crossing::cross_compatible(taker.price, level_price) {
                            continue;
                        }
                    }
                }
                if let Some(id) = level.iter().find(|id| eligible(*id)) {
                    return Some(id);
                }
            }
            None
        }
    }
}

/// Apply one maker/taker pairing to the book and describe it as a `Fill`.
fn execute(book: &mut OrderBook, maker_id: OrderId, taker_id: OrderId, kind: FillKind) -> Fill {
    let maker = book.orders[&maker_id].clone();
    let taker = book.orders[&taker_id].clone();
    debug_assert_eq!(maker.side, taker.side.opposite(), "phases pair opposite sides");

    let match_qty = maker.remaining().min(taker.remaining());
    let quantity = Quantity::try_new(match_qty).expect("active orders have remaining quantity");

    let (bid, ask) = match maker.side {
        Side::Bid => (&maker, &taker),
        Side::Ask => (&taker, &maker),
    };
    let execution_price = match kind {
        // Same-outcome fills execute at the resting order's price.
        FillKind::SameOutcome => maker.price,
        // Cross-outcome fills consume the bid's lock exactly.
        FillKind::CrossOutcome => bid.price,
    };

    let fill = Fill {
        kind,
        maker_order_id: maker_id,
        taker_order_id: taker_id,
        seller: ask.trader,
        buyer: bid.trader,
        share_outcome: ask.outcome,
        execution_price,
        quantity,
        bid_order_id: bid.order_id,
        bid_limit_price: bid.price,
    };
    let lock_consumed = fill
        .lock_consumed()
        .expect("cannot exceed the lock taken at placement");
    let bid_id = bid.order_id;

    for id in [maker_id, taker_id] {
        let order = book.orders.get_mut(&id).expect("both orders are present");
        order.add_fill(match_qty);
        if id == bid_id {
            order.consume_lock(lock_consumed);
        }
    }
    if book.orders[&maker_id].is_filled() {
        book.retire(maker_id);
    }
    if book.orders[&taker_id].is_filled() {
        book.retire(taker_id);
    }
    fill
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::{MarketId, TraderId};
    use types::numeric::Price;
    use types::outcome::Outcome;

    fn book() -> OrderBook {
        OrderBook::new(MarketId::new())
    }

    fn price(p: u64) -> Price {
        Price::try_new(p).unwrap()
    }

    fn qty(q: u64) -> Quantity {
        Quantity::try_new(q).unwrap()
    }

    fn place(
        book: &mut OrderBook,
        trader: TraderId,
        outcome: Outcome,
        p: u64,
        q: u64,
        side: Side,
    ) -> OrderId {
        let locked = match side {
            Side::Bid => price(p).cost(qty(q)).unwrap(),
            Side::Ask => 0,
        };
        book.place(trader, outcome, price(p), qty(q), side, locked)
    }

    #[test]
    fn test_same_outcome_full_match_at_maker_price() {
        let mut book = book();
        let buyer = TraderId::new();
        let seller = TraderId::new();

        let bid = place(&mut book, buyer, Outcome::OptionA, 40, 10, Side::Bid);
        let ask = place(&mut book, seller, Outcome::OptionA, 35, 10, Side::Ask);
        let fills = match_order(&mut book, ask);

        assert_eq!(fills.len(), 1);
        let fill = &fills[0];
        assert_eq!(fill.kind, FillKind::SameOutcome);
        // Maker is the resting bid, so execution is at 40 ticks.
        assert_eq!(fill.execution_price, price(40));
        assert_eq!(fill.payment().unwrap(), 400);
        assert_eq!(fill.spread_refund().unwrap(), 0);
        assert_eq!(fill.seller, seller);
        assert_eq!(fill.buyer, buyer);
        assert_eq!(fill.share_outcome, Outcome::OptionA);

        assert!(!book.is_active(bid));
        assert!(!book.is_active(ask));
        assert_eq!(book.order(bid).unwrap().locked_collateral, 0);
        assert_eq!(book.top_bid(), None);
    }

    #[test]
    fn test_taker_bid_gets_spread_refund() {
        let mut book = book();
        let seller = TraderId::new();
        let buyer = TraderId::new();

        place(&mut book, seller, Outcome::OptionA, 35, 10, Side::Ask);
        let bid = place(&mut book, buyer, Outcome::OptionA, 40, 10, Side::Bid);
        let fills = match_order(&mut book, bid);

        assert_eq!(fills.len(), 1);
        let fill = &fills[0];
        // Maker is the resting ask: execution at 35, taker locked at 40.
        assert_eq!(fill.execution_price, price(35));
        assert_eq!(fill.payment().unwrap(), 350);
        assert_eq!(fill.spread_refund().unwrap(), 50);
        assert_eq!(fill.lock_consumed().unwrap(), 400);
        assert_eq!(book.order(bid).unwrap().locked_collateral, 0);
    }

    #[test]
    fn test_price_priority_over_arrival_order() {
        let mut book = book();
        let buyer = TraderId::new();
        let s1 = TraderId::new();
        let s2 = TraderId::new();

        // Worse ask arrives first; the matcher must still take 30 before 35.
        let worse = place(&mut book, s1, Outcome::OptionA, 35, 5, Side::Ask);
        let better = place(&mut book, s2, Outcome::OptionA, 30, 5, Side::Ask);
        let bid = place(&mut book, buyer, Outcome::OptionA, 40, 5, Side::Bid);
        let fills = match_order(&mut book, bid);

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].maker_order_id, better);
        assert_eq!(fills[0].execution_price, price(30));
        assert!(book.is_active(worse));
    }

    #[test]
    fn test_fifo_within_level() {
        let mut book = book();
        let buyer = TraderId::new();
        let s1 = TraderId::new();
        let s2 = TraderId::new();

        let first = place(&mut book, s1, Outcome::OptionA, 35, 5, Side::Ask);
        let second = place(&mut book, s2, Outcome::OptionA, 35, 5, Side::Ask);
        let bid = place(&mut book, buyer, Outcome::OptionA, 40, 5, Side::Bid);
        let fills = match_order(&mut book, bid);

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].maker_order_id, first);
        assert!(book.is_active(second));
    }

    #[test]
    fn test_partial_fill_leaves_remainder_active() {
        let mut book = book();
        let buyer = TraderId::new();
        let seller = TraderId::new();

        place(&mut book, seller, Outcome::OptionA, 30, 4, Side::Ask);
        let bid = place(&mut book, buyer, Outcome::OptionA, 30, 10, Side::Bid);
        let fills = match_order(&mut book, bid);

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].quantity, qty(4));
        let order = book.order(bid).unwrap();
        assert_eq!(order.remaining(), 6);
        assert_eq!(order.locked_collateral, 180);
        assert!(book.is_active(bid));
    }

    #[test]
    fn test_sweeps_multiple_levels() {
        let mut book = book();
        let buyer = TraderId::new();
        let seller = TraderId::new();

        place(&mut book, seller, Outcome::OptionA, 30, 3, Side::Ask);
        place(&mut book, seller, Outcome::OptionA, 32, 3, Side::Ask);
        place(&mut book, seller, Outcome::OptionA, 50, 3, Side::Ask);
        let bid = place(&mut book, buyer, Outcome::OptionA, 35, 10, Side::Bid);
        let fills = match_order(&mut book, bid);

        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].execution_price, price(30));
        assert_eq!(fills[1].execution_price, price(32));
        assert_eq!(book.order(bid).unwrap().remaining(), 4);
    }

    #[test]
    fn test_other_outcome_ignored_in_phase_one() {
        let mut book = book();
        let buyer = TraderId::new();
        let seller = TraderId::new();

        // Same side of the book, same crossing price, wrong outcome for
        // phase 1 — and as an ask on B at 35 it is cross-compatible with a
        // bid on A at 40 (35 <= 60), so it matches in phase 2 instead.
        place(&mut book, seller, Outcome::OptionB, 35, 5, Side::Ask);
        let bid = place(&mut book, buyer, Outcome::OptionA, 40, 5, Side::Bid);
        let fills = match_order(&mut book, bid);

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].kind, FillKind::CrossOutcome);
    }

    #[test]
    fn test_no_match_without_crossing() {
        let mut book = book();
        let buyer = TraderId::new();
        let seller = TraderId::new();

        place(&mut book, seller, Outcome::OptionA, 70, 5, Side::Ask);
        let bid = place(&mut book, buyer, Outcome::OptionA, 40, 5, Side::Bid);
        let fills = match_order(&mut book, bid);

        assert!(fills.is_empty());
        assert!(book.is_active(bid));
    }

    #[test]
    fn test_cross_match_taker_ask() {
        // Literal shape of the complementary scenario: a bid on A at 40
        // rests; an ask on B at 55 arrives. 55 <= 100 - 40, so they cross.
        let mut book = book();
        let x = TraderId::new();
        let y = TraderId::new();

        let bid_a = place(&mut book, x, Outcome::OptionA, 40, 5, Side::Bid);
        let ask_b = place(&mut book, y, Outcome::OptionB, 55, 5, Side::Ask);
        let fills = match_order(&mut book, ask_b);

        assert_eq!(fills.len(), 1);
        let fill = &fills[0];
        assert_eq!(fill.kind, FillKind::CrossOutcome);
        // The bid's lock was reserved at 40; payment is exactly that.
        assert_eq!(fill.execution_price, price(40));
        assert_eq!(fill.payment().unwrap(), 200);
        assert_eq!(fill.spread_refund().unwrap(), 0);
        // B-shares flow from the B-ask's trader to the A-bid's trader.
        assert_eq!(fill.share_outcome, Outcome::OptionB);
        assert_eq!(fill.seller, y);
        assert_eq!(fill.buyer, x);
        assert!(!book.is_active(bid_a));
        assert!(!book.is_active(ask_b));
        assert_eq!(book.order(bid_a).unwrap().locked_collateral, 0);
    }

    #[test]
    fn test_cross_match_taker_bid() {
        let mut book = book();
        let x = TraderId::new();
        let y = TraderId::new();

        place(&mut book, y, Outcome::OptionB, 55, 5, Side::Ask);
        let bid_a = place(&mut book, x, Outcome::OptionA, 40, 5, Side::Bid);
        let fills = match_order(&mut book, bid_a);

        assert_eq!(fills.len(), 1);
        let fill = &fills[0];
        assert_eq!(fill.kind, FillKind::CrossOutcome);
        // Taker bid pays its own price; no residue in its lock.
        assert_eq!(fill.execution_price, price(40));
        assert_eq!(fill.share_outcome, Outcome::OptionB);
        assert_eq!(fill.buyer, x);
    }

    #[test]
    fn test_cross_match_respects_payout_cap() {
        let mut book = book();
        let x = TraderId::new();
        let y = TraderId::new();

        // 65 > 100 - 40: incompatible.
        place(&mut book, y, Outcome::OptionB, 65, 5, Side::Ask);
        let bid_a = place(&mut book, x, Outcome::OptionA, 40, 5, Side::Bid);
        let fills = match_order(&mut book, bid_a);

        assert!(fills.is_empty());
        assert!(book.is_active(bid_a));
    }

    #[test]
    fn test_same_outcome_phase_runs_first() {
        let mut book = book();
        let buyer = TraderId::new();
        let same_seller = TraderId::new();
        let cross_seller = TraderId::new();

        // A cross-compatible B-ask at 10 would be a cheaper counterparty,
        // but phase 1 exhausts same-outcome liquidity first.
        place(&mut book, cross_seller, Outcome::OptionB, 10, 5, Side::Ask);
        let same_ask = place(&mut book, same_seller, Outcome::OptionA, 38, 5, Side::Ask);
        let bid = place(&mut book, buyer, Outcome::OptionA, 40, 5, Side::Bid);
        let fills = match_order(&mut book, bid);

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].kind, FillKind::SameOutcome);
        assert_eq!(fills[0].maker_order_id, same_ask);
    }

    #[test]
    fn test_own_orders_are_skipped() {
        let mut book = book();
        let trader = TraderId::new();

        let own_ask = place(&mut book, trader, Outcome::OptionA, 35, 5, Side::Ask);
        let own_bid = place(&mut book, trader, Outcome::OptionA, 40, 5, Side::Bid);
        let fills = match_order(&mut book, own_bid);

        assert!(fills.is_empty());
        assert!(book.is_active(own_ask));
        assert!(book.is_active(own_bid));
    }

    #[test]
    fn test_cross_phase_skips_too_expensive_bids() {
        let mut book = book();
        let x = TraderId::new();
        let y = TraderId::new();
        let z = TraderId::new();

        // Taker asks B at 55. Bids on A: 50 fails the cap (50 + 55 > 100),
        // 40 passes; the scan must pass over the better-priced bid.
        let high_bid = place(&mut book, x, Outcome::OptionA, 50, 5, Side::Bid);
        let low_bid = place(&mut book, z, Outcome::OptionA, 40, 5, Side::Bid);
        let ask_b = place(&mut book, y, Outcome::OptionB, 55, 5, Side::Ask);
        let fills = match_order(&mut book, ask_b);

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].maker_order_id, low_bid);
        assert_eq!(fills[0].execution_price, price(40));
        assert!(book.is_active(high_bid));
    }
}
