//! Crossing detection logic
//!
//! Price-compatibility predicates for both matching phases.

use types::numeric::{Price, PAYOUT_TICKS};

/// Same-outcome crossing: a bid and an ask on the same outcome can trade
/// when the bid pays at least what the ask demands.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    ask_price <= bid_price
}

/// Cross-outcome compatibility: orders on complementary outcomes can trade
/// when their prices sum to at most the full payout. A bid on one outcome at
/// `p` is economically an ask on the complement at `100 - p`, so a resting
/// counter-order at `q` is acceptable exactly when `p + q <= 100`.
pub fn cross_compatible(price: Price, counter_price: Price) -> bool {
    price.ticks() + counter_price.ticks() <= PAYOUT_TICKS
}
