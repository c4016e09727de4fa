//! Tick-price and quantity types
//!
//! Prices are integer ticks of a 100-tick payout: a share of the winning
//! outcome redeems for 100 ticks at resolution, so every order price lives
//! in 1..=99 and the complementary price is `100 - price`. All arithmetic is
//! checked `u64`; there is no floating point anywhere in the engine.

use crate::errors::MarketError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Full payout of one winning share, in ticks.
pub const PAYOUT_TICKS: u64 = 100;

/// A limit price in ticks, guaranteed to be within 1..=99.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Validate and wrap a raw tick price.
    ///
    /// Rejects 0 and anything >= 100: both ends would let one side of a
    /// trade pay nothing or everything, which the complementary-price
    /// identity does not admit.
    pub fn try_new(ticks: u64) -> Result<Self, MarketError> {
        if ticks == 0 || ticks >= PAYOUT_TICKS {
            return Err(MarketError::InvalidPrice { ticks });
        }
        Ok(Self(ticks))
    }

    /// The economically equivalent price on the opposite outcome.
    ///
    /// `price + complement == 100` always holds; the result is itself a
    /// valid price because the input is.
    pub fn complement(self) -> Self {
        Self(PAYOUT_TICKS - self.0)
    }

    /// Raw tick value.
    pub fn ticks(self) -> u64 {
        self.0
    }

    /// Collateral cost of `quantity` shares at this price.
    pub fn cost(self, quantity: Quantity) -> Result<u64, MarketError> {
        self.0
            .checked_mul(quantity.get())
            .ok_or(MarketError::Overflow)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A share quantity, guaranteed to be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    /// Validate and wrap a raw share count.
    pub fn try_new(shares: u64) -> Result<Self, MarketError> {
        if shares == 0 {
            return Err(MarketError::InvalidQuantity { shares });
        }
        Ok(Self(shares))
    }

    /// Raw share count.
    pub fn get(self) -> u64 {
        self.0
    }

    /// The smaller of two quantities (used for match sizing).
    pub fn min(self, other: Quantity) -> Quantity {
        Quantity(self.0.min(other.0))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
