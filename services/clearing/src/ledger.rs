//! Per-outcome share ledger with ask-side reservation
//!
//! Shares backing an open ask are moved from `available` to `reserved` at
//! placement, symmetric with bid collateral locking, so a trader cannot
//! commit the same shares to two asks. A reading of a trader's position is
//! always `available + reserved` — reservation changes commitment, not
//! ownership.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use types::errors::MarketError;
use types::ids::TraderId;

/// One trader's holding in one outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareHolding {
    /// Freely usable shares
    pub available: u64,
    /// Shares committed to open asks
    pub reserved: u64,
}

impl ShareHolding {
    /// Total shares owned, regardless of commitment.
    pub fn total(&self) -> u64 {
        self.available + self.reserved
    }
}

/// Share holdings of every trader in one outcome. Absent traders read as
/// zero.
#[derive(Debug, Clone, Default)]
pub struct ShareLedger {
    holdings: HashMap<TraderId, ShareHolding>,
}

impl ShareLedger {
    pub fn new() -> Self {
        Self {
            holdings: HashMap::new(),
        }
    }

    /// Current holding; zero for unknown traders.
    pub fn get(&self, trader: &TraderId) -> ShareHolding {
        self.holdings.get(trader).copied().unwrap_or_default()
    }

    /// Total shares owned (available + reserved).
    pub fn position(&self, trader: &TraderId) -> u64 {
        self.get(trader).total()
    }

    /// Mint or grant shares into the trader's available bucket.
    pub fn credit(&mut self, trader: TraderId, quantity: u64) -> Result<(), MarketError> {
        let holding = self.holdings.entry(trader).or_default();
        holding.available = holding
            .available
            .checked_add(quantity)
            .ok_or(MarketError::Overflow)?;
        Ok(())
    }

    /// Commit available shares to an open ask.
    pub fn reserve(&mut self, trader: TraderId, quantity: u64) -> Result<(), MarketError> {
        let holding = self.holdings.entry(trader).or_default();
        if quantity > holding.available {
            return Err(MarketError::InsufficientShares {
                required: quantity,
                available: holding.available,
            });
        }
        holding.available -= quantity;
        holding.reserved += quantity;
        Ok(())
    }

    /// Return reserved shares to the available bucket (ask cancellation).
    ///
    /// # Panics
    /// Panics if the trader has fewer reserved shares than released — the
    /// reservation bookkeeping guarantees this never happens.
    pub fn release(&mut self, trader: TraderId, quantity: u64) {
        let holding = self.holdings.entry(trader).or_default();
        assert!(quantity <= holding.reserved, "reservation underflow");
        holding.reserved -= quantity;
        holding.available += quantity;
    }

    /// Move matched shares from the seller's reserved bucket to the buyer.
    ///
    /// Always paired with the corresponding payment in the same settlement
    /// step; the two must never be separated.
    pub fn transfer_reserved(
        &mut self,
        from: TraderId,
        to: TraderId,
        quantity: u64,
    ) -> Result<(), MarketError> {
        let seller = self.holdings.entry(from).or_default();
        if quantity > seller.reserved {
            return Err(MarketError::InsufficientShares {
                required: quantity,
                available: seller.reserved,
            });
        }
        seller.reserved -= quantity;
        let buyer = self.holdings.entry(to).or_default();
        buyer.available = buyer
            .available
            .checked_add(quantity)
            .ok_or(MarketError::Overflow)?;
        Ok(())
    }

    /// Total shares outstanding across all traders.
    pub fn total_outstanding(&self) -> u64 {
        self.holdings.values().map(|h| h.total()).sum()
    }
}
