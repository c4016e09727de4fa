//! The market aggregate
//!
//! A `Market` owns the collateral vault, the two outcome share ledgers, the
//! settlement pool, and the active flag gating order placement. The vault is
//! the single custody point for locked bid collateral and unclaimed
//! settlement: `vault == Σ active bid locks + Σ settlement pool` at all
//! times.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use types::errors::MarketError;
use types::ids::{MarketId, TraderId};
use types::outcome::Outcome;

use crate::balance::UserBalance;
use crate::ledger::ShareLedger;

/// When a matched maker gets paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementMode {
    /// Sellers are paid from the vault inside the matching operation.
    Immediate,
    /// Payouts accrue in the settlement pool until explicitly claimed.
    Deferred,
}

/// One binary-outcome market and everything it custodies.
#[derive(Debug)]
pub struct Market {
    market_id: MarketId,
    question: String,
    outcome_names: [String; 2],
    vault: u64,
    shares: [ShareLedger; 2],
    settlement_pool: HashMap<TraderId, u64>,
    settlement_mode: SettlementMode,
    is_active: bool,
}

impl Market {
    /// Create an active market with immediate settlement.
    pub fn new(
        market_id: MarketId,
        question: impl Into<String>,
        option_a_name: impl Into<String>,
        option_b_name: impl Into<String>,
    ) -> Self {
        Self::with_mode(
            market_id,
            question,
            option_a_name,
            option_b_name,
            SettlementMode::Immediate,
        )
    }

    /// Create an active market with an explicit settlement mode.
    pub fn with_mode(
        market_id: MarketId,
        question: impl Into<String>,
        option_a_name: impl Into<String>,
        option_b_name: impl Into<String>,
        settlement_mode: SettlementMode,
    ) -> Self {
        Self {
            market_id,
            question: question.into(),
            outcome_names: [option_a_name.into(), option_b_name.into()],
            vault: 0,
            shares: [ShareLedger::new(), ShareLedger::new()],
            settlement_pool: HashMap::new(),
            settlement_mode,
            is_active: true,
        }
    }

    pub fn market_id(&self) -> MarketId {
        self.market_id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn outcome_name(&self, outcome: Outcome) -> &str {
        &self.outcome_names[outcome.index()]
    }

    pub fn settlement_mode(&self) -> SettlementMode {
        self.settlement_mode
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Gate new order placement.
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Current vault holdings (locked collateral + unclaimed settlement).
    pub fn vault(&self) -> u64 {
        self.vault
    }

    // ───────────────────────── Collateral ─────────────────────────

    /// Move a bid's collateral from the trader's balance into the vault.
    ///
    /// Fails with `InsufficientFunds` before any state changes.
    pub fn lock_collateral(
        &mut self,
        balance: &mut UserBalance,
        amount: u64,
    ) -> Result<(), MarketError> {
        let new_vault = self.vault.checked_add(amount).ok_or(MarketError::Overflow)?;
        balance.debit(amount)?;
        self.vault = new_vault;
        Ok(())
    }

    /// Return unfilled locked collateral to its owner (cancellation).
    pub fn refund(&mut self, balance: &mut UserBalance, amount: u64) -> Result<(), MarketError> {
        self.vault_debit(amount)?;
        balance.credit(amount)?;
        Ok(())
    }

    /// Draw from the vault. Underflow here means the locking invariant was
    /// already broken, so the error signals a defect rather than a user
    /// mistake.
    pub fn vault_debit(&mut self, amount: u64) -> Result<(), MarketError> {
        if amount > self.vault {
            return Err(MarketError::InsufficientSettlementFunds {
                required: amount,
                available: self.vault,
            });
        }
        self.vault -= amount;
        Ok(())
    }

    // ───────────────────────── Shares ─────────────────────────

    pub fn ledger(&self, outcome: Outcome) -> &ShareLedger {
        &self.shares[outcome.index()]
    }

    pub fn ledger_mut(&mut self, outcome: Outcome) -> &mut ShareLedger {
        &mut self.shares[outcome.index()]
    }

    /// Grant shares into a trader's available bucket (host bootstrap mint).
    pub fn credit_shares(
        &mut self,
        trader: TraderId,
        outcome: Outcome,
        quantity: u64,
    ) -> Result<(), MarketError> {
        self.ledger_mut(outcome).credit(trader, quantity)
    }

    /// A trader's total holdings in both outcomes.
    pub fn position(&self, trader: &TraderId) -> (u64, u64) {
        (
            self.ledger(Outcome::OptionA).position(trader),
            self.ledger(Outcome::OptionB).position(trader),
        )
    }

    // ───────────────────────── Settlement pool ─────────────────────────

    /// Accrue a deferred payout; the backing funds stay in the vault.
    pub fn defer_payout(&mut self, trader: TraderId, amount: u64) -> Result<(), MarketError> {
        let entry = self.settlement_pool.entry(trader).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(MarketError::Overflow)?;
        Ok(())
    }

    /// Unclaimed settlement accrued for a trader.
    pub fn pool_amount(&self, trader: &TraderId) -> u64 {
        self.settlement_pool.get(trader).copied().unwrap_or(0)
    }

    /// Sum of all unclaimed settlement.
    pub fn pool_total(&self) -> u64 {
        self.settlement_pool.values().sum()
    }

    /// Pull the caller's accrued settlement out of the vault.
    pub fn claim_settlement(&mut self, balance: &mut UserBalance) -> Result<u64, MarketError> {
        let amount = self
            .settlement_pool
            .get(&balance.trader)
            .copied()
            .filter(|amount| *amount > 0)
            .ok_or(MarketError::NothingToClaim)?;
        self.vault_debit(amount)?;
        self.settlement_pool.remove(&balance.trader);
        balance.credit(amount)?;
        Ok(amount)
    }
}
