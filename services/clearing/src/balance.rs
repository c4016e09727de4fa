//! Per-trader, per-market balances
//!
//! A `UserBalance` holds a trader's uncommitted collateral for one market:
//! credited by deposits, refunds, and settlement; debited by order locks and
//! withdrawals. Locked value lives in the market vault, not here.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use types::errors::MarketError;
use types::ids::{MarketId, TraderId};

/// Uncommitted collateral of one trader in one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBalance {
    pub trader: TraderId,
    pub market_id: MarketId,
    balance: u64,
}

impl UserBalance {
    /// Create a zero balance.
    pub fn new(trader: TraderId, market_id: MarketId) -> Self {
        Self {
            trader,
            market_id,
            balance: 0,
        }
    }

    /// Current uncommitted funds.
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Credit funds (deposit, refund, settlement receipt).
    pub fn credit(&mut self, amount: u64) -> Result<(), MarketError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(MarketError::Overflow)?;
        Ok(())
    }

    /// Debit funds (order lock, withdrawal source).
    pub fn debit(&mut self, amount: u64) -> Result<(), MarketError> {
        if amount > self.balance {
            return Err(MarketError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }
}

/// All balances of one market, keyed by trader.
///
/// One balance per (trader, market); creating a second fails.
#[derive(Debug, Default)]
pub struct BalanceBook {
    balances: HashMap<TraderId, UserBalance>,
}

impl BalanceBook {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Create the trader's balance record for this market.
    pub fn create(&mut self, trader: TraderId, market_id: MarketId) -> Result<(), MarketError> {
        if self.balances.contains_key(&trader) {
            return Err(MarketError::BalanceAlreadyExists);
        }
        self.balances.insert(trader, UserBalance::new(trader, market_id));
        Ok(())
    }

    pub fn get(&self, trader: &TraderId) -> Result<&UserBalance, MarketError> {
        self.balances.get(trader).ok_or(MarketError::BalanceNotFound)
    }

    pub fn get_mut(&mut self, trader: &TraderId) -> Result<&mut UserBalance, MarketError> {
        self.balances
            .get_mut(trader)
            .ok_or(MarketError::BalanceNotFound)
    }

    /// Sum of all uncommitted balances (used by conservation checks).
    pub fn total(&self) -> u64 {
        self.balances.values().map(|b| b.balance).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_balance_is_zero() {
        let balance = UserBalance::new(TraderId::new(), MarketId::new());
        assert_eq!(balance.balance(), 0);
    }

    #[test]
    fn test_credit_and_debit() {
        let mut balance = UserBalance::new(TraderId::new(), MarketId::new());
        balance.credit(1000).unwrap();
        balance.debit(400).unwrap();
        assert_eq!(balance.balance(), 600);
    }

    #[test]
    fn test_debit_insufficient() {
        let mut balance = UserBalance::new(TraderId::new(), MarketId::new());
        balance.credit(100).unwrap();
        let err = balance.debit(250).unwrap_err();
        assert_eq!(
            err,
            MarketError::InsufficientFunds {
                required: 250,
                available: 100
            }
        );
        assert_eq!(balance.balance(), 100, "failed debit must not move funds");
    }

    #[test]
    fn test_credit_overflow() {
        let mut balance = UserBalance::new(TraderId::new(), MarketId::new());
        balance.credit(u64::MAX).unwrap();
        assert_eq!(balance.credit(1), Err(MarketError::Overflow));
        assert_eq!(balance.balance(), u64::MAX);
    }

    #[test]
    fn test_book_one_balance_per_trader() {
        let mut book = BalanceBook::new();
        let trader = TraderId::new();
        let market = MarketId::new();

        book.create(trader, market).unwrap();
        assert_eq!(book.create(trader, market), Err(MarketError::BalanceAlreadyExists));
    }

    #[test]
    fn test_book_unknown_trader() {
        let book = BalanceBook::new();
        assert!(matches!(
            book.get(&TraderId::new()),
            Err(MarketError::BalanceNotFound)
        ));
    }

    #[test]
    fn test_book_total() {
        let mut book = BalanceBook::new();
        let market = MarketId::new();
        let t1 = TraderId::new();
        let t2 = TraderId::new();
        book.create(t1, market).unwrap();
        book.create(t2, market).unwrap();
        book.get_mut(&t1).unwrap().credit(300).unwrap();
        book.get_mut(&t2).unwrap().credit(200).unwrap();
        assert_eq!(book.total(), 500);
    }
}
