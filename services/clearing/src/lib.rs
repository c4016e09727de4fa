//! Collateral Custody & Settlement
//!
//! This crate owns everything that moves value: per-trader balances, the
//! per-market collateral vault, the two outcome share ledgers, and the
//! application of matcher fills (share transfer paired with payment).
//!
//! # Modules
//! - `balance`: per-(trader, market) uncommitted funds and the balance book
//! - `ledger`: per-outcome share holdings with ask-side reservation
//! - `market`: the market aggregate — vault, ledgers, settlement pool
//! - `settlement`: applying fills; immediate payout or pool accrual
//!
//! # Key invariant
//! `vault == Σ locked collateral of active bids + Σ settlement pool` after
//! every operation. Settlement never creates or destroys value; it only
//! moves it between balances, the vault, and the pool.

pub mod balance;
pub mod ledger;
pub mod market;
pub mod settlement;

pub use balance::{BalanceBook, UserBalance};
pub use ledger::{ShareHolding, ShareLedger};
pub use market::{Market, SettlementMode};
pub use settlement::{apply_fill, Settlement};
