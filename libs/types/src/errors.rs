//! Error taxonomy for the market core
//!
//! Every failure is a local, synchronous validation error surfaced before
//! any state mutation. There is no retry machinery: invariant violations are
//! defects and panic instead of appearing here.

use thiserror::Error;

/// The single error taxonomy shared by all market operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("Invalid price: {ticks} is outside 1..=99")]
    InvalidPrice { ticks: u64 },

    #[error("Invalid quantity: {shares} (must be positive)")]
    InvalidQuantity { shares: u64 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Invalid outcome encoding: {raw} (expected 0 or 1)")]
    InvalidOutcome { raw: u8 },

    #[error("Invalid side encoding: {raw} (expected 0 or 1)")]
    InvalidSide { raw: u8 },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Insufficient shares: required {required}, available {available}")]
    InsufficientShares { required: u64, available: u64 },

    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: u64 },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Market is not accepting orders")]
    MarketInactive,

    #[error("Market not found")]
    MarketNotFound,

    #[error("No balance exists for this trader in this market")]
    BalanceNotFound,

    #[error("A balance already exists for this trader in this market")]
    BalanceAlreadyExists,

    #[error("Settlement vault underflow: required {required}, available {available}")]
    InsufficientSettlementFunds { required: u64, available: u64 },

    #[error("No settlement to claim")]
    NothingToClaim,

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}
