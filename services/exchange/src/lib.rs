//! Exchange Service
//!
//! The public operation surface of the prediction market core. Each market
//! lives in its own mutex-guarded shard (order book + vault + balances +
//! event log), reproducing the host runtime's guarantee that every call
//! against one book runs to completion with no interleaving.
//!
//! Control flow for placement: validate → lock collateral (bid) or reserve
//! shares (ask) → insert into the book → run the two-phase matcher → settle
//! each fill → emit events → return. All validation precedes all mutation,
//! so a failed call leaves no partial state.

pub mod events;
pub mod service;

pub use events::MarketEvent;
pub use service::Exchange;
