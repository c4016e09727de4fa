//! Unique identifier types for market entities
//!
//! Trader and market identifiers use UUID v7 for time-sortable ordering.
//! Order identifiers are issued by the order book as a monotonically
//! increasing sequence, so they are a plain `u64` newtype.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an order
///
/// Issued by the order book: strictly monotonic per market, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Wrap a raw sequence value issued by the book
    pub fn from_sequence(seq: u64) -> Self {
        Self(seq)
    }

    /// Get the raw sequence value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a trader
///
/// Supplied by the host identity layer; UUID v7 keeps traders sortable by
/// registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraderId(Uuid);

impl TraderId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TraderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(Uuid);

impl MarketId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MarketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_ordering() {
        let id1 = OrderId::from_sequence(1);
        let id2 = OrderId::from_sequence(2);
        assert!(id1 < id2);
        assert_eq!(id1.as_u64(), 1);
    }

    #[test]
    fn test_order_id_serialization() {
        let id = OrderId::from_sequence(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let deserialized: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_trader_id_creation() {
        let id1 = TraderId::new();
        let id2 = TraderId::new();
        assert_ne!(id1, id2, "TraderIds should be unique");
    }

    #[test]
    fn test_trader_id_serialization() {
        let id = TraderId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: TraderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_market_id_creation() {
        let id1 = MarketId::new();
        let id2 = MarketId::new();
        assert_ne!(id1, id2);
    }
}
