//! Order type (market, limit, stop).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Market order, executes at the current market price.
    Market,
    /// Limit order, executes at the limit price or better.
    Limit,
    /// Stop order, becomes a market order when the stop price trades.
    Stop,
    /// Stop-limit order, becomes a limit order when the stop price trades.
    StopLimit,
}

impl OrderType {
    /// Returns true if this order type requires a limit price.
    #[must_use]
    pub const fn requires_limit_price(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::Stop => write!(f, "STOP"),
            Self::StopLimit => write!(f, "STOP_LIMIT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_type_requires_limit_price() {
        assert!(!OrderType::Market.requires_limit_price());
        assert!(OrderType::Limit.requires_limit_price());
        assert!(!OrderType::Stop.requires_limit_price());
        assert!(OrderType::StopLimit.requires_limit_price());
    }

    #[test]
    fn order_type_display() {
        assert_eq!(format!("{}", OrderType::Market), "MARKET");
        assert_eq!(format!("{}", OrderType::StopLimit), "STOP_LIMIT");
    }

    #[test]
    fn order_type_serde() {
        let json = serde_json::to_string(&OrderType::Limit).unwrap();
        assert_eq!(json, "\"LIMIT\"");

        let parsed: OrderType = serde_json::from_str("\"MARKET\"").unwrap();
        assert_eq!(parsed, OrderType::Market);
    }
}
