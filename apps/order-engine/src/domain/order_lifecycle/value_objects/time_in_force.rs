//! Time-in-force for orders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time-in-force controlling how long an order stays working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Valid for the trading day, expires at session close.
    Day,
    /// Good 'til canceled.
    Gtc,
    /// Immediate or cancel: fill what is available, cancel the rest.
    Ioc,
    /// Fill or kill: fill completely or cancel entirely.
    Fok,
}

impl TimeInForce {
    /// Returns true if the order persists beyond the trading day.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Gtc)
    }

    /// Returns true if the order demands immediate execution.
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        matches!(self, Self::Ioc | Self::Fok)
    }
}

impl Default for TimeInForce {
    fn default() -> Self {
        Self::Day
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "DAY"),
            Self::Gtc => write!(f, "GTC"),
            Self::Ioc => write!(f, "IOC"),
            Self::Fok => write!(f, "FOK"),
        }
    }
}
