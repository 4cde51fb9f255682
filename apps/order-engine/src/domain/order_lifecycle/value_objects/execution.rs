//! Individual executions (fills) reported by the counterparty.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{ExecutionId, Price, Quantity, Timestamp};

/// A single fill against an order.
///
/// The execution id is assigned by the counterparty and is the dedup key:
/// the transport is at-least-once, so the same execution may be reported
/// more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    /// Counterparty-assigned execution identifier (FIX tag 17: `ExecID`).
    pub execution_id: ExecutionId,
    /// Quantity filled in this execution (FIX tag 32: `LastQty`).
    pub quantity: Quantity,
    /// Price at which this fill occurred (FIX tag 31: `LastPx`).
    pub price: Price,
    /// Timestamp of the fill.
    pub timestamp: Timestamp,
}

impl Execution {
    /// Create a new execution.
    #[must_use]
    pub fn new(
        execution_id: impl Into<ExecutionId>,
        quantity: Quantity,
        price: Price,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            quantity,
            price,
            timestamp,
        }
    }

    /// Calculate the notional value of this fill.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.price.amount() * self.quantity.amount()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_execution() -> Execution {
        Execution::new(
            "exec-123",
            Quantity::from_i64(100),
            Price::from_cents(15000),
            Timestamp::now(),
        )
    }

    #[test]
    fn execution_new() {
        let exec = make_execution();
        assert_eq!(exec.execution_id.as_str(), "exec-123");
        assert_eq!(exec.quantity, Quantity::from_i64(100));
        assert_eq!(exec.price, Price::from_cents(15000));
    }

    #[test]
    fn execution_notional() {
        let exec = make_execution();
        // 100 shares * $150.00 = $15,000
        assert_eq!(exec.notional(), Decimal::new(15000, 0));
    }

    #[test]
    fn execution_serde() {
        let exec = make_execution();
        let json = serde_json::to_string(&exec).unwrap();
        let parsed: Execution = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, exec);
    }
}
