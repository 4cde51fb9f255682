//! Fill state tracking with FIX protocol semantics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Execution;
use crate::domain::shared::{DomainError, ExecutionId, Price, Quantity, Timestamp};

/// Outcome of applying an execution to the fill state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillApplication {
    /// The execution was new and has been applied.
    Applied,
    /// The execution id was already recorded; state is unchanged.
    Duplicate,
}

/// FIX protocol-compliant fill state.
///
/// Implements the fundamental FIX rule: `OrderQty` = `CumQty` + `LeavesQty`
/// - `OrderQty`: Original requested quantity
/// - `CumQty`: Cumulative quantity filled across all distinct executions
/// - `LeavesQty`: Remaining quantity open for execution
/// - `AvgPx`: Volume-weighted average fill price
///
/// `CumQty` and `AvgPx` are always derived from the execution list, never
/// mutated independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillState {
    order_qty: Quantity,
    cum_qty: Quantity,
    leaves_qty: Quantity,
    avg_px: Price,
    executions: Vec<Execution>,
    last_fill_at: Option<Timestamp>,
}

impl FillState {
    /// Create a new fill state for an order.
    #[must_use]
    pub const fn new(order_qty: Quantity) -> Self {
        Self {
            order_qty,
            cum_qty: Quantity::ZERO,
            leaves_qty: order_qty,
            avg_px: Price::ZERO,
            executions: Vec::new(),
            last_fill_at: None,
        }
    }

    /// Get the original order quantity (FIX tag 38: `OrderQty`).
    #[must_use]
    pub fn order_qty(&self) -> Quantity {
        self.order_qty
    }

    /// Get the cumulative filled quantity (FIX tag 14: `CumQty`).
    #[must_use]
    pub fn cum_qty(&self) -> Quantity {
        self.cum_qty
    }

    /// Get the remaining quantity to fill (FIX tag 151: `LeavesQty`).
    #[must_use]
    pub fn leaves_qty(&self) -> Quantity {
        self.leaves_qty
    }

    /// Get the volume-weighted average fill price (FIX tag 6: `AvgPx`).
    #[must_use]
    pub fn avg_px(&self) -> Price {
        self.avg_px
    }

    /// Get the list of distinct executions, in arrival order.
    #[must_use]
    pub fn executions(&self) -> &[Execution] {
        &self.executions
    }

    /// Get the timestamp of the last fill.
    #[must_use]
    pub fn last_fill_at(&self) -> Option<Timestamp> {
        self.last_fill_at
    }

    /// Returns true if an execution with this id has already been applied.
    #[must_use]
    pub fn contains_execution(&self, execution_id: &ExecutionId) -> bool {
        self.executions
            .iter()
            .any(|e| &e.execution_id == execution_id)
    }

    /// Apply an execution to this state.
    ///
    /// A duplicate execution id is a no-op (`FillApplication::Duplicate`):
    /// the transport is at-least-once, so redelivery is expected, not an
    /// error. New executions update `CumQty`, `LeavesQty`, and `AvgPx`.
    ///
    /// # Errors
    ///
    /// Returns error if the fill would push `CumQty` past `OrderQty`.
    pub fn apply_execution(&mut self, execution: Execution) -> Result<FillApplication, DomainError> {
        if self.contains_execution(&execution.execution_id) {
            return Ok(FillApplication::Duplicate);
        }

        let fill_qty = execution.quantity;
        if fill_qty > self.leaves_qty {
            return Err(DomainError::InvariantViolation {
                aggregate: "FillState".to_string(),
                invariant: "FillQty <= LeavesQty".to_string(),
                state: format!(
                    "exec_id={}, fill_qty={}, leaves_qty={}",
                    execution.execution_id,
                    fill_qty.amount(),
                    self.leaves_qty.amount()
                ),
            });
        }

        // VWAP: new_avg = (old_avg * old_cum + fill_price * fill_qty) / new_cum
        let new_cum_qty = self.cum_qty + fill_qty;
        if new_cum_qty.amount() > Decimal::ZERO {
            let old_value = self.avg_px.amount() * self.cum_qty.amount();
            let fill_value = execution.price.amount() * fill_qty.amount();
            self.avg_px = Price::new((old_value + fill_value) / new_cum_qty.amount());
        }

        self.cum_qty = new_cum_qty;
        self.leaves_qty = Quantity::new(self.order_qty.amount() - self.cum_qty.amount());
        self.last_fill_at = Some(execution.timestamp);
        self.executions.push(execution);

        debug_assert!(self.verify_fix_invariant());

        Ok(FillApplication::Applied)
    }

    /// Check if the order is completely filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.leaves_qty.amount() <= Decimal::ZERO
    }

    /// Check if the order has fills but is not complete.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.cum_qty.amount() > Decimal::ZERO && self.leaves_qty.amount() > Decimal::ZERO
    }

    /// Verify FIX protocol invariant: `OrderQty` = `CumQty` + `LeavesQty`.
    #[must_use]
    pub fn verify_fix_invariant(&self) -> bool {
        self.order_qty.amount() == self.cum_qty.amount() + self.leaves_qty.amount()
    }

    /// Calculate total notional value filled.
    #[must_use]
    pub fn filled_notional(&self) -> Decimal {
        self.executions.iter().map(|e| e.notional()).sum()
    }
}
