//! Order lifecycle errors.

use std::fmt;

use super::value_objects::OrderStatus;

/// Errors that can occur in the order lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Reason for failure.
        reason: String,
    },

    /// Order cannot be canceled in current state.
    CannotCancel {
        /// Current status.
        status: OrderStatus,
    },

    /// Fill quantity exceeds remaining quantity.
    FillExceedsRemaining {
        /// Fill quantity attempted.
        fill_qty: String,
        /// Remaining quantity.
        remaining_qty: String,
    },

    /// Invalid order parameters.
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// Counterparty order id already bound to a different value.
    CounterpartyIdMismatch {
        /// Id already bound.
        bound: String,
        /// Conflicting id from the report.
        reported: String,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid order state transition: {from} -> {to}: {reason}"
                )
            }
            Self::CannotCancel { status } => {
                write!(f, "Cannot cancel order in status: {status}")
            }
            Self::FillExceedsRemaining {
                fill_qty,
                remaining_qty,
            } => {
                write!(
                    f,
                    "Fill quantity {fill_qty} exceeds remaining {remaining_qty}"
                )
            }
            Self::InvalidParameters { field, message } => {
                write!(f, "Invalid order parameter '{field}': {message}")
            }
            Self::CounterpartyIdMismatch { bound, reported } => {
                write!(
                    f,
                    "Counterparty order id already bound to {bound}, report carries {reported}"
                )
            }
        }
    }
}

impl std::error::Error for OrderError {}
