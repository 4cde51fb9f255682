//! Order State Machine Service
//!
//! Validates state transitions according to FIX protocol.

use crate::domain::order_lifecycle::errors::OrderError;
use crate::domain::order_lifecycle::value_objects::OrderStatus;

/// Order State Machine for validating transitions.
///
/// The counterparty has authority over any non-terminal order, so reject
/// and expire are reachable from every working state. Terminal states
/// accept no transitions at all.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            // From PendingNew: ack, or counterparty acting before we saw the ack
            (OrderStatus::PendingNew, OrderStatus::New)
                | (OrderStatus::PendingNew, OrderStatus::PartiallyFilled)
                | (OrderStatus::PendingNew, OrderStatus::Filled)
                | (OrderStatus::PendingNew, OrderStatus::PendingCancel)
                | (OrderStatus::PendingNew, OrderStatus::Canceled)
                | (OrderStatus::PendingNew, OrderStatus::Rejected)
                | (OrderStatus::PendingNew, OrderStatus::Expired)
                // From New
                | (OrderStatus::New, OrderStatus::PartiallyFilled)
                | (OrderStatus::New, OrderStatus::Filled)
                | (OrderStatus::New, OrderStatus::PendingCancel)
                | (OrderStatus::New, OrderStatus::Canceled)
                | (OrderStatus::New, OrderStatus::Rejected)
                | (OrderStatus::New, OrderStatus::Expired)
                // From PartiallyFilled (self-loop: each additional fill)
                | (OrderStatus::PartiallyFilled, OrderStatus::PartiallyFilled)
                | (OrderStatus::PartiallyFilled, OrderStatus::Filled)
                | (OrderStatus::PartiallyFilled, OrderStatus::PendingCancel)
                | (OrderStatus::PartiallyFilled, OrderStatus::Canceled)
                | (OrderStatus::PartiallyFilled, OrderStatus::Rejected)
                | (OrderStatus::PartiallyFilled, OrderStatus::Expired)
                // From PendingCancel: confirm, keep filling, or revert on reject
                | (OrderStatus::PendingCancel, OrderStatus::Canceled)
                | (OrderStatus::PendingCancel, OrderStatus::PartiallyFilled)
                | (OrderStatus::PendingCancel, OrderStatus::Filled)
                | (OrderStatus::PendingCancel, OrderStatus::PendingNew)
                | (OrderStatus::PendingCancel, OrderStatus::New)
                | (OrderStatus::PendingCancel, OrderStatus::Rejected)
                | (OrderStatus::PendingCancel, OrderStatus::Expired)
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(OrderError::InvalidStateTransition {
                from,
                to,
                reason: Self::transition_error_reason(from, to),
            })
        }
    }

    /// Get a human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        match from {
            OrderStatus::Filled => format!("Order is already filled, cannot transition to {to}"),
            OrderStatus::Canceled => format!("Order is canceled, cannot transition to {to}"),
            OrderStatus::Rejected => format!("Order was rejected, cannot transition to {to}"),
            OrderStatus::Expired => format!("Order has expired, cannot transition to {to}"),
            _ => format!("Invalid transition from {from} to {to}"),
        }
    }

    /// Get all valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        match from {
            OrderStatus::PendingNew => vec![
                OrderStatus::New,
                OrderStatus::PartiallyFilled,
                OrderStatus::Filled,
                OrderStatus::PendingCancel,
                OrderStatus::Canceled,
                OrderStatus::Rejected,
                OrderStatus::Expired,
            ],
            OrderStatus::New => vec![
                OrderStatus::PartiallyFilled,
                OrderStatus::Filled,
                OrderStatus::PendingCancel,
                OrderStatus::Canceled,
                OrderStatus::Rejected,
                OrderStatus::Expired,
            ],
            OrderStatus::PartiallyFilled => vec![
                OrderStatus::PartiallyFilled,
                OrderStatus::Filled,
                OrderStatus::PendingCancel,
                OrderStatus::Canceled,
                OrderStatus::Rejected,
                OrderStatus::Expired,
            ],
            OrderStatus::PendingCancel => vec![
                OrderStatus::Canceled,
                OrderStatus::PartiallyFilled,
                OrderStatus::Filled,
                OrderStatus::PendingNew,
                OrderStatus::New,
                OrderStatus::Rejected,
                OrderStatus::Expired,
            ],
            // Terminal states
            OrderStatus::Filled
            | OrderStatus::Canceled
            | OrderStatus::Rejected
            | OrderStatus::Expired => vec![],
        }
    }
}
