//! Reasons for order rejection and cancellation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason an order was rejected by the counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RejectReason {
    /// Rejection code from the counterparty.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl RejectReason {
    /// Create a new reject reason.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Counterparty gave no reason.
    #[must_use]
    pub fn unspecified() -> Self {
        Self::new("UNSPECIFIED", "Rejected without a stated reason")
    }

    /// Generic counterparty error.
    #[must_use]
    pub fn counterparty_error(message: impl Into<String>) -> Self {
        Self::new("COUNTERPARTY_ERROR", message)
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Reason an order was canceled or expired.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CancelReason {
    /// Cancellation code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl CancelReason {
    /// Create a new cancel reason.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// User requested cancellation.
    #[must_use]
    pub fn user_requested() -> Self {
        Self::new("USER_REQUESTED", "Canceled by user request")
    }

    /// Canceled by the counterparty without a local request.
    #[must_use]
    pub fn counterparty_initiated() -> Self {
        Self::new("COUNTERPARTY_INITIATED", "Canceled by the counterparty")
    }

    /// Time-in-force expiry at session close.
    #[must_use]
    pub fn expired() -> Self {
        Self::new("EXPIRED", "Order expired at end of session")
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_reason_new() {
        let reason = RejectReason::new("TOO_LATE", "Too late to enter");
        assert_eq!(reason.code, "TOO_LATE");
        assert_eq!(reason.message, "Too late to enter");
    }

    #[test]
    fn reject_reason_unspecified() {
        let reason = RejectReason::unspecified();
        assert_eq!(reason.code, "UNSPECIFIED");
    }

    #[test]
    fn reject_reason_display() {
        let reason = RejectReason::counterparty_error("unknown account");
        let display = format!("{reason}");
        assert!(display.contains("COUNTERPARTY_ERROR"));
        assert!(display.contains("unknown account"));
    }

    #[test]
    fn cancel_reason_user_requested() {
        let reason = CancelReason::user_requested();
        assert_eq!(reason.code, "USER_REQUESTED");
    }

    #[test]
    fn cancel_reason_expired() {
        let reason = CancelReason::expired();
        assert_eq!(reason.code, "EXPIRED");
    }

    #[test]
    fn cancel_reason_display() {
        let reason = CancelReason::counterparty_initiated();
        let display = format!("{reason}");
        assert!(display.contains("COUNTERPARTY_INITIATED"));
    }

    #[test]
    fn reject_reason_serde() {
        let reason = RejectReason::unspecified();
        let json = serde_json::to_string(&reason).unwrap();
        let parsed: RejectReason = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reason);
    }

    #[test]
    fn cancel_reason_serde() {
        let reason = CancelReason::user_requested();
        let json = serde_json::to_string(&reason).unwrap();
        let parsed: CancelReason = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reason);
    }
}
