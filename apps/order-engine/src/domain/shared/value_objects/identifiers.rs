//! Strongly-typed identifiers for domain entities.
//!
//! These prevent mixing up IDs from different contexts, in particular the
//! locally-assigned client order id and the counterparty-assigned order id.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(
    ClientOrderId,
    "Locally-assigned order identifier (FIX ClOrdID). Immutable, never reused."
);
define_id!(
    CounterpartyOrderId,
    "Counterparty-assigned order identifier (FIX OrderID). Bound on acknowledgment."
);
define_id!(
    ExecutionId,
    "Counterparty-assigned execution identifier (FIX ExecID). Dedup key for fills."
);
define_id!(
    CancelRequestId,
    "Identifier for an in-flight cancel request (FIX ClOrdID of the cancel)."
);
