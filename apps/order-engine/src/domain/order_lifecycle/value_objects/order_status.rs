//! Order status in the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status following FIX protocol semantics.
///
/// FIX Protocol Order Status (Tag 39):
/// - `0` = New
/// - `1` = Partially filled
/// - `2` = Filled
/// - `4` = Canceled
/// - `6` = Pending Cancel
/// - `8` = Rejected
/// - `A` = Pending New
/// - `C` = Expired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order recorded locally, awaiting counterparty acknowledgment.
    PendingNew,
    /// Order acknowledged by the counterparty, no fills yet.
    New,
    /// Order partially filled.
    PartiallyFilled,
    /// Order completely filled.
    Filled,
    /// Cancel request sent, awaiting confirmation or reject.
    PendingCancel,
    /// Order canceled.
    Canceled,
    /// Order rejected by the counterparty.
    Rejected,
    /// Order expired (e.g., Day order at session close).
    Expired,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Filled | Self::Canceled | Self::Rejected | Self::Expired
        )
    }

    /// Returns true if the order is still working at the counterparty.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if a cancel request may be issued from this state.
    #[must_use]
    pub const fn is_cancelable(&self) -> bool {
        matches!(self, Self::PendingNew | Self::New | Self::PartiallyFilled)
    }

    /// Returns true if the order can receive fills.
    ///
    /// Fills can race an in-flight cancel, so `PendingCancel` still fills.
    /// A fill before the acknowledgment acts as an implicit ack.
    #[must_use]
    pub const fn can_fill(&self) -> bool {
        matches!(
            self,
            Self::PendingNew | Self::New | Self::PartiallyFilled | Self::PendingCancel
        )
    }

    /// Returns true if this is a pending state.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::PendingNew | Self::PendingCancel)
    }

    /// Get the FIX protocol tag 39 value.
    #[must_use]
    pub const fn fix_tag_value(&self) -> char {
        match self {
            Self::New => '0',
            Self::PartiallyFilled => '1',
            Self::Filled => '2',
            Self::Canceled => '4',
            Self::PendingCancel => '6',
            Self::Rejected => '8',
            Self::PendingNew => 'A',
            Self::Expired => 'C',
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PendingNew => write!(f, "PENDING_NEW"),
            Self::New => write!(f, "NEW"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::PendingCancel => write!(f, "PENDING_CANCEL"),
            Self::Canceled => write!(f, "CANCELED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}
