//! Domain events for the order lifecycle.
//!
//! Events capture state transitions and feed the notification bus and the
//! position projector.

use serde::{Deserialize, Serialize};

use super::value_objects::{CancelReason, OrderSide, RejectReason};
use crate::domain::shared::{
    CancelRequestId, ClientOrderId, CounterpartyOrderId, Price, Quantity, Symbol, Timestamp,
};

/// All possible order events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEvent {
    /// Order recorded locally and forwarded (or queued) to the counterparty.
    Submitted(OrderSubmitted),
    /// Order acknowledged by the counterparty.
    Acknowledged(OrderAcknowledged),
    /// Order partially filled.
    PartiallyFilled(OrderPartiallyFilled),
    /// Order completely filled.
    Filled(OrderFilled),
    /// Cancel request sent to the counterparty.
    CancelRequested(OrderCancelRequested),
    /// Order canceled.
    Canceled(OrderCanceled),
    /// Cancel request rejected, order restored to its prior status.
    CancelRejected(OrderCancelRejected),
    /// Order rejected by the counterparty.
    Rejected(OrderRejected),
    /// Order expired at the counterparty.
    Expired(OrderExpired),
}

impl OrderEvent {
    /// Get the client order ID for this event.
    #[must_use]
    pub fn client_order_id(&self) -> &ClientOrderId {
        match self {
            Self::Submitted(e) => &e.client_order_id,
            Self::Acknowledged(e) => &e.client_order_id,
            Self::PartiallyFilled(e) => &e.client_order_id,
            Self::Filled(e) => &e.client_order_id,
            Self::CancelRequested(e) => &e.client_order_id,
            Self::Canceled(e) => &e.client_order_id,
            Self::CancelRejected(e) => &e.client_order_id,
            Self::Rejected(e) => &e.client_order_id,
            Self::Expired(e) => &e.client_order_id,
        }
    }

    /// Get the timestamp when this event occurred.
    #[must_use]
    pub fn occurred_at(&self) -> Timestamp {
        match self {
            Self::Submitted(e) => e.occurred_at,
            Self::Acknowledged(e) => e.occurred_at,
            Self::PartiallyFilled(e) => e.occurred_at,
            Self::Filled(e) => e.occurred_at,
            Self::CancelRequested(e) => e.occurred_at,
            Self::Canceled(e) => e.occurred_at,
            Self::CancelRejected(e) => e.occurred_at,
            Self::Rejected(e) => e.occurred_at,
            Self::Expired(e) => e.occurred_at,
        }
    }

    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Submitted(_) => "ORDER_SUBMITTED",
            Self::Acknowledged(_) => "ORDER_ACKNOWLEDGED",
            Self::PartiallyFilled(_) => "ORDER_PARTIALLY_FILLED",
            Self::Filled(_) => "ORDER_FILLED",
            Self::CancelRequested(_) => "ORDER_CANCEL_REQUESTED",
            Self::Canceled(_) => "ORDER_CANCELED",
            Self::CancelRejected(_) => "ORDER_CANCEL_REJECTED",
            Self::Rejected(_) => "ORDER_REJECTED",
            Self::Expired(_) => "ORDER_EXPIRED",
        }
    }
}

/// Event: Order recorded locally and submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmitted {
    /// Client order ID.
    pub client_order_id: ClientOrderId,
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Quantity.
    pub quantity: Quantity,
    /// Limit price (if applicable).
    pub limit_price: Option<Price>,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Order acknowledged by the counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAcknowledged {
    /// Client order ID.
    pub client_order_id: ClientOrderId,
    /// Counterparty's order ID.
    pub counterparty_order_id: CounterpartyOrderId,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Order partially filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPartiallyFilled {
    /// Client order ID.
    pub client_order_id: ClientOrderId,
    /// Fill quantity for this execution.
    pub fill_quantity: Quantity,
    /// Fill price for this execution.
    pub fill_price: Price,
    /// Cumulative quantity filled.
    pub cumulative_quantity: Quantity,
    /// Remaining quantity to fill.
    pub leaves_quantity: Quantity,
    /// Volume-weighted average price.
    pub vwap: Price,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Order completely filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilled {
    /// Client order ID.
    pub client_order_id: ClientOrderId,
    /// Total quantity filled.
    pub total_quantity: Quantity,
    /// Average fill price (VWAP).
    pub average_price: Price,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Cancel request sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelRequested {
    /// Client order ID.
    pub client_order_id: ClientOrderId,
    /// Id of the cancel request.
    pub cancel_request_id: CancelRequestId,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Order canceled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCanceled {
    /// Client order ID.
    pub client_order_id: ClientOrderId,
    /// Reason for cancellation.
    pub reason: CancelReason,
    /// Quantity that was filled before cancellation.
    pub filled_quantity: Quantity,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Cancel request rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelRejected {
    /// Client order ID.
    pub client_order_id: ClientOrderId,
    /// Status the order was restored to.
    pub restored_status: super::value_objects::OrderStatus,
    /// Reason given by the counterparty.
    pub reason: String,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Order rejected by the counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRejected {
    /// Client order ID.
    pub client_order_id: ClientOrderId,
    /// Reason for rejection.
    pub reason: RejectReason,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Order expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderExpired {
    /// Client order ID.
    pub client_order_id: ClientOrderId,
    /// Quantity that was filled before expiry.
    pub filled_quantity: Quantity,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}
