//! FIX Session Port (Driven Port)
//!
//! Interface to the counterparty session. The wire codec and session
//! mechanics (logon, heartbeats, sequence recovery) live behind this
//! boundary; the engine only sees validated message types.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::domain::order_lifecycle::value_objects::{OrderSide, OrderType, TimeInForce};
use crate::domain::shared::{
    CancelRequestId, ClientOrderId, CounterpartyOrderId, ExecutionId, Symbol, Timestamp,
};

/// Outbound new-order message (FIX 35=D).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderRequest {
    /// Client order ID.
    pub client_order_id: ClientOrderId,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Quantity.
    pub quantity: Decimal,
    /// Limit price (for limit orders).
    pub limit_price: Option<Decimal>,
    /// Time in force.
    pub time_in_force: TimeInForce,
}

impl NewOrderRequest {
    /// Create a market order request.
    #[must_use]
    pub const fn market(
        client_order_id: ClientOrderId,
        symbol: Symbol,
        side: OrderSide,
        quantity: Decimal,
    ) -> Self {
        Self {
            client_order_id,
            symbol,
            side,
            order_type: OrderType::Market,
            quantity,
            limit_price: None,
            time_in_force: TimeInForce::Day,
        }
    }

    /// Create a limit order request.
    #[must_use]
    pub const fn limit(
        client_order_id: ClientOrderId,
        symbol: Symbol,
        side: OrderSide,
        quantity: Decimal,
        limit_price: Decimal,
    ) -> Self {
        Self {
            client_order_id,
            symbol,
            side,
            order_type: OrderType::Limit,
            quantity,
            limit_price: Some(limit_price),
            time_in_force: TimeInForce::Day,
        }
    }

    /// Set time in force.
    #[must_use]
    pub const fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }
}

/// Outbound order-cancel-request message (FIX 35=F).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    /// Id of this cancel request.
    pub cancel_request_id: CancelRequestId,
    /// Client order id of the order to cancel.
    pub client_order_id: ClientOrderId,
    /// Counterparty order id, when already bound.
    pub counterparty_order_id: Option<CounterpartyOrderId>,
}

/// Execution type discriminator (FIX tag 150).
///
/// A cancel confirmation arrives as an execution report with
/// `ExecType::Canceled`, not as a separate message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecType {
    /// Order acknowledged.
    New,
    /// A fill (partial or final).
    Trade,
    /// Cancel confirmed.
    Canceled,
    /// Order rejected.
    Rejected,
    /// Order expired.
    Expired,
}

/// Inbound execution report (FIX 35=8).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Client order id the report refers to, when echoed back.
    pub client_order_id: Option<ClientOrderId>,
    /// Counterparty-assigned order id.
    pub counterparty_order_id: Option<CounterpartyOrderId>,
    /// What this report conveys.
    pub exec_type: ExecType,
    /// Execution id; required for trades, the dedup key.
    pub execution_id: Option<ExecutionId>,
    /// Quantity of this fill (FIX tag 32).
    pub last_qty: Option<Decimal>,
    /// Price of this fill (FIX tag 31).
    pub last_px: Option<Decimal>,
    /// Free-form text, typically a reject reason.
    pub text: Option<String>,
    /// Counterparty transaction time.
    pub transact_time: Timestamp,
}

impl ExecutionReport {
    /// Validate the report before it reaches reconciliation logic.
    ///
    /// # Errors
    ///
    /// Returns error if the report carries no order identity, or a trade
    /// is missing its execution id, quantity, or price.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.client_order_id.is_none() && self.counterparty_order_id.is_none() {
            return Err(SessionError::InvalidMessage {
                message: "Execution report carries no order identity".to_string(),
            });
        }

        if self.exec_type == ExecType::Trade {
            if self.execution_id.is_none() {
                return Err(SessionError::InvalidMessage {
                    message: "Trade report missing execution id".to_string(),
                });
            }
            match self.last_qty {
                Some(qty) if qty > Decimal::ZERO => {}
                _ => {
                    return Err(SessionError::InvalidMessage {
                        message: "Trade report missing positive last quantity".to_string(),
                    });
                }
            }
            if self.last_px.is_none() {
                return Err(SessionError::InvalidMessage {
                    message: "Trade report missing last price".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Inbound order-cancel-reject message (FIX 35=9).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelReject {
    /// Client order id of the order whose cancel was rejected.
    pub client_order_id: ClientOrderId,
    /// Id of the rejected cancel request, when echoed back.
    pub cancel_request_id: Option<CancelRequestId>,
    /// Reason given by the counterparty.
    pub reason: String,
    /// Counterparty transaction time.
    pub transact_time: Timestamp,
}

/// Session connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    /// Session is logged on and usable.
    Connected,
    /// Session is down; submissions queue locally, cancels fail fast.
    Disconnected,
}

impl ConnectionStatus {
    /// Returns true if the session is usable.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Everything the counterparty session can push at the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    /// Execution report (ack, trade, cancel confirm, reject, expiry).
    ExecutionReport(ExecutionReport),
    /// Cancel request rejected.
    CancelReject(OrderCancelReject),
    /// Connection status changed.
    ConnectionStatus(ConnectionStatus),
}

/// FIX session error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// Session is not connected.
    #[error("Session not connected")]
    NotConnected,

    /// Connection-level failure.
    #[error("Session connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Send failed after the session accepted the message.
    #[error("Transport error: {message}")]
    TransportError {
        /// Error details.
        message: String,
    },

    /// Inbound message failed validation.
    #[error("Invalid session message: {message}")]
    InvalidMessage {
        /// Error details.
        message: String,
    },
}

/// Port for the counterparty FIX session.
///
/// Sends are fire-and-forget: a successful return means the message was
/// handed to the transport, not that the counterparty accepted it. The
/// outcome arrives later as a `SessionEvent`.
#[async_trait]
pub trait FixSessionPort: Send + Sync {
    /// Whether the session is currently connected.
    fn is_connected(&self) -> bool;

    /// Subscribe to inbound session events.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;

    /// Send a new-order message.
    async fn send_order(&self, request: NewOrderRequest) -> Result<(), SessionError>;

    /// Send an order-cancel-request message.
    async fn send_cancel(&self, request: CancelRequest) -> Result<(), SessionError>;
}
