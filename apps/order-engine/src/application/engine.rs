//! Order Lifecycle Engine
//!
//! The application service that reconciles user commands with
//! asynchronous counterparty reports. Commands (submit, cancel) validate
//! and record locally before anything crosses the session boundary, so
//! the store is never behind the wire. Inbound reports mutate orders
//! under their per-order lock and publish snapshots to the bus.
//!
//! Command-path failures return to the caller. Event-path anomalies
//! (unmatched reports, impossible transitions) are logged and swallowed;
//! the counterparty cannot be NACKed, so dropping is the only safe move.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::application::bus::SharedNotificationBus;
use crate::application::ports::{
    CancelRequest, ConnectionStatus, ExecType, ExecutionReport, FixSessionPort, NewOrderRequest,
    OrderCancelReject, SessionError, SessionEvent,
};
use crate::application::store::{OrderStore, StoreError};
use crate::domain::order_lifecycle::{
    CancelReason, Execution, FillApplication, Order, OrderError, RejectReason, SubmitOrderIntent,
};
use crate::domain::shared::{CancelRequestId, ClientOrderId, Price, Quantity};

// =============================================================================
// Errors
// =============================================================================

/// Engine command error.
///
/// Only the command path (submit, cancel) produces these; the event path
/// never surfaces errors to anyone.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Order parameters failed validation.
    #[error("Order validation failed: {0}")]
    Validation(#[source] OrderError),

    /// An order with this client order id already exists.
    #[error("Duplicate client order id: {client_order_id}")]
    Duplicate {
        /// The conflicting client order id.
        client_order_id: String,
    },

    /// No order with this client order id.
    #[error("Order not found: {client_order_id}")]
    NotFound {
        /// The missing client order id.
        client_order_id: String,
    },

    /// The order is not in a state that admits the command.
    #[error("Invalid order state: {0}")]
    InvalidState(#[source] OrderError),

    /// The session is down and the command needs it up.
    #[error("Session not connected")]
    NotConnected,

    /// The session accepted the command but the transport failed.
    ///
    /// The local mutation is NOT rolled back. Reconciliation against
    /// later counterparty reports resolves the divergence.
    #[error("Transport failure: {0}")]
    Transport(#[source] SessionError),
}

impl From<StoreError> for EngineError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { client_order_id } => Self::NotFound { client_order_id },
            StoreError::DuplicateClientOrderId { client_order_id } => {
                Self::Duplicate { client_order_id }
            }
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Reconciles the local order book against the counterparty session.
pub struct OrderLifecycleEngine {
    session: Arc<dyn FixSessionPort>,
    store: Arc<OrderStore>,
    bus: SharedNotificationBus,
}

impl OrderLifecycleEngine {
    /// Create a new engine.
    #[must_use]
    pub fn new(
        session: Arc<dyn FixSessionPort>,
        store: Arc<OrderStore>,
        bus: SharedNotificationBus,
    ) -> Self {
        Self {
            session,
            store,
            bus,
        }
    }

    /// The order store, for query surfaces.
    #[must_use]
    pub fn store(&self) -> &Arc<OrderStore> {
        &self.store
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Submit a new order.
    ///
    /// The order is recorded locally as `PENDING_NEW` before the wire is
    /// touched, so a crash between record and send leaves a visible
    /// pending order rather than an invisible working one. While the
    /// session is down the order parks locally as `PENDING_NEW` and
    /// submission still succeeds; this is degraded mode, not an error.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad parameters, `Duplicate` for a reused
    /// client order id, and `Transport` if the session accepted the
    /// order but the send failed (the local record stands).
    pub async fn submit_order(&self, intent: SubmitOrderIntent) -> Result<Order, EngineError> {
        let mut order = Order::new(intent).map_err(EngineError::Validation)?;
        let events = order.drain_events();
        let snapshot = order.clone();
        self.store.create(order)?;

        info!(
            client_order_id = %snapshot.client_order_id(),
            symbol = %snapshot.symbol(),
            side = ?snapshot.side(),
            quantity = %snapshot.quantity(),
            "Order recorded"
        );
        self.bus.publish_order_update(snapshot.clone(), events);

        if self.session.is_connected() {
            let request = NewOrderRequest {
                client_order_id: snapshot.client_order_id().clone(),
                symbol: snapshot.symbol().clone(),
                side: snapshot.side(),
                order_type: snapshot.order_type(),
                quantity: snapshot.quantity().amount(),
                limit_price: snapshot.limit_price().map(|p| p.amount()),
                time_in_force: snapshot.time_in_force(),
            };
            self.session
                .send_order(request)
                .await
                .map_err(EngineError::Transport)?;
        } else {
            info!(
                client_order_id = %snapshot.client_order_id(),
                "Session down, order parked as PENDING_NEW"
            );
        }

        Ok(snapshot)
    }

    /// Request cancellation of a working order.
    ///
    /// Unlike submission, a cancel has nothing useful to do while the
    /// session is down, so it fails fast with `NotConnected` instead of
    /// parking.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown order, `NotConnected` while the
    /// session is down, `InvalidState` if the order is not cancelable,
    /// and `Transport` if the send failed after the pending cancel was
    /// recorded (the record stands; a later report or cancel reject
    /// resolves it).
    pub async fn cancel_order(
        &self,
        client_order_id: &ClientOrderId,
    ) -> Result<CancelRequestId, EngineError> {
        if self.store.get(client_order_id).is_none() {
            return Err(EngineError::NotFound {
                client_order_id: client_order_id.as_str().to_string(),
            });
        }
        if !self.session.is_connected() {
            return Err(EngineError::NotConnected);
        }

        let cancel_request_id = CancelRequestId::generate();
        let request_id = cancel_request_id.clone();
        let ((outcome, events), snapshot) = self.store.update(client_order_id, move |order| {
            let outcome = order.request_cancel(request_id);
            (outcome, order.drain_events())
        })?;
        outcome.map_err(EngineError::InvalidState)?;

        info!(
            client_order_id = %client_order_id,
            cancel_request_id = %cancel_request_id,
            "Cancel requested"
        );
        let request = CancelRequest {
            cancel_request_id: cancel_request_id.clone(),
            client_order_id: client_order_id.clone(),
            counterparty_order_id: snapshot.counterparty_order_id().cloned(),
        };
        self.bus.publish_order_update(snapshot, events);

        self.session
            .send_cancel(request)
            .await
            .map_err(EngineError::Transport)?;

        Ok(cancel_request_id)
    }

    // =========================================================================
    // Inbound Events
    // =========================================================================

    /// Reconcile an inbound execution report.
    ///
    /// Anomalies are logged and swallowed; the counterparty is never
    /// answered. Reports for unknown orders leave the store untouched.
    pub fn on_execution_report(&self, report: &ExecutionReport) {
        if let Err(error) = report.validate() {
            warn!(%error, exec_type = ?report.exec_type, "Dropping invalid execution report");
            return;
        }

        let Some(client_order_id) = self.resolve_report_target(report) else {
            warn!(
                client_order_id = ?report.client_order_id,
                counterparty_order_id = ?report.counterparty_order_id,
                exec_type = ?report.exec_type,
                "Execution report matched no known order"
            );
            return;
        };

        let result = self.store.update(&client_order_id, |order| {
            let outcome = Self::apply_report(order, report);
            (outcome, order.drain_events())
        });
        match result {
            Ok(((outcome, events), snapshot)) => {
                if let Err(error) = outcome {
                    warn!(
                        client_order_id = %client_order_id,
                        %error,
                        exec_type = ?report.exec_type,
                        "Execution report could not be applied"
                    );
                }
                if !events.is_empty() {
                    self.bus.publish_order_update(snapshot, events);
                }
            }
            Err(StoreError::NotFound { .. } | StoreError::DuplicateClientOrderId { .. }) => {
                warn!(
                    client_order_id = %client_order_id,
                    "Order vanished between resolution and update"
                );
            }
        }
    }

    /// Reconcile an inbound order-cancel-reject.
    ///
    /// Restores the order to the status it held before the cancel
    /// request. Anomalies are logged and swallowed.
    pub fn on_cancel_reject(&self, reject: &OrderCancelReject) {
        let result = self.store.update(&reject.client_order_id, |order| {
            let outcome = order.reject_cancel(reject.reason.clone());
            (outcome, order.drain_events())
        });
        match result {
            Ok(((outcome, events), snapshot)) => {
                if let Err(error) = outcome {
                    warn!(
                        client_order_id = %reject.client_order_id,
                        %error,
                        "Cancel reject could not be applied"
                    );
                    return;
                }
                info!(
                    client_order_id = %reject.client_order_id,
                    restored_status = %snapshot.status(),
                    reason = %reject.reason,
                    "Cancel rejected, order restored"
                );
                self.bus.publish_order_update(snapshot, events);
            }
            Err(_) => {
                warn!(
                    client_order_id = %reject.client_order_id,
                    "Cancel reject matched no known order"
                );
            }
        }
    }

    /// Republish a session connection status change.
    pub fn on_connection_status(&self, status: ConnectionStatus) {
        info!(?status, "Session connection status changed");
        self.bus.publish_connection_status(status);
    }

    /// Run the inbound event pump until the session closes its channel.
    ///
    /// A lagged receiver logs a warning and keeps going; at-least-once
    /// delivery and execution-id dedup make replays safe, but gaps mean
    /// missed reports and deserve an operator's attention.
    pub async fn run(self: Arc<Self>) {
        let events = self.session.subscribe();
        self.pump(events).await;
    }

    /// Drain an already-open session subscription.
    ///
    /// Callers that need the subscription open before the task starts
    /// (so no event can slip past) subscribe themselves and hand the
    /// receiver here.
    pub async fn pump(self: Arc<Self>, mut events: broadcast::Receiver<SessionEvent>) {
        loop {
            match events.recv().await {
                Ok(SessionEvent::ExecutionReport(report)) => self.on_execution_report(&report),
                Ok(SessionEvent::CancelReject(reject)) => self.on_cancel_reject(&reject),
                Ok(SessionEvent::ConnectionStatus(status)) => self.on_connection_status(status),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Engine lagged behind session events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Session event channel closed, stopping event pump");
                    break;
                }
            }
        }
    }

    // =========================================================================
    // Report Dispatch
    // =========================================================================

    fn resolve_report_target(&self, report: &ExecutionReport) -> Option<ClientOrderId> {
        if let Some(client_order_id) = &report.client_order_id {
            if self.store.get(client_order_id).is_some() {
                return Some(client_order_id.clone());
            }
        }
        report
            .counterparty_order_id
            .as_ref()
            .and_then(|id| self.store.resolve_counterparty_id(id))
    }

    fn apply_report(order: &mut Order, report: &ExecutionReport) -> Result<(), OrderError> {
        match report.exec_type {
            ExecType::New => {
                let Some(counterparty_order_id) = report.counterparty_order_id.clone() else {
                    return Err(OrderError::InvalidParameters {
                        field: "counterparty_order_id".to_string(),
                        message: "Acknowledgment carries no counterparty order id".to_string(),
                    });
                };
                order.acknowledge(counterparty_order_id)
            }
            ExecType::Trade => {
                if let Some(counterparty_order_id) = report.counterparty_order_id.clone() {
                    order.bind_counterparty_id(counterparty_order_id)?;
                }
                let (Some(execution_id), Some(last_qty), Some(last_px)) = (
                    report.execution_id.clone(),
                    report.last_qty,
                    report.last_px,
                ) else {
                    return Err(OrderError::InvalidParameters {
                        field: "execution".to_string(),
                        message: "Trade report missing execution details".to_string(),
                    });
                };
                let execution = Execution::new(
                    execution_id,
                    Quantity::new(last_qty),
                    Price::new(last_px),
                    report.transact_time,
                );
                if order.apply_execution(execution)? == FillApplication::Duplicate {
                    debug!(
                        client_order_id = %order.client_order_id(),
                        execution_id = ?report.execution_id,
                        "Duplicate execution report, no-op"
                    );
                }
                Ok(())
            }
            ExecType::Canceled => {
                if let Some(counterparty_order_id) = report.counterparty_order_id.clone() {
                    order.bind_counterparty_id(counterparty_order_id)?;
                }
                let reason = if order.pending_cancel().is_some() {
                    CancelReason::user_requested()
                } else {
                    CancelReason::counterparty_initiated()
                };
                order.confirm_cancel(reason);
                Ok(())
            }
            ExecType::Rejected => {
                let reason = report
                    .text
                    .clone()
                    .map_or_else(RejectReason::unspecified, RejectReason::counterparty_error);
                order.reject(reason);
                Ok(())
            }
            ExecType::Expired => {
                order.expire();
                Ok(())
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
