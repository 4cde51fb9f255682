//! Order Aggregate Root
//!
//! The Order aggregate manages the complete lifecycle of an order,
//! following FIX protocol semantics for state transitions and fills.
//! User commands and asynchronous counterparty reports reconcile into
//! this single state machine.

use serde::{Deserialize, Serialize};

use crate::domain::order_lifecycle::errors::OrderError;
use crate::domain::order_lifecycle::events::{
    OrderAcknowledged, OrderCancelRejected, OrderCancelRequested, OrderCanceled, OrderEvent,
    OrderExpired, OrderFilled, OrderPartiallyFilled, OrderRejected, OrderSubmitted,
};
use crate::domain::order_lifecycle::services::OrderStateMachine;
use crate::domain::order_lifecycle::value_objects::{
    CancelReason, Execution, FillApplication, FillState, OrderSide, OrderStatus, OrderType,
    RejectReason, TimeInForce,
};
use crate::domain::shared::{
    CancelRequestId, ClientOrderId, CounterpartyOrderId, Price, Quantity, Symbol, Timestamp,
};

/// User intent to submit a new order.
#[derive(Debug, Clone)]
pub struct SubmitOrderIntent {
    /// Client order id; generated when absent.
    pub client_order_id: Option<ClientOrderId>,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Quantity to trade.
    pub quantity: Quantity,
    /// Limit price (required for Limit/StopLimit).
    pub limit_price: Option<Price>,
    /// Time in force.
    pub time_in_force: TimeInForce,
}

impl SubmitOrderIntent {
    /// Validate the intent parameters.
    ///
    /// # Errors
    ///
    /// Returns error if required parameters are missing or invalid.
    pub fn validate(&self) -> Result<(), OrderError> {
        self.symbol
            .validate()
            .map_err(|e| OrderError::InvalidParameters {
                field: "symbol".to_string(),
                message: e.to_string(),
            })?;

        self.quantity
            .validate_for_order()
            .map_err(|e| OrderError::InvalidParameters {
                field: "quantity".to_string(),
                message: e.to_string(),
            })?;

        if self.order_type.requires_limit_price() && self.limit_price.is_none() {
            return Err(OrderError::InvalidParameters {
                field: "limit_price".to_string(),
                message: "Limit price required for limit orders".to_string(),
            });
        }

        if let Some(price) = &self.limit_price {
            price
                .validate_for_order()
                .map_err(|e| OrderError::InvalidParameters {
                    field: "limit_price".to_string(),
                    message: e.to_string(),
                })?;
        }

        if let Some(id) = &self.client_order_id {
            if id.as_str().is_empty() {
                return Err(OrderError::InvalidParameters {
                    field: "client_order_id".to_string(),
                    message: "Client order id cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// In-flight cancel request, kept until confirmed or rejected.
///
/// Holds the status to restore when the counterparty rejects the cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCancel {
    /// Id of the cancel request sent to the counterparty.
    pub cancel_request_id: CancelRequestId,
    /// Status the order had before the cancel request went out.
    pub prior_status: OrderStatus,
}

/// Order Aggregate Root.
///
/// The client order id is the primary identity and never changes. The
/// counterparty order id is learned from the first acknowledging report
/// and is immutable once bound.
#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    client_order_id: ClientOrderId,
    counterparty_order_id: Option<CounterpartyOrderId>,
    symbol: Symbol,
    side: OrderSide,
    order_type: OrderType,
    quantity: Quantity,
    limit_price: Option<Price>,
    time_in_force: TimeInForce,
    status: OrderStatus,
    fill_state: FillState,
    pending_cancel: Option<PendingCancel>,
    reject_reason: Option<RejectReason>,
    cancel_reason: Option<CancelReason>,
    #[serde(skip)]
    events: Vec<OrderEvent>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Order {
    /// Create a new order from a submit intent.
    ///
    /// The order starts in `PendingNew`: the local record is authoritative
    /// before any transport send happens. Generates an `OrderSubmitted`
    /// event.
    ///
    /// # Errors
    ///
    /// Returns error if intent validation fails.
    pub fn new(intent: SubmitOrderIntent) -> Result<Self, OrderError> {
        intent.validate()?;

        let client_order_id = intent
            .client_order_id
            .unwrap_or_else(ClientOrderId::generate);
        let now = Timestamp::now();

        let mut order = Self {
            client_order_id: client_order_id.clone(),
            counterparty_order_id: None,
            symbol: intent.symbol.clone(),
            side: intent.side,
            order_type: intent.order_type,
            quantity: intent.quantity,
            limit_price: intent.limit_price,
            time_in_force: intent.time_in_force,
            status: OrderStatus::PendingNew,
            fill_state: FillState::new(intent.quantity),
            pending_cancel: None,
            reject_reason: None,
            cancel_reason: None,
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        order.events.push(OrderEvent::Submitted(OrderSubmitted {
            client_order_id,
            symbol: intent.symbol,
            side: intent.side,
            quantity: intent.quantity,
            limit_price: intent.limit_price,
            occurred_at: now,
        }));

        Ok(order)
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the client order ID.
    #[must_use]
    pub const fn client_order_id(&self) -> &ClientOrderId {
        &self.client_order_id
    }

    /// Get the counterparty order ID, if bound.
    #[must_use]
    pub const fn counterparty_order_id(&self) -> Option<&CounterpartyOrderId> {
        self.counterparty_order_id.as_ref()
    }

    /// Get the symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Get the order side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Get the order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Get the quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Get the limit price.
    #[must_use]
    pub const fn limit_price(&self) -> Option<Price> {
        self.limit_price
    }

    /// Get the time in force.
    #[must_use]
    pub const fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Get the fill state.
    #[must_use]
    pub const fn fill_state(&self) -> &FillState {
        &self.fill_state
    }

    /// Get the in-flight cancel request, if any.
    #[must_use]
    pub const fn pending_cancel(&self) -> Option<&PendingCancel> {
        self.pending_cancel.as_ref()
    }

    /// Get the reject reason, if the order was rejected.
    #[must_use]
    pub const fn reject_reason(&self) -> Option<&RejectReason> {
        self.reject_reason.as_ref()
    }

    /// Get the cancel reason, if the order was canceled or expired.
    #[must_use]
    pub const fn cancel_reason(&self) -> Option<&CancelReason> {
        self.cancel_reason.as_ref()
    }

    /// Check if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Get the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    // ========================================================================
    // State Transitions
    // ========================================================================

    /// Acknowledge the order, binding the counterparty order id.
    ///
    /// Only a `PendingNew` order changes status (to `New`). An ack arriving
    /// after a fill or during a pending cancel just binds the id; the
    /// recorded prior status of an in-flight cancel is upgraded so a later
    /// cancel-reject restores `New` rather than `PendingNew`.
    ///
    /// # Errors
    ///
    /// Returns error if a different counterparty id is already bound.
    pub fn acknowledge(
        &mut self,
        counterparty_order_id: CounterpartyOrderId,
    ) -> Result<(), OrderError> {
        self.bind_counterparty_id(counterparty_order_id.clone())?;

        if self.status == OrderStatus::PendingNew {
            self.status = OrderStatus::New;
            self.updated_at = Timestamp::now();
            self.events
                .push(OrderEvent::Acknowledged(OrderAcknowledged {
                    client_order_id: self.client_order_id.clone(),
                    counterparty_order_id,
                    occurred_at: self.updated_at,
                }));
        } else if let Some(pending) = &mut self.pending_cancel {
            if pending.prior_status == OrderStatus::PendingNew {
                pending.prior_status = OrderStatus::New;
            }
        }

        Ok(())
    }

    /// Bind the counterparty order id without a status change.
    ///
    /// # Errors
    ///
    /// Returns error if a different id is already bound.
    pub fn bind_counterparty_id(
        &mut self,
        counterparty_order_id: CounterpartyOrderId,
    ) -> Result<(), OrderError> {
        match &self.counterparty_order_id {
            Some(bound) if bound != &counterparty_order_id => {
                Err(OrderError::CounterpartyIdMismatch {
                    bound: bound.as_str().to_string(),
                    reported: counterparty_order_id.into_inner(),
                })
            }
            Some(_) => Ok(()),
            None => {
                self.counterparty_order_id = Some(counterparty_order_id);
                Ok(())
            }
        }
    }

    /// Apply an execution to the order.
    ///
    /// Duplicate execution ids are a no-op. A fill on a terminal order is
    /// recorded for bookkeeping but never regresses the status. Otherwise
    /// the status moves to `PartiallyFilled` or `Filled` and the matching
    /// events are generated.
    ///
    /// # Errors
    ///
    /// Returns error if the fill quantity exceeds the remaining quantity.
    pub fn apply_execution(&mut self, execution: Execution) -> Result<FillApplication, OrderError> {
        let fill_qty = execution.quantity;
        let fill_price = execution.price;
        let remaining = self.fill_state.leaves_qty();

        let outcome = self
            .fill_state
            .apply_execution(execution)
            .map_err(|_| OrderError::FillExceedsRemaining {
                fill_qty: fill_qty.to_string(),
                remaining_qty: remaining.to_string(),
            })?;

        if outcome == FillApplication::Duplicate {
            return Ok(outcome);
        }

        self.updated_at = Timestamp::now();

        if !self.status.is_terminal() {
            let next = if self.fill_state.is_filled() {
                OrderStatus::Filled
            } else {
                OrderStatus::PartiallyFilled
            };
            // A full fill resolves any in-flight cancel.
            if next == OrderStatus::Filled {
                self.pending_cancel = None;
            }
            if self.status != next {
                OrderStateMachine::validate_transition(self.status, next)?;
            }
            self.status = next;
        }

        self.events
            .push(OrderEvent::PartiallyFilled(OrderPartiallyFilled {
                client_order_id: self.client_order_id.clone(),
                fill_quantity: fill_qty,
                fill_price,
                cumulative_quantity: self.fill_state.cum_qty(),
                leaves_quantity: self.fill_state.leaves_qty(),
                vwap: self.fill_state.avg_px(),
                occurred_at: self.updated_at,
            }));

        if self.status == OrderStatus::Filled {
            self.events.push(OrderEvent::Filled(OrderFilled {
                client_order_id: self.client_order_id.clone(),
                total_quantity: self.quantity,
                average_price: self.fill_state.avg_px(),
                occurred_at: self.updated_at,
            }));
        }

        Ok(outcome)
    }

    /// Record a cancel request and transition to `PendingCancel`.
    ///
    /// The current status is stored so a cancel-reject can restore it.
    /// Generates an `OrderCancelRequested` event.
    ///
    /// # Errors
    ///
    /// Returns error if the order is terminal or a cancel is already
    /// in flight.
    pub fn request_cancel(
        &mut self,
        cancel_request_id: CancelRequestId,
    ) -> Result<(), OrderError> {
        if !self.status.is_cancelable() {
            return Err(OrderError::CannotCancel {
                status: self.status,
            });
        }

        self.pending_cancel = Some(PendingCancel {
            cancel_request_id: cancel_request_id.clone(),
            prior_status: self.status,
        });
        self.status = OrderStatus::PendingCancel;
        self.updated_at = Timestamp::now();

        self.events
            .push(OrderEvent::CancelRequested(OrderCancelRequested {
                client_order_id: self.client_order_id.clone(),
                cancel_request_id,
                occurred_at: self.updated_at,
            }));

        Ok(())
    }

    /// Confirm a cancel, or apply a counterparty-initiated cancel.
    ///
    /// A confirmation on an already-terminal order is a no-op: terminal
    /// status never regresses. Generates an `OrderCanceled` event.
    pub fn confirm_cancel(&mut self, reason: CancelReason) {
        if self.status.is_terminal() {
            return;
        }

        self.status = OrderStatus::Canceled;
        self.cancel_reason = Some(reason.clone());
        self.pending_cancel = None;
        self.updated_at = Timestamp::now();

        self.events.push(OrderEvent::Canceled(OrderCanceled {
            client_order_id: self.client_order_id.clone(),
            reason,
            filled_quantity: self.fill_state.cum_qty(),
            occurred_at: self.updated_at,
        }));
    }

    /// Reject the in-flight cancel request, restoring the prior status.
    ///
    /// Fills that arrived while the cancel was pending take precedence:
    /// if the order partially filled in the meantime, it restores to
    /// `PartiallyFilled` regardless of the recorded status. If fills
    /// already moved the status out of `PendingCancel`, the reject is
    /// moot: the recorded request is cleared and nothing else changes,
    /// so a later counterparty-initiated cancel is not mistaken for a
    /// confirmation of this request. Generates an `OrderCancelRejected`
    /// event when a status is restored.
    ///
    /// # Errors
    ///
    /// Returns error if no cancel was ever recorded.
    pub fn reject_cancel(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        if self.status != OrderStatus::PendingCancel {
            if self.pending_cancel.take().is_some() {
                self.updated_at = Timestamp::now();
                return Ok(());
            }
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: OrderStatus::PendingCancel,
                reason: "No cancel request in flight".to_string(),
            });
        }

        let pending = self
            .pending_cancel
            .take()
            .ok_or_else(|| OrderError::InvalidStateTransition {
                from: self.status,
                to: OrderStatus::PendingCancel,
                reason: "No cancel request recorded".to_string(),
            })?;

        let restored = if self.fill_state.is_partial() {
            OrderStatus::PartiallyFilled
        } else {
            pending.prior_status
        };

        self.status = restored;
        self.updated_at = Timestamp::now();

        self.events
            .push(OrderEvent::CancelRejected(OrderCancelRejected {
                client_order_id: self.client_order_id.clone(),
                restored_status: restored,
                reason: reason.into(),
                occurred_at: self.updated_at,
            }));

        Ok(())
    }

    /// Reject the order.
    ///
    /// The counterparty has authority: rejection lands from any
    /// non-terminal status. A reject on a terminal order is a no-op.
    /// Generates an `OrderRejected` event.
    pub fn reject(&mut self, reason: RejectReason) {
        if self.status.is_terminal() {
            return;
        }

        self.status = OrderStatus::Rejected;
        self.reject_reason = Some(reason.clone());
        self.pending_cancel = None;
        self.updated_at = Timestamp::now();

        self.events.push(OrderEvent::Rejected(OrderRejected {
            client_order_id: self.client_order_id.clone(),
            reason,
            occurred_at: self.updated_at,
        }));
    }

    /// Mark the order as expired.
    ///
    /// Behaves like a counterparty cancel with an end-of-session reason.
    /// A no-op on terminal orders. Generates an `OrderExpired` event.
    pub fn expire(&mut self) {
        if self.status.is_terminal() {
            return;
        }

        self.status = OrderStatus::Expired;
        self.cancel_reason = Some(CancelReason::expired());
        self.pending_cancel = None;
        self.updated_at = Timestamp::now();

        self.events.push(OrderEvent::Expired(OrderExpired {
            client_order_id: self.client_order_id.clone(),
            filled_quantity: self.fill_state.cum_qty(),
            occurred_at: self.updated_at,
        }));
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Drain accumulated domain events.
    pub fn drain_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get pending events without draining.
    #[must_use]
    pub fn pending_events(&self) -> &[OrderEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_intent() -> SubmitOrderIntent {
        SubmitOrderIntent {
            client_order_id: None,
            symbol: Symbol::new("AAPL"),
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            quantity: Quantity::from_i64(100),
            limit_price: Some(Price::from_cents(15000)),
            time_in_force: TimeInForce::Day,
        }
    }

    fn make_execution(exec_id: &str, qty: i64, price_cents: i64) -> Execution {
        Execution::new(
            exec_id,
            Quantity::from_i64(qty),
            Price::from_cents(price_cents),
            Timestamp::now(),
        )
    }

    fn acked_order() -> Order {
        let mut order = Order::new(make_intent()).unwrap();
        order.acknowledge(CounterpartyOrderId::new("cpty-1")).unwrap();
        order.drain_events();
        order
    }

    #[test]
    fn order_new_starts_pending_new() {
        let order = Order::new(make_intent()).unwrap();

        assert_eq!(order.status(), OrderStatus::PendingNew);
        assert!(order.counterparty_order_id().is_none());
        assert_eq!(order.pending_events().len(), 1);
        assert!(matches!(
            order.pending_events()[0],
            OrderEvent::Submitted(_)
        ));
    }

    #[test]
    fn order_new_generates_client_order_id() {
        let order = Order::new(make_intent()).unwrap();
        assert!(!order.client_order_id().as_str().is_empty());
    }

    #[test]
    fn order_new_keeps_provided_client_order_id() {
        let mut intent = make_intent();
        intent.client_order_id = Some(ClientOrderId::new("clord-42"));

        let order = Order::new(intent).unwrap();
        assert_eq!(order.client_order_id().as_str(), "clord-42");
    }

    #[test]
    fn order_validation_fails_for_missing_limit_price() {
        let mut intent = make_intent();
        intent.limit_price = None;

        assert!(Order::new(intent).is_err());
    }

    #[test]
    fn order_validation_fails_for_zero_quantity() {
        let mut intent = make_intent();
        intent.quantity = Quantity::ZERO;

        assert!(Order::new(intent).is_err());
    }

    #[test]
    fn market_order_needs_no_limit_price() {
        let mut intent = make_intent();
        intent.order_type = OrderType::Market;
        intent.limit_price = None;

        assert!(Order::new(intent).is_ok());
    }

    #[test]
    fn acknowledge_binds_counterparty_id_and_transitions() {
        let mut order = Order::new(make_intent()).unwrap();
        order.drain_events();

        order
            .acknowledge(CounterpartyOrderId::new("cpty-1"))
            .unwrap();

        assert_eq!(order.status(), OrderStatus::New);
        assert_eq!(
            order.counterparty_order_id().map(|id| id.as_str()),
            Some("cpty-1")
        );
        assert!(matches!(
            order.pending_events()[0],
            OrderEvent::Acknowledged(_)
        ));
    }

    #[test]
    fn acknowledge_is_idempotent() {
        let mut order = acked_order();

        order
            .acknowledge(CounterpartyOrderId::new("cpty-1"))
            .unwrap();
        assert_eq!(order.status(), OrderStatus::New);
        assert!(order.pending_events().is_empty());
    }

    #[test]
    fn acknowledge_rejects_conflicting_counterparty_id() {
        let mut order = acked_order();

        let result = order.acknowledge(CounterpartyOrderId::new("cpty-other"));
        assert!(result.is_err());
    }

    #[test]
    fn fill_transitions_to_partially_filled() {
        let mut order = acked_order();

        order
            .apply_execution(make_execution("e1", 40, 15000))
            .unwrap();

        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
        assert_eq!(order.fill_state().cum_qty(), Quantity::from_i64(40));
        assert_eq!(order.fill_state().leaves_qty(), Quantity::from_i64(60));
    }

    #[test]
    fn final_fill_transitions_to_filled() {
        let mut order = acked_order();

        order
            .apply_execution(make_execution("e1", 40, 15000))
            .unwrap();
        order
            .apply_execution(make_execution("e2", 60, 15100))
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Filled);
        assert!(order.fill_state().is_filled());

        let events = order.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, OrderEvent::Filled(_))));
    }

    #[test]
    fn duplicate_execution_does_not_change_state() {
        let mut order = acked_order();

        order
            .apply_execution(make_execution("e1", 40, 15000))
            .unwrap();
        order.drain_events();

        let outcome = order
            .apply_execution(make_execution("e1", 40, 15000))
            .unwrap();

        assert_eq!(outcome, FillApplication::Duplicate);
        assert_eq!(order.fill_state().cum_qty(), Quantity::from_i64(40));
        assert!(order.pending_events().is_empty());
    }

    #[test]
    fn fill_before_ack_implicitly_activates() {
        let mut order = Order::new(make_intent()).unwrap();
        order.drain_events();

        order
            .apply_execution(make_execution("e1", 40, 15000))
            .unwrap();

        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
    }

    #[test]
    fn overfill_is_rejected() {
        let mut order = acked_order();

        let result = order.apply_execution(make_execution("e1", 150, 15000));
        assert!(matches!(
            result,
            Err(OrderError::FillExceedsRemaining { .. })
        ));
        assert_eq!(order.status(), OrderStatus::New);
    }

    #[test]
    fn request_cancel_records_prior_status() {
        let mut order = acked_order();

        order
            .request_cancel(CancelRequestId::new("cxl-1"))
            .unwrap();

        assert_eq!(order.status(), OrderStatus::PendingCancel);
        let pending = order.pending_cancel().unwrap();
        assert_eq!(pending.prior_status, OrderStatus::New);
        assert_eq!(pending.cancel_request_id.as_str(), "cxl-1");
    }

    #[test]
    fn request_cancel_twice_is_rejected() {
        let mut order = acked_order();
        order
            .request_cancel(CancelRequestId::new("cxl-1"))
            .unwrap();

        let result = order.request_cancel(CancelRequestId::new("cxl-2"));
        assert!(matches!(result, Err(OrderError::CannotCancel { .. })));
    }

    #[test]
    fn request_cancel_on_terminal_is_rejected() {
        let mut order = acked_order();
        order
            .apply_execution(make_execution("e1", 100, 15000))
            .unwrap();

        let result = order.request_cancel(CancelRequestId::new("cxl-1"));
        assert!(result.is_err());
    }

    #[test]
    fn confirm_cancel_reaches_terminal() {
        let mut order = acked_order();
        order
            .request_cancel(CancelRequestId::new("cxl-1"))
            .unwrap();

        order.confirm_cancel(CancelReason::user_requested());

        assert_eq!(order.status(), OrderStatus::Canceled);
        assert!(order.pending_cancel().is_none());
        assert_eq!(order.cancel_reason().unwrap().code, "USER_REQUESTED");
    }

    #[test]
    fn counterparty_initiated_cancel_without_request() {
        let mut order = acked_order();

        order.confirm_cancel(CancelReason::counterparty_initiated());

        assert_eq!(order.status(), OrderStatus::Canceled);
    }

    #[test]
    fn confirm_cancel_on_terminal_is_noop() {
        let mut order = acked_order();
        order
            .apply_execution(make_execution("e1", 100, 15000))
            .unwrap();
        order.drain_events();

        order.confirm_cancel(CancelReason::user_requested());

        assert_eq!(order.status(), OrderStatus::Filled);
        assert!(order.pending_events().is_empty());
    }

    #[test]
    fn reject_cancel_restores_prior_status() {
        let mut order = acked_order();
        order
            .request_cancel(CancelRequestId::new("cxl-1"))
            .unwrap();

        order.reject_cancel("Too late to cancel").unwrap();

        assert_eq!(order.status(), OrderStatus::New);
        assert!(order.pending_cancel().is_none());
    }

    #[test]
    fn reject_cancel_prefers_partially_filled_after_race() {
        let mut order = acked_order();
        order
            .request_cancel(CancelRequestId::new("cxl-1"))
            .unwrap();

        // Fill lands while the cancel is in flight.
        order
            .apply_execution(make_execution("e1", 40, 15000))
            .unwrap();
        assert_eq!(order.status(), OrderStatus::PartiallyFilled);

        // The cancel is then re-requested and rejected; the order must not
        // fall back to New.
        order
            .request_cancel(CancelRequestId::new("cxl-2"))
            .unwrap();
        order.reject_cancel("Too late").unwrap();

        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
    }

    #[test]
    fn reject_cancel_after_fill_left_pending_cancel_clears_record() {
        let mut order = acked_order();
        order
            .request_cancel(CancelRequestId::new("cxl-1"))
            .unwrap();

        // Fill moves the status out of PendingCancel before the reject
        // arrives.
        order
            .apply_execution(make_execution("e1", 40, 15000))
            .unwrap();
        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
        assert!(order.pending_cancel().is_some());
        order.drain_events();

        // The late reject is moot but must still clear the record.
        order.reject_cancel("Too late").unwrap();

        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
        assert!(order.pending_cancel().is_none());
        assert!(order.pending_events().is_empty());

        // With the record gone, a counterparty-initiated cancel keeps
        // its own reason.
        order.confirm_cancel(CancelReason::counterparty_initiated());
        assert_eq!(
            order.cancel_reason().unwrap().code,
            "COUNTERPARTY_INITIATED"
        );
    }

    #[test]
    fn reject_cancel_without_request_is_error() {
        let mut order = acked_order();

        assert!(order.reject_cancel("nothing pending").is_err());
    }

    #[test]
    fn fill_while_pending_cancel_keeps_filling() {
        let mut order = acked_order();
        order
            .request_cancel(CancelRequestId::new("cxl-1"))
            .unwrap();

        order
            .apply_execution(make_execution("e1", 100, 15000))
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Filled);
        assert!(order.pending_cancel().is_none());
    }

    #[test]
    fn ack_during_pending_cancel_upgrades_prior_status() {
        let mut order = Order::new(make_intent()).unwrap();
        order
            .request_cancel(CancelRequestId::new("cxl-1"))
            .unwrap();

        // Ack arrives while the cancel is pending.
        order
            .acknowledge(CounterpartyOrderId::new("cpty-1"))
            .unwrap();
        assert_eq!(order.status(), OrderStatus::PendingCancel);

        order.reject_cancel("Too late").unwrap();
        assert_eq!(order.status(), OrderStatus::New);
    }

    #[test]
    fn reject_lands_from_any_working_state() {
        let mut order = acked_order();
        order
            .apply_execution(make_execution("e1", 40, 15000))
            .unwrap();

        order.reject(RejectReason::new("TOO_LATE", "Too late to enter"));

        assert_eq!(order.status(), OrderStatus::Rejected);
        assert_eq!(order.reject_reason().unwrap().code, "TOO_LATE");
    }

    #[test]
    fn reject_on_terminal_is_noop() {
        let mut order = acked_order();
        order.confirm_cancel(CancelReason::user_requested());
        order.drain_events();

        order.reject(RejectReason::unspecified());

        assert_eq!(order.status(), OrderStatus::Canceled);
        assert!(order.pending_events().is_empty());
    }

    #[test]
    fn expire_behaves_like_cancel() {
        let mut order = acked_order();
        order
            .apply_execution(make_execution("e1", 40, 15000))
            .unwrap();

        order.expire();

        assert_eq!(order.status(), OrderStatus::Expired);
        assert_eq!(order.cancel_reason().unwrap().code, "EXPIRED");
        // Fills survive expiry.
        assert_eq!(order.fill_state().cum_qty(), Quantity::from_i64(40));
    }

    #[test]
    fn late_fill_on_canceled_order_is_bookkept() {
        let mut order = acked_order();
        order.confirm_cancel(CancelReason::counterparty_initiated());
        order.drain_events();

        // Out-of-order trade report after the cancel confirmation.
        order
            .apply_execution(make_execution("e1", 40, 15000))
            .unwrap();

        // Status never regresses from terminal.
        assert_eq!(order.status(), OrderStatus::Canceled);
        // The execution is still recorded.
        assert_eq!(order.fill_state().cum_qty(), Quantity::from_i64(40));
    }

    #[test]
    fn drain_events_empties_buffer() {
        let mut order = Order::new(make_intent()).unwrap();

        let events = order.drain_events();
        assert_eq!(events.len(), 1);
        assert!(order.pending_events().is_empty());
    }

    #[test]
    fn order_serde_skips_events() {
        let order = Order::new(make_intent()).unwrap();
        let json = serde_json::to_string(&order).unwrap();
        let parsed: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.client_order_id(), order.client_order_id());
        assert_eq!(parsed.status(), order.status());
        assert!(parsed.pending_events().is_empty());
    }
}
