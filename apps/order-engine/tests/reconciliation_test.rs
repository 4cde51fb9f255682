//! Reconciliation Integration Tests
//!
//! End-to-end tests driving the engine through the simulated session:
//! commands go out, counterparty reports come back, and the store must
//! end up consistent regardless of duplication, reordering, or loss of
//! connectivity.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use order_engine::application::bus::NotificationBus;
use order_engine::application::positions::PositionProjector;
use order_engine::application::store::OrderStore;
use order_engine::application::{EngineError, OrderLifecycleEngine};
use order_engine::domain::order_lifecycle::{
    Execution, Order, OrderSide, OrderStatus, OrderType, SubmitOrderIntent, TimeInForce,
};
use order_engine::domain::shared::{
    ClientOrderId, CounterpartyOrderId, ExecutionId, Price, Quantity, Symbol, Timestamp,
};
use order_engine::infrastructure::session::SimulatedFixSession;
use order_engine::{
    ConnectionStatus, ExecType, ExecutionReport, FixSessionPort, OrderCancelReject, SessionEvent,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct Harness {
    session: Arc<SimulatedFixSession>,
    engine: Arc<OrderLifecycleEngine>,
    bus: Arc<NotificationBus>,
}

fn harness() -> Harness {
    let session = Arc::new(SimulatedFixSession::default());
    let bus = Arc::new(NotificationBus::with_defaults());
    let engine = Arc::new(OrderLifecycleEngine::new(
        Arc::clone(&session) as Arc<dyn FixSessionPort>,
        Arc::new(OrderStore::new()),
        Arc::clone(&bus),
    ));
    Harness {
        session,
        engine,
        bus,
    }
}

/// Spawn the reconciliation pump with its subscription already open, so
/// events injected immediately afterwards cannot be missed.
fn spawn_pump(h: &Harness) -> tokio::task::JoinHandle<()> {
    let events = h.session.subscribe();
    tokio::spawn(Arc::clone(&h.engine).pump(events))
}

fn limit_intent(client_id: &str, qty: i64, px_cents: i64) -> SubmitOrderIntent {
    SubmitOrderIntent {
        client_order_id: Some(ClientOrderId::new(client_id)),
        symbol: Symbol::new("AAPL"),
        side: OrderSide::Buy,
        order_type: OrderType::Limit,
        quantity: Quantity::from_i64(qty),
        limit_price: Some(Price::from_cents(px_cents)),
        time_in_force: TimeInForce::Day,
    }
}

fn ack(client_id: &str, cpty_id: &str) -> ExecutionReport {
    ExecutionReport {
        client_order_id: Some(ClientOrderId::new(client_id)),
        counterparty_order_id: Some(CounterpartyOrderId::new(cpty_id)),
        exec_type: ExecType::New,
        execution_id: None,
        last_qty: None,
        last_px: None,
        text: None,
        transact_time: Timestamp::now(),
    }
}

fn fill(cpty_id: &str, exec_id: &str, qty: i64, px: Decimal) -> ExecutionReport {
    ExecutionReport {
        client_order_id: None,
        counterparty_order_id: Some(CounterpartyOrderId::new(cpty_id)),
        exec_type: ExecType::Trade,
        execution_id: Some(ExecutionId::new(exec_id)),
        last_qty: Some(Decimal::from(qty)),
        last_px: Some(px),
        text: None,
        transact_time: Timestamp::now(),
    }
}

/// Poll the store until the order reaches the expected status.
async fn wait_for_status(engine: &OrderLifecycleEngine, id: &ClientOrderId, status: OrderStatus) {
    for _ in 0..100 {
        if engine.store().get(id).map(|o| o.status()) == Some(status) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "order {id} never reached {status}, last seen {:?}",
        engine.store().get(id).map(|o| o.status())
    );
}

// ============================================
// Disconnected Submission
// ============================================

#[tokio::test]
async fn submit_while_disconnected_parks_order_locally() {
    let h = harness();
    h.session.set_connected(false);

    let order = h
        .engine
        .submit_order(limit_intent("clord-1", 100, 15000))
        .await
        .unwrap();

    assert_eq!(order.status(), OrderStatus::PendingNew);
    assert!(h.session.sent_orders().is_empty());
    assert_eq!(h.engine.store().len(), 1);
}

#[tokio::test]
async fn cancel_while_disconnected_fails_fast() {
    let h = harness();
    h.engine
        .submit_order(limit_intent("clord-1", 100, 15000))
        .await
        .unwrap();
    h.session.set_connected(false);

    let result = h.engine.cancel_order(&ClientOrderId::new("clord-1")).await;

    assert!(matches!(result, Err(EngineError::NotConnected)));
    assert!(h.session.sent_cancels().is_empty());
}

// ============================================
// Full Lifecycle Through the Event Pump
// ============================================

#[tokio::test]
async fn order_fills_completely_with_vwap_average() {
    let h = harness();
    let _pump = spawn_pump(&h);
    let id = ClientOrderId::new("clord-1");

    h.engine
        .submit_order(limit_intent("clord-1", 100, 15010))
        .await
        .unwrap();
    assert_eq!(h.session.sent_orders().len(), 1);

    h.session
        .inject(SessionEvent::ExecutionReport(ack("clord-1", "cpty-1")));
    h.session.inject(SessionEvent::ExecutionReport(fill(
        "cpty-1",
        "exec-1",
        40,
        dec!(150.00),
    )));
    h.session.inject(SessionEvent::ExecutionReport(fill(
        "cpty-1",
        "exec-2",
        60,
        dec!(150.10),
    )));

    wait_for_status(&h.engine, &id, OrderStatus::Filled).await;

    let order = h.engine.store().get(&id).unwrap();
    assert_eq!(order.fill_state().cum_qty(), Quantity::from_i64(100));
    assert!(order.fill_state().leaves_qty().is_zero());
    assert_eq!(order.fill_state().avg_px(), Price::new(dec!(150.06)));
    assert!(order.fill_state().verify_fix_invariant());
}

#[tokio::test]
async fn duplicate_fill_reports_are_idempotent() {
    let h = harness();
    let _pump = spawn_pump(&h);
    let id = ClientOrderId::new("clord-1");

    h.engine
        .submit_order(limit_intent("clord-1", 100, 15000))
        .await
        .unwrap();
    h.session
        .inject(SessionEvent::ExecutionReport(ack("clord-1", "cpty-1")));

    let report = fill("cpty-1", "exec-1", 40, dec!(150.00));
    h.session
        .inject(SessionEvent::ExecutionReport(report.clone()));
    h.session
        .inject(SessionEvent::ExecutionReport(report.clone()));
    h.session.inject(SessionEvent::ExecutionReport(report));

    wait_for_status(&h.engine, &id, OrderStatus::PartiallyFilled).await;
    // Give any stray duplicates time to land.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let order = h.engine.store().get(&id).unwrap();
    assert_eq!(order.fill_state().cum_qty(), Quantity::from_i64(40));
    assert_eq!(order.fill_state().executions().len(), 1);
}

#[tokio::test]
async fn fill_before_ack_activates_the_order() {
    let h = harness();
    let _pump = spawn_pump(&h);
    let id = ClientOrderId::new("clord-1");

    h.engine
        .submit_order(limit_intent("clord-1", 100, 15000))
        .await
        .unwrap();

    // The fill overtakes the ack in transit. It addresses the order by
    // client id since the counterparty id is not yet bound.
    let mut early_fill = fill("cpty-1", "exec-1", 40, dec!(150.00));
    early_fill.client_order_id = Some(id.clone());
    h.session.inject(SessionEvent::ExecutionReport(early_fill));

    wait_for_status(&h.engine, &id, OrderStatus::PartiallyFilled).await;

    // The late ack is bookkeeping: the counterparty id was already
    // bound by the fill, and the status must not regress to New.
    h.session
        .inject(SessionEvent::ExecutionReport(ack("clord-1", "cpty-1")));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let order = h.engine.store().get(&id).unwrap();
    assert_eq!(order.status(), OrderStatus::PartiallyFilled);
    assert_eq!(
        order.counterparty_order_id(),
        Some(&CounterpartyOrderId::new("cpty-1"))
    );
}

// ============================================
// Cancellation Paths
// ============================================

#[tokio::test]
async fn cancel_reject_restores_partially_filled_status() {
    let h = harness();
    let _pump = spawn_pump(&h);
    let id = ClientOrderId::new("clord-1");

    h.engine
        .submit_order(limit_intent("clord-1", 100, 15000))
        .await
        .unwrap();
    h.session
        .inject(SessionEvent::ExecutionReport(ack("clord-1", "cpty-1")));
    h.session.inject(SessionEvent::ExecutionReport(fill(
        "cpty-1",
        "exec-1",
        40,
        dec!(150.00),
    )));
    wait_for_status(&h.engine, &id, OrderStatus::PartiallyFilled).await;

    h.engine.cancel_order(&id).await.unwrap();
    assert_eq!(
        h.engine.store().get(&id).unwrap().status(),
        OrderStatus::PendingCancel
    );

    h.session.inject(SessionEvent::CancelReject(OrderCancelReject {
        client_order_id: id.clone(),
        cancel_request_id: None,
        reason: "Too late to cancel".to_string(),
        transact_time: Timestamp::now(),
    }));

    wait_for_status(&h.engine, &id, OrderStatus::PartiallyFilled).await;
    let order = h.engine.store().get(&id).unwrap();
    assert_eq!(order.fill_state().cum_qty(), Quantity::from_i64(40));
}

#[tokio::test]
async fn cancel_confirm_through_pump_cancels_order() {
    let h = harness();
    let _pump = spawn_pump(&h);
    let id = ClientOrderId::new("clord-1");

    h.engine
        .submit_order(limit_intent("clord-1", 100, 15000))
        .await
        .unwrap();
    h.session
        .inject(SessionEvent::ExecutionReport(ack("clord-1", "cpty-1")));
    wait_for_status(&h.engine, &id, OrderStatus::New).await;

    h.engine.cancel_order(&id).await.unwrap();
    assert_eq!(h.session.sent_cancels().len(), 1);

    let mut confirm = ack("clord-1", "cpty-1");
    confirm.exec_type = ExecType::Canceled;
    h.session.inject(SessionEvent::ExecutionReport(confirm));

    wait_for_status(&h.engine, &id, OrderStatus::Canceled).await;
    let order = h.engine.store().get(&id).unwrap();
    assert_eq!(order.cancel_reason().unwrap().code, "USER_REQUESTED");
}

#[tokio::test]
async fn cancel_unknown_order_returns_not_found() {
    let h = harness();

    let result = h.engine.cancel_order(&ClientOrderId::new("missing")).await;

    assert!(matches!(result, Err(EngineError::NotFound { .. })));
}

#[tokio::test]
async fn fill_racing_a_pending_cancel_keeps_filling() {
    let h = harness();
    let _pump = spawn_pump(&h);
    let id = ClientOrderId::new("clord-1");

    h.engine
        .submit_order(limit_intent("clord-1", 100, 15000))
        .await
        .unwrap();
    h.session
        .inject(SessionEvent::ExecutionReport(ack("clord-1", "cpty-1")));
    wait_for_status(&h.engine, &id, OrderStatus::New).await;
    h.engine.cancel_order(&id).await.unwrap();

    // A fill that was already in flight when the cancel went out.
    h.session.inject(SessionEvent::ExecutionReport(fill(
        "cpty-1",
        "exec-1",
        100,
        dec!(150.00),
    )));

    wait_for_status(&h.engine, &id, OrderStatus::Filled).await;
}

// ============================================
// Anomalies
// ============================================

#[tokio::test]
async fn unmatched_report_leaves_store_untouched() {
    let h = harness();
    let _pump = spawn_pump(&h);
    let id = ClientOrderId::new("clord-1");

    h.engine
        .submit_order(limit_intent("clord-1", 100, 15000))
        .await
        .unwrap();
    h.session.inject(SessionEvent::ExecutionReport(fill(
        "cpty-unknown",
        "exec-1",
        40,
        dec!(150.00),
    )));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let order = h.engine.store().get(&id).unwrap();
    assert_eq!(order.status(), OrderStatus::PendingNew);
    assert!(order.fill_state().cum_qty().is_zero());
}

#[tokio::test]
async fn late_fill_on_terminal_order_is_bookkept_without_status_regress() {
    let h = harness();
    let _pump = spawn_pump(&h);
    let id = ClientOrderId::new("clord-1");

    h.engine
        .submit_order(limit_intent("clord-1", 100, 15000))
        .await
        .unwrap();
    h.session
        .inject(SessionEvent::ExecutionReport(ack("clord-1", "cpty-1")));
    wait_for_status(&h.engine, &id, OrderStatus::New).await;
    h.engine.cancel_order(&id).await.unwrap();

    let mut confirm = ack("clord-1", "cpty-1");
    confirm.exec_type = ExecType::Canceled;
    h.session.inject(SessionEvent::ExecutionReport(confirm));
    wait_for_status(&h.engine, &id, OrderStatus::Canceled).await;

    // A fill the counterparty matched before processing the cancel.
    h.session.inject(SessionEvent::ExecutionReport(fill(
        "cpty-1",
        "exec-late",
        40,
        dec!(150.00),
    )));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let order = h.engine.store().get(&id).unwrap();
    assert_eq!(order.status(), OrderStatus::Canceled);
    assert_eq!(order.fill_state().cum_qty(), Quantity::from_i64(40));
}

// ============================================
// Notifications and Positions
// ============================================

#[tokio::test]
async fn position_projector_tracks_fills_from_the_bus() {
    let h = harness();
    let projector = Arc::new(PositionProjector::new());
    let _projector_task = tokio::spawn(Arc::clone(&projector).run(h.bus.order_updates_rx()));
    let _pump = spawn_pump(&h);
    let id = ClientOrderId::new("clord-1");

    h.engine
        .submit_order(limit_intent("clord-1", 100, 15000))
        .await
        .unwrap();
    h.session
        .inject(SessionEvent::ExecutionReport(ack("clord-1", "cpty-1")));
    h.session.inject(SessionEvent::ExecutionReport(fill(
        "cpty-1",
        "exec-1",
        100,
        dec!(150.00),
    )));
    wait_for_status(&h.engine, &id, OrderStatus::Filled).await;

    // The projector consumes the same bus asynchronously.
    let symbol = Symbol::new("AAPL");
    for _ in 0..100 {
        if projector.position(&symbol).is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let position = projector.position(&symbol).expect("position never appeared");
    assert_eq!(position.net_quantity, dec!(100));
    assert_eq!(position.net_notional, dec!(15000));
}

#[tokio::test]
async fn connection_status_changes_reach_bus_subscribers() {
    let h = harness();
    let _pump = spawn_pump(&h);
    let mut status_rx = h.bus.connection_status_rx();

    h.session.set_connected(false);

    let received = tokio::time::timeout(Duration::from_secs(1), status_rx.recv())
        .await
        .expect("timed out waiting for status")
        .unwrap();
    assert_eq!(received.status, ConnectionStatus::Disconnected);
}

// ============================================
// Dedup Property
// ============================================

proptest! {
    /// Fill accounting depends only on the set of distinct execution
    /// ids, never on how often or in what order reports arrive.
    #[test]
    fn cum_qty_is_sum_over_distinct_execution_ids(
        quantities in prop::collection::vec(1i64..=10, 1..=5),
        delivery in prop::collection::vec(0usize..5, 1..=25),
    ) {
        let total: i64 = quantities.iter().sum();
        let mut order = Order::new(SubmitOrderIntent {
            client_order_id: Some(ClientOrderId::new("clord-prop")),
            symbol: Symbol::new("AAPL"),
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            quantity: Quantity::from_i64(total),
            limit_price: Some(Price::from_cents(15000)),
            time_in_force: TimeInForce::Day,
        }).unwrap();
        order.acknowledge(CounterpartyOrderId::new("cpty-prop")).unwrap();

        // Deliver an arbitrary duplicated, reordered subset first.
        for index in &delivery {
            if let Some(qty) = quantities.get(*index) {
                order.apply_execution(Execution::new(
                    format!("exec-{index}"),
                    Quantity::from_i64(*qty),
                    Price::from_cents(15000),
                    Timestamp::now(),
                )).unwrap();
            }
        }
        // Then every execution once more, so all are seen at least once.
        for (index, qty) in quantities.iter().enumerate() {
            order.apply_execution(Execution::new(
                format!("exec-{index}"),
                Quantity::from_i64(*qty),
                Price::from_cents(15000),
                Timestamp::now(),
            )).unwrap();
        }

        prop_assert_eq!(order.fill_state().cum_qty(), Quantity::from_i64(total));
        prop_assert_eq!(order.status(), OrderStatus::Filled);
        prop_assert!(order.fill_state().verify_fix_invariant());
    }
}
