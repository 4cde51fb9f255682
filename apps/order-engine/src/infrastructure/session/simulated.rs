//! Simulated session adapter.
//!
//! A session double for development and testing. Records every outbound
//! message and lets a driver inject inbound events, including the
//! duplicate and out-of-order deliveries a real counterparty produces.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::application::ports::{
    CancelRequest, ConnectionStatus, FixSessionPort, NewOrderRequest, SessionError, SessionEvent,
};

/// In-process stand-in for a counterparty FIX session.
#[derive(Debug)]
pub struct SimulatedFixSession {
    connected: AtomicBool,
    events_tx: broadcast::Sender<SessionEvent>,
    sent_orders: Mutex<Vec<NewOrderRequest>>,
    sent_cancels: Mutex<Vec<CancelRequest>>,
}

impl SimulatedFixSession {
    /// Create a new simulated session, initially connected.
    #[must_use]
    pub fn new(event_capacity: usize) -> Self {
        Self {
            connected: AtomicBool::new(true),
            events_tx: broadcast::channel(event_capacity).0,
            sent_orders: Mutex::new(Vec::new()),
            sent_cancels: Mutex::new(Vec::new()),
        }
    }

    /// Flip the connection state and push the matching status event.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
        let status = if connected {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        };
        let _ = self.events_tx.send(SessionEvent::ConnectionStatus(status));
    }

    /// Inject an inbound event, as if the counterparty had sent it.
    ///
    /// Returns the number of receivers, or `None` if nobody listens.
    pub fn inject(&self, event: SessionEvent) -> Option<usize> {
        self.events_tx.send(event).ok()
    }

    /// Orders sent so far, oldest first.
    #[must_use]
    pub fn sent_orders(&self) -> Vec<NewOrderRequest> {
        self.sent_orders.lock().unwrap().clone()
    }

    /// Cancel requests sent so far, oldest first.
    #[must_use]
    pub fn sent_cancels(&self) -> Vec<CancelRequest> {
        self.sent_cancels.lock().unwrap().clone()
    }
}

impl Default for SimulatedFixSession {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl FixSessionPort for SimulatedFixSession {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    async fn send_order(&self, request: NewOrderRequest) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        debug!(client_order_id = %request.client_order_id, "Simulated session accepted order");
        self.sent_orders.lock().unwrap().push(request);
        Ok(())
    }

    async fn send_cancel(&self, request: CancelRequest) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        debug!(
            client_order_id = %request.client_order_id,
            cancel_request_id = %request.cancel_request_id,
            "Simulated session accepted cancel"
        );
        self.sent_cancels.lock().unwrap().push(request);
        Ok(())
    }
}
