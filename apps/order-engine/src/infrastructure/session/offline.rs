//! Offline session adapter.
//!
//! Stands in for the counterparty session when no connection is
//! configured. Reports itself disconnected, so submissions park locally
//! and cancels fail fast. Pushes no events.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::application::ports::{
    CancelRequest, FixSessionPort, NewOrderRequest, SessionError, SessionEvent,
};

/// A permanently disconnected session.
#[derive(Debug)]
pub struct OfflineFixSession {
    events_tx: broadcast::Sender<SessionEvent>,
}

impl OfflineFixSession {
    /// Create a new offline session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events_tx: broadcast::channel(1).0,
        }
    }
}

impl Default for OfflineFixSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FixSessionPort for OfflineFixSession {
    fn is_connected(&self) -> bool {
        false
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    async fn send_order(&self, _request: NewOrderRequest) -> Result<(), SessionError> {
        Err(SessionError::NotConnected)
    }

    async fn send_cancel(&self, _request: CancelRequest) -> Result<(), SessionError> {
        Err(SessionError::NotConnected)
    }
}
