//! Notification Bus
//!
//! Fans engine outcomes out to in-process subscribers (UI surfaces, the
//! position projector, loggers) over tokio broadcast channels.
//!
//! # Architecture
//!
//! The `NotificationBus` provides separate channels per notification type:
//! - Order updates: a full order snapshot plus the domain events that
//!   produced it, published after every successful mutation
//! - Connection status changes from the counterparty session
//!
//! Each channel supports multiple receivers with configurable capacity.
//! Slow subscribers lag and drop the oldest messages; they never block
//! the engine.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::application::ports::ConnectionStatus;
use crate::domain::order_lifecycle::{Order, OrderEvent};

// =============================================================================
// Broadcast Messages
// =============================================================================

/// Order update broadcast message.
///
/// Carries a point-in-time snapshot of the order after a mutation, plus
/// the domain events the mutation emitted. Subscribers that only care
/// about current state read the snapshot; event-driven subscribers (the
/// position projector) read the events.
#[derive(Debug, Clone)]
pub struct OrderUpdateBroadcast {
    /// Snapshot of the order after the mutation.
    pub order: Order,
    /// Domain events emitted by the mutation, in order.
    pub events: Vec<OrderEvent>,
}

/// Connection status broadcast message.
#[derive(Debug, Clone)]
pub struct ConnectionStatusBroadcast {
    /// The new connection status.
    pub status: ConnectionStatus,
}

// =============================================================================
// Notification Bus
// =============================================================================

/// Configuration for notification channel capacities.
#[derive(Debug, Clone, Copy)]
pub struct BusConfig {
    /// Capacity for the order update channel.
    pub order_updates_capacity: usize,
    /// Capacity for the connection status channel.
    pub connection_status_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            order_updates_capacity: 1_000,
            connection_status_capacity: 64,
        }
    }
}

/// Central hub for engine notifications.
///
/// Provides separate channels per notification type with configurable
/// capacities. Supports multiple receivers per channel.
#[derive(Debug)]
pub struct NotificationBus {
    order_updates_tx: broadcast::Sender<OrderUpdateBroadcast>,
    connection_status_tx: broadcast::Sender<ConnectionStatusBroadcast>,
}

impl NotificationBus {
    /// Create a new notification bus with the given configuration.
    #[must_use]
    pub fn new(config: BusConfig) -> Self {
        Self {
            order_updates_tx: broadcast::channel(config.order_updates_capacity).0,
            connection_status_tx: broadcast::channel(config.connection_status_capacity).0,
        }
    }

    /// Create a new notification bus with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(BusConfig::default())
    }

    // =========================================================================
    // Order Update Channel
    // =========================================================================

    /// Publish an order update to all subscribers.
    ///
    /// Returns the number of receivers that got the message, or `None`
    /// if there are no active receivers.
    pub fn publish_order_update(&self, order: Order, events: Vec<OrderEvent>) -> Option<usize> {
        self.order_updates_tx
            .send(OrderUpdateBroadcast { order, events })
            .ok()
    }

    /// Get a new receiver for order updates.
    #[must_use]
    pub fn order_updates_rx(&self) -> broadcast::Receiver<OrderUpdateBroadcast> {
        self.order_updates_tx.subscribe()
    }

    /// Get the number of active order update receivers.
    #[must_use]
    pub fn order_updates_receiver_count(&self) -> usize {
        self.order_updates_tx.receiver_count()
    }

    // =========================================================================
    // Connection Status Channel
    // =========================================================================

    /// Publish a connection status change to all subscribers.
    pub fn publish_connection_status(&self, status: ConnectionStatus) -> Option<usize> {
        self.connection_status_tx
            .send(ConnectionStatusBroadcast { status })
            .ok()
    }

    /// Get a new receiver for connection status changes.
    #[must_use]
    pub fn connection_status_rx(&self) -> broadcast::Receiver<ConnectionStatusBroadcast> {
        self.connection_status_tx.subscribe()
    }

    /// Get the number of active connection status receivers.
    #[must_use]
    pub fn connection_status_receiver_count(&self) -> usize {
        self.connection_status_tx.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Shared notification bus reference.
pub type SharedNotificationBus = Arc<NotificationBus>;

// =============================================================================
// Tests
// =============================================================================
