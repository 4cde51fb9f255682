// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Order Engine - Order and Execution Reconciliation
//!
//! Core library of the order engine: a process-local order store and
//! lifecycle state machine that reconciles user commands against the
//! asynchronous report stream of a FIX counterparty session.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, domain events)
//!   - `order_lifecycle`: Order aggregate, status state machine, fill
//!     accounting under `OrderQty = CumQty + LeavesQty`
//!   - `shared`: Identifiers, quantities, prices, timestamps
//!
//! - **Application**: Orchestration
//!   - `ports`: Interface to the counterparty session (`FixSessionPort`)
//!   - `engine`: Command handling and report reconciliation
//!   - `store`: Concurrent in-memory order store
//!   - `bus`: Notification fan-out to subscribers
//!   - `positions`: Net position projection from fills
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `session`: Offline and simulated session adapters
//!
//! # Delivery Model
//!
//! Counterparty reports are at-least-once and may arrive out of order.
//! Fills deduplicate on execution id; terminal statuses never regress.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Engine, store, bus, and port definitions.
pub mod application;

/// Infrastructure layer - Session adapters.
pub mod infrastructure;

/// Configuration parsed from the environment.
pub mod config;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::order_lifecycle::{
    Execution, FillState, Order, OrderError, OrderEvent, OrderSide, OrderStatus, OrderType,
    SubmitOrderIntent, TimeInForce,
};
pub use domain::shared::{
    CancelRequestId, ClientOrderId, CounterpartyOrderId, ExecutionId, Price, Quantity, Symbol,
    Timestamp,
};

// Application re-exports
pub use application::ports::{
    CancelRequest, ConnectionStatus, ExecType, ExecutionReport, FixSessionPort, NewOrderRequest,
    OrderCancelReject, SessionError, SessionEvent,
};
pub use application::{
    EngineError, NotificationBus, OrderLifecycleEngine, OrderStore, Position, PositionProjector,
    StoreError,
};

// Infrastructure re-exports
pub use infrastructure::session::{OfflineFixSession, SimulatedFixSession};

// Configuration re-exports
pub use config::{EngineConfig, SessionMode};
