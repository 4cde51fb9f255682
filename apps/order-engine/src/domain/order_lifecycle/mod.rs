//! Order Lifecycle Bounded Context
//!
//! Manages the complete order lifecycle from submission to completion,
//! reconciling user commands with asynchronous counterparty reports under
//! FIX protocol semantics.
//!
//! # Key Concepts
//!
//! - **Order Aggregate**: The root entity managing order state transitions
//! - **Fill State**: FIX-compliant tracking with `OrderQty = CumQty + LeavesQty`
//! - **Execution Dedup**: At-least-once reports keyed by execution id
//! - **Domain Events**: Capturing all state transitions

pub mod aggregate;
pub mod errors;
pub mod events;
pub mod services;
pub mod value_objects;

pub use aggregate::{Order, PendingCancel, SubmitOrderIntent};
pub use errors::OrderError;
pub use events::{
    OrderAcknowledged, OrderCancelRejected, OrderCancelRequested, OrderCanceled, OrderEvent,
    OrderExpired, OrderFilled, OrderPartiallyFilled, OrderRejected, OrderSubmitted,
};
pub use services::OrderStateMachine;
pub use value_objects::{
    CancelReason, Execution, FillApplication, FillState, OrderSide, OrderStatus, OrderType,
    RejectReason, TimeInForce,
};
