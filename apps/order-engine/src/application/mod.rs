//! Application Layer
//!
//! Orchestrates the order lifecycle: commands in, counterparty reports
//! reconciled, notifications out. Depends on the domain layer and on
//! ports; never on concrete infrastructure.

pub mod bus;
pub mod engine;
pub mod ports;
pub mod positions;
pub mod store;

pub use bus::{
    BusConfig, ConnectionStatusBroadcast, NotificationBus, OrderUpdateBroadcast,
    SharedNotificationBus,
};
pub use engine::{EngineError, OrderLifecycleEngine};
pub use positions::{Position, PositionProjector};
pub use store::{OrderStore, StoreError};
