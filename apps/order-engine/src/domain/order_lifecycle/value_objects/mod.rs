//! Value objects for the order lifecycle context.

pub mod execution;
pub mod fill_state;
pub mod order_side;
pub mod order_status;
pub mod order_type;
pub mod reasons;
pub mod time_in_force;

pub use execution::Execution;
pub use fill_state::{FillApplication, FillState};
pub use order_side::OrderSide;
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use reasons::{CancelReason, RejectReason};
pub use time_in_force::TimeInForce;
