//! Order aggregate root.

pub mod order;

pub use order::{Order, PendingCancel, SubmitOrderIntent};
