//! Domain services for the order lifecycle context.

pub mod order_state_machine;

pub use order_state_machine::OrderStateMachine;
