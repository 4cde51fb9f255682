//! Domain Layer
//!
//! Pure business logic with no infrastructure dependencies.

pub mod order_lifecycle;
pub mod shared;
