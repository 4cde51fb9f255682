//! Shared value objects.

pub mod identifiers;
pub mod price;
pub mod quantity;
pub mod symbol;
pub mod timestamp;

pub use identifiers::{CancelRequestId, ClientOrderId, CounterpartyOrderId, ExecutionId};
pub use price::Price;
pub use quantity::Quantity;
pub use symbol::Symbol;
pub use timestamp::Timestamp;
