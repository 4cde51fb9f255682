//! Session adapters implementing the FIX session port.

pub mod offline;
pub mod simulated;

pub use offline::OfflineFixSession;
pub use simulated::SimulatedFixSession;
