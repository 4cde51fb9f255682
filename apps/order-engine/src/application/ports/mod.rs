//! Application Ports
//!
//! Boundary interfaces between the engine and the outside world.

pub mod fix_session_port;

pub use fix_session_port::{
    CancelRequest, ConnectionStatus, ExecType, ExecutionReport, FixSessionPort, NewOrderRequest,
    OrderCancelReject, SessionError, SessionEvent,
};
