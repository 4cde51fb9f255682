//! Infrastructure Layer
//!
//! Concrete adapters behind the application ports.

pub mod session;
