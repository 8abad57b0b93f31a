//! Engine infrastructure module
//!
//! Client side of the background engine's socket protocol.

pub mod protocol;
mod socket;

pub use socket::{pump_events, SocketEngine, SocketPath};
