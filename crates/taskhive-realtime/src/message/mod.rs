//! Wire message types and JSON framing for the realtime protocol.

pub mod types;

pub use types::{ClientMessage, ServerMessage};
