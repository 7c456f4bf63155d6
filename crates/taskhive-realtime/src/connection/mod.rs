//! Connection lifecycle — credentials, backoff, and the single-slot manager.

pub mod backoff;
pub mod credentials;
pub mod manager;

pub use credentials::SessionCredentials;
pub use manager::ConnectionManager;

/// Observable connection lifecycle state.
///
/// `Disconnected` is always retryable: the supervisor keeps attempting to
/// reconnect until the credentials go away or the session is suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No credentials to connect with.
    NoConnection,
    /// A connection attempt is in flight.
    Connecting,
    /// The transport handshake succeeded and events are flowing.
    Connected,
    /// The transport dropped or an attempt failed; retry is pending.
    Disconnected,
}

impl ConnectionState {
    /// Whether the connection is live.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}
