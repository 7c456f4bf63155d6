//! Domain events broadcast to the embedding application.

use taskhive_core::types::UserId;

use crate::presence::status::PresenceStatus;

/// Events emitted by the sync engine.
///
/// Delivered over a `tokio::sync::broadcast` channel; slow subscribers may
/// observe lagged receives and should treat the presence map as the source
/// of truth for current state.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The transport handshake completed and the connection is live.
    Connected,
    /// The connection closed; the retry loop decides what happens next.
    Disconnected {
        /// Close reason reported by the transport, when one was given.
        reason: Option<String>,
    },
    /// A connection attempt failed; retry continues with backoff.
    ConnectFailed {
        /// Transport error description.
        error: String,
    },
    /// A remote user's presence changed.
    PresenceChanged {
        /// User whose status changed.
        user: UserId,
        /// New status.
        status: PresenceStatus,
    },
    /// A message arrived for this client.
    MessageReceived {
        /// Sending user.
        from: UserId,
        /// Message body.
        message: String,
        /// Optional display title.
        title: Option<String>,
        /// Optional structured payload.
        data: Option<serde_json::Value>,
    },
    /// The device push token was registered with the remote peer.
    PushRegistered {
        /// User the registration was sent for.
        user: UserId,
    },
}
