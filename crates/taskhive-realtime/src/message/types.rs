//! Inbound and outbound wire message definitions.
//!
//! Frames are JSON objects tagged by a `type` field, with camelCase tags
//! and field names matching the external protocol.

use serde::{Deserialize, Serialize};

use taskhive_core::types::{DeviceId, UserId};
use taskhive_core::AppResult;

use crate::presence::status::PresenceStatus;

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Server acknowledgement of a client frame. Logged, no state change.
    Ack,
    /// Another user's presence changed.
    UserStatusChanged {
        /// User whose status changed.
        user: UserId,
        /// New status.
        status: PresenceStatus,
    },
    /// A message addressed to this client.
    NewMessage {
        /// Sending user.
        from: UserId,
        /// Message body.
        message: String,
        /// Optional display title.
        title: Option<String>,
        /// Optional structured payload.
        data: Option<serde_json::Value>,
    },
    /// Server-reported error. Logged, no state change.
    Error {
        /// Error description.
        message: String,
    },
}

impl ServerMessage {
    /// Decode a text frame into a server message.
    pub fn decode(text: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Authentication payload, sent as the first frame after the socket
    /// opens.
    Handshake {
        /// Opaque session token.
        token: String,
        /// Device installation identifier.
        device_id: DeviceId,
    },
    /// Push token registration for the authenticated user.
    RegisterPushToken {
        /// User the token belongs to.
        user_id: UserId,
        /// Opaque push delivery token.
        token: String,
    },
}

impl ClientMessage {
    /// Encode this message as a text frame.
    pub fn encode(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
