//! Session credentials handed to the connection manager at login.

use serde::{Deserialize, Serialize};
use taskhive_core::types::{DeviceId, UserId};

/// Everything the transport needs to open an authenticated session.
///
/// Credentials are compared as a whole: setting an identical value on the
/// manager is a no-op, while any field change tears the current connection
/// down and builds a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    /// Opaque bearer token, sent in the handshake frame.
    pub token: String,
    /// The authenticated user.
    pub user_id: UserId,
    /// Stable identifier for this installation.
    pub device_id: DeviceId,
}

impl SessionCredentials {
    pub fn new(
        token: impl Into<String>,
        user_id: impl Into<UserId>,
        device_id: impl Into<DeviceId>,
    ) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            device_id: device_id.into(),
        }
    }
}
