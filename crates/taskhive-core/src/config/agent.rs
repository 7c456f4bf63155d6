//! Agent credentials and identity configuration.

use serde::{Deserialize, Serialize};

/// Credentials the headless agent logs in with.
///
/// On a device these come from the platform login flow; the agent reads
/// them from configuration instead. When `auth_token` or `user_id` is
/// absent the agent starts logged out and holds no connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Opaque authentication token presented in the realtime handshake.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Identifier of the authenticated user.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Device identifier. Generated per process when absent.
    #[serde(default)]
    pub device_id: Option<String>,
}
