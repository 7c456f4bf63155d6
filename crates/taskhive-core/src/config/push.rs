//! Push token and relay configuration.

use serde::{Deserialize, Serialize};

/// Push capability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Push relay endpoint for remote delivery.
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    /// Relay request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Device push token. Absent on hosts without push support, which
    /// disables push registration without failing the connection flow.
    #[serde(default)]
    pub device_token: Option<String>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            request_timeout_seconds: default_request_timeout(),
            device_token: None,
        }
    }
}

fn default_relay_url() -> String {
    "https://exp.host/--/api/v2/push/send".to_string()
}

fn default_request_timeout() -> u64 {
    10
}
