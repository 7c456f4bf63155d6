//! Realtime connection configuration.

use serde::{Deserialize, Serialize};

/// Realtime (WebSocket) connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Realtime endpoint URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Minimum delay between reconnection attempts in milliseconds.
    #[serde(default = "default_min_delay")]
    pub reconnect_min_delay_ms: u64,
    /// Maximum delay between reconnection attempts in milliseconds.
    #[serde(default = "default_max_delay")]
    pub reconnect_max_delay_ms: u64,
    /// Internal channel buffer size for transport and event channels.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect_min_delay_ms: default_min_delay(),
            reconnect_max_delay_ms: default_max_delay(),
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_url() -> String {
    "wss://realtime.taskhive.dev/ws".to_string()
}

fn default_min_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    10000
}

fn default_channel_buffer() -> usize {
    256
}
