//! Presence status definitions.

use serde::{Deserialize, Serialize};

/// Remote user presence status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// User has a live connection.
    Online,
    /// User has no live connection.
    Offline,
    /// User is connected but marked away.
    Away,
}

impl PresenceStatus {
    /// Parses from a string, falling back to `Offline` for unknown values.
    pub fn from_str_or_offline(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "online" => Self::Online,
            "away" => Self::Away,
            _ => Self::Offline,
        }
    }

    /// Converts to the wire string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Away => "away",
        }
    }
}
