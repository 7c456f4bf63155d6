//! Local preference store configuration.

use serde::{Deserialize, Serialize};

/// Preference persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefsConfig {
    /// Path to the JSON preference document.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for PrefsConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> String {
    "data/preferences.json".to_string()
}
