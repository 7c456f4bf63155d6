//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a default so the client runs with no
//! configuration files present at all.

pub mod agent;
pub mod logging;
pub mod prefs;
pub mod push;
pub mod realtime;

use serde::{Deserialize, Serialize};

pub use self::agent::AgentConfig;
pub use self::logging::LoggingConfig;
pub use self::prefs::PrefsConfig;
pub use self::push::PushConfig;
pub use self::realtime::RealtimeConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Agent credentials and identity.
    #[serde(default)]
    pub agent: AgentConfig,
    /// Realtime connection settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Push token and relay settings.
    #[serde(default)]
    pub push: PushConfig,
    /// Local preference store settings.
    #[serde(default)]
    pub prefs: PrefsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `TASKHIVE_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TASKHIVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
