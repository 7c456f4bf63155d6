//! Device push token acquisition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use taskhive_core::config::PushConfig;
use taskhive_core::AppResult;

/// Opaque delivery token issued by the platform notification service.
///
/// Cached in process memory for the process lifetime; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PushToken(String);

impl PushToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PushToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PushToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PushToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Source of the device push token.
///
/// Resolution may legitimately yield no token (unsupported platform,
/// notification permission denied); that is not an error.
#[async_trait]
pub trait PushTokenProvider: Send + Sync + std::fmt::Debug {
    /// Requests notification permission and resolves the delivery token.
    async fn request_token(&self) -> AppResult<Option<PushToken>>;
}

/// Provider that serves a token straight from configuration, for headless
/// deployments without a platform notification service.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: Option<PushToken>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<PushToken>) -> Self {
        Self { token }
    }

    /// Builds the provider from the push configuration section.
    pub fn from_config(config: &PushConfig) -> Self {
        Self {
            token: config.device_token.as_deref().map(PushToken::from),
        }
    }
}

#[async_trait]
impl PushTokenProvider for StaticTokenProvider {
    async fn request_token(&self) -> AppResult<Option<PushToken>> {
        Ok(self.token.clone())
    }
}
