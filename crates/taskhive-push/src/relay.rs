//! Push relay client — remote notification delivery over HTTP.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use taskhive_core::config::PushConfig;
use taskhive_core::error::AppError;
use taskhive_core::AppResult;

use crate::token::PushToken;

/// A push message addressed to a device token.
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    /// Destination device token.
    pub to: String,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Arbitrary payload forwarded to the receiving app.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl PushMessage {
    pub fn new(to: &PushToken, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.as_str().to_string(),
            title: title.into(),
            body: body.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// HTTP client for the external push relay endpoint.
///
/// Delivery failures are returned to the caller; reporting them is the
/// caller's concern.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    url: String,
}

impl RelayClient {
    /// Creates a relay client from the push configuration.
    pub fn new(config: &PushConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::external_service(format!("Failed to build relay HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            url: config.relay_url.clone(),
        })
    }

    /// Sends one notification through the relay.
    pub async fn send(&self, message: &PushMessage) -> AppResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Push relay request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(format!(
                "Push relay returned {status}: {detail}"
            )));
        }

        debug!(status = %status, "Push relay accepted notification");
        Ok(())
    }
}
