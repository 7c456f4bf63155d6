//! Local notification scheduling.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time;
use tracing::info;

/// A notification presented on this device.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalNotification {
    /// Notification title.
    pub title: String,
    /// Optional body text.
    pub body: Option<String>,
    /// Arbitrary payload attached to the notification.
    pub data: Option<Value>,
}

impl LocalNotification {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: None,
            data: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Delivery surface for local notifications. The platform shell implements
/// this; headless deployments log them.
pub trait NotificationSink: Send + Sync + std::fmt::Debug {
    fn deliver(&self, notification: LocalNotification);
}

/// Sink that writes notifications to the log.
#[derive(Debug, Default)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn deliver(&self, notification: LocalNotification) {
        info!(
            title = %notification.title,
            body = notification.body.as_deref().unwrap_or(""),
            "Local notification"
        );
    }
}

/// Schedules local notifications for immediate or delayed delivery.
#[derive(Debug, Clone)]
pub struct LocalNotifier {
    sink: Arc<dyn NotificationSink>,
}

impl LocalNotifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Delivers a notification immediately.
    pub fn notify(&self, notification: LocalNotification) {
        self.sink.deliver(notification);
    }

    /// Delivers a notification after `delay`. The timer runs on its own
    /// task; dropping the notifier does not cancel it.
    pub fn notify_after(&self, delay: Duration, notification: LocalNotification) {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            time::sleep(delay).await;
            sink.deliver(notification);
        });
    }
}
