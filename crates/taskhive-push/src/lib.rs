//! # taskhive-push
//!
//! Push capability for the TaskHive sync client:
//!
//! - Device token acquisition behind [`token::PushTokenProvider`]
//! - Delivery through the external push relay ([`relay::RelayClient`])
//! - Local notification scheduling ([`local::LocalNotifier`])

pub mod local;
pub mod relay;
pub mod token;

pub use local::{LocalNotification, LocalNotifier, NotificationSink, TracingNotificationSink};
pub use relay::{PushMessage, RelayClient};
pub use token::{PushToken, PushTokenProvider, StaticTokenProvider};
