//! Lifecycle gate — maps app foreground/background transitions onto the connection.

use std::sync::Arc;

use tracing::debug;

use crate::connection::ConnectionManager;

/// App lifecycle state reported by the platform shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLifecycleState {
    /// Foreground and receiving input.
    Active,
    /// Foreground but interrupted (call overlay, app switcher).
    Inactive,
    /// Not visible.
    Background,
}

impl AppLifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Background => "background",
        }
    }
}

/// Gates the connection on lifecycle transitions: active resumes, inactive
/// and background suspend. Every transition is handled independently; there
/// is no debounce.
#[derive(Debug)]
pub struct LifecycleGate {
    manager: Arc<ConnectionManager>,
}

impl LifecycleGate {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    /// Applies a lifecycle transition to the connection.
    pub async fn transition(&self, state: AppLifecycleState) {
        debug!(state = state.as_str(), "App lifecycle transition");

        match state {
            AppLifecycleState::Active => self.manager.resume().await,
            AppLifecycleState::Inactive | AppLifecycleState::Background => {
                self.manager.suspend().await;
            }
        }
    }
}
