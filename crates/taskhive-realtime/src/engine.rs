//! Top-level sync engine that ties together all realtime subsystems.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use taskhive_core::config::RealtimeConfig;
use taskhive_push::token::PushTokenProvider;

use crate::connection::{ConnectionManager, ConnectionState, SessionCredentials};
use crate::event::ClientEvent;
use crate::lifecycle::{AppLifecycleState, LifecycleGate};
use crate::presence::PresenceReconciler;
use crate::push::PushRegistrar;
use crate::transport::Connector;

/// Central engine coordinating the realtime sync subsystems.
#[derive(Clone)]
pub struct SyncEngine {
    /// Connection slot owner.
    pub connection: Arc<ConnectionManager>,
    /// Presence mapping.
    pub presence: Arc<PresenceReconciler>,
    /// Push token registration latch.
    pub push: Arc<PushRegistrar>,
    /// Lifecycle gate.
    pub lifecycle: Arc<LifecycleGate>,
    /// Domain event broadcast.
    events: broadcast::Sender<ClientEvent>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine").finish()
    }
}

impl SyncEngine {
    /// Creates the engine and starts resolving the device push token in the
    /// background. No connection exists until [`SyncEngine::login`].
    pub fn new(
        config: RealtimeConfig,
        connector: Arc<dyn Connector>,
        token_provider: Arc<dyn PushTokenProvider>,
    ) -> Self {
        let (events, _) = broadcast::channel(config.channel_buffer_size);

        let presence = Arc::new(PresenceReconciler::new());
        let push = Arc::new(PushRegistrar::new(events.clone()));
        let connection = Arc::new(ConnectionManager::new(
            config,
            connector,
            presence.clone(),
            push.clone(),
            events.clone(),
        ));
        let lifecycle = Arc::new(LifecycleGate::new(connection.clone()));

        // Token resolution runs independently of the connection; the
        // registrar pairs whichever side completes second with the first.
        let registrar = push.clone();
        tokio::spawn(async move {
            match token_provider.request_token().await {
                Ok(token) => registrar.token_resolved(token),
                Err(e) => {
                    warn!(error = %e, "Push token acquisition failed, continuing without push");
                    registrar.token_resolved(None);
                }
            }
        });

        info!("Sync engine initialized");

        Self {
            connection,
            presence,
            push,
            lifecycle,
            events,
        }
    }

    /// Subscribes to domain events.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Stores credentials and connects.
    pub async fn login(&self, credentials: SessionCredentials) {
        self.connection.set_credentials(credentials).await;
    }

    /// Clears credentials and releases the connection.
    ///
    /// Presence entries are kept; they only change on inbound status events.
    pub async fn logout(&self) {
        self.connection.clear_credentials().await;
    }

    /// Applies an app lifecycle transition.
    pub async fn app_state_changed(&self, state: AppLifecycleState) {
        self.lifecycle.transition(state).await;
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Receiver observing connection state transitions.
    pub fn connection_state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.connection.state_receiver()
    }

    /// Initiates a graceful shutdown of the engine.
    pub async fn shutdown(&self) {
        info!("Shutting down sync engine");
        self.connection.shutdown().await;
        info!("Sync engine shut down");
    }
}
