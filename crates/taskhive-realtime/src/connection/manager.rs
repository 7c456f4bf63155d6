//! Connection manager — owns the single connection slot and its supervisor task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use taskhive_core::config::RealtimeConfig;

use crate::connection::backoff::LinearBackoff;
use crate::connection::credentials::SessionCredentials;
use crate::connection::ConnectionState;
use crate::event::ClientEvent;
use crate::message::ServerMessage;
use crate::presence::PresenceReconciler;
use crate::push::PushRegistrar;
use crate::transport::{Connector, TransportEvent, TransportPair};

/// Manages the process-wide realtime connection.
///
/// At most one connection is live at any instant. Each credential set spawns
/// a supervisor task that connects, dispatches inbound events, and retries
/// forever with bounded linear backoff. Replacing or clearing credentials
/// cancels the supervisor and waits for it to exit before anything else
/// happens, so events from a dead connection are never dispatched.
pub struct ConnectionManager {
    /// Transport factory.
    connector: Arc<dyn Connector>,
    /// Sole writer of the presence mapping.
    reconciler: Arc<PresenceReconciler>,
    /// Push-token registration latch.
    registrar: Arc<PushRegistrar>,
    /// Domain event broadcast.
    events: broadcast::Sender<ClientEvent>,
    /// Credential slot and supervisor handle.
    state: Mutex<ManagerState>,
    /// Observable connection state.
    state_tx: Arc<watch::Sender<ConnectionState>>,
    /// Monotonic counter identifying each established connection.
    generations: Arc<AtomicU64>,
    /// Configuration.
    config: RealtimeConfig,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager").finish()
    }
}

#[derive(Debug, Default)]
struct ManagerState {
    credentials: Option<SessionCredentials>,
    supervisor: Option<SupervisorHandle>,
    suspended: bool,
}

#[derive(Debug)]
struct SupervisorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ConnectionManager {
    /// Creates a new connection manager. No connection exists until
    /// credentials are set.
    pub fn new(
        config: RealtimeConfig,
        connector: Arc<dyn Connector>,
        reconciler: Arc<PresenceReconciler>,
        registrar: Arc<PushRegistrar>,
        events: broadcast::Sender<ClientEvent>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::NoConnection);

        Self {
            connector,
            reconciler,
            registrar,
            events,
            state: Mutex::new(ManagerState::default()),
            state_tx: Arc::new(state_tx),
            generations: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    /// Stores credentials and connects.
    ///
    /// Setting identical credentials is a no-op. Different credentials tear
    /// the current connection down (waiting for its supervisor to exit)
    /// before a new one is started. While suspended, credentials are stored
    /// and the connection is established on the next resume.
    pub async fn set_credentials(&self, credentials: SessionCredentials) {
        let mut state = self.state.lock().await;

        if state.credentials.as_ref() == Some(&credentials)
            && (state.supervisor.is_some() || state.suspended)
        {
            debug!(user_id = %credentials.user_id, "Credentials unchanged, keeping connection");
            return;
        }

        Self::teardown(&mut state).await;

        let user_id = credentials.user_id.clone();
        state.credentials = Some(credentials.clone());

        if state.suspended {
            info!(user_id = %user_id, "Credentials stored while suspended, connecting on resume");
            self.state_tx.send_replace(ConnectionState::Disconnected);
            return;
        }

        self.state_tx.send_replace(ConnectionState::Connecting);
        state.supervisor = Some(self.spawn_supervisor(credentials));

        info!(user_id = %user_id, "Credentials set, connection supervisor started");
    }

    /// Clears credentials and releases any connection (logout).
    ///
    /// Event consumption stops before the transport closes; no events from
    /// the old connection are dispatched afterwards.
    pub async fn clear_credentials(&self) {
        let mut state = self.state.lock().await;

        if state.credentials.is_none() && state.supervisor.is_none() {
            return;
        }

        state.credentials = None;
        Self::teardown(&mut state).await;
        self.state_tx.send_replace(ConnectionState::NoConnection);

        info!("Credentials cleared, connection released");
    }

    /// Releases the connection and stops retrying while the app is
    /// backgrounded. Credentials are kept for the next resume.
    pub async fn suspend(&self) {
        let mut state = self.state.lock().await;

        if state.suspended {
            return;
        }

        state.suspended = true;
        let had_supervisor = state.supervisor.is_some();
        Self::teardown(&mut state).await;

        if state.credentials.is_some() {
            self.state_tx.send_replace(ConnectionState::Disconnected);
        }

        if had_supervisor {
            info!("Session suspended, connection released");
        }
    }

    /// Reconnects immediately after a suspend, skipping any backoff delay
    /// that was pending when the session was suspended.
    pub async fn resume(&self) {
        let mut state = self.state.lock().await;

        if !state.suspended {
            return;
        }

        state.suspended = false;

        if let Some(credentials) = state.credentials.clone() {
            if state.supervisor.is_none() {
                self.state_tx.send_replace(ConnectionState::Connecting);
                state.supervisor = Some(self.spawn_supervisor(credentials));
                info!("Session resumed, reconnecting");
            }
        }
    }

    /// Releases the connection for process shutdown.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        Self::teardown(&mut state).await;
        self.state_tx.send_replace(ConnectionState::NoConnection);

        info!("Connection manager shut down");
    }

    /// Current state of the connection slot.
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Returns a receiver observing connection state transitions.
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Generation of the most recently established connection.
    pub fn current_generation(&self) -> u64 {
        self.generations.load(Ordering::Relaxed)
    }

    /// Cancels the running supervisor and waits for it to exit, so a
    /// replacement can never overlap with the connection it replaces.
    async fn teardown(state: &mut ManagerState) {
        if let Some(supervisor) = state.supervisor.take() {
            supervisor.cancel.cancel();
            if let Err(e) = supervisor.task.await {
                warn!(error = %e, "Connection supervisor ended abnormally");
            }
        }
    }

    fn spawn_supervisor(&self, credentials: SessionCredentials) -> SupervisorHandle {
        let cancel = CancellationToken::new();
        let supervisor = Supervisor {
            credentials,
            connector: self.connector.clone(),
            reconciler: self.reconciler.clone(),
            registrar: self.registrar.clone(),
            events: self.events.clone(),
            state_tx: self.state_tx.clone(),
            generations: self.generations.clone(),
            backoff: LinearBackoff::new(
                Duration::from_millis(self.config.reconnect_min_delay_ms),
                Duration::from_millis(self.config.reconnect_max_delay_ms),
            ),
        };
        let task = tokio::spawn(supervisor.run(cancel.clone()));

        SupervisorHandle { cancel, task }
    }
}

/// How a live connection ended.
enum ConnectionEnd {
    /// Teardown was requested; exit silently.
    Cancelled,
    /// The transport closed on its own; reconnect.
    Closed { reason: Option<String> },
}

/// Per-credential connect/consume/retry loop. One supervisor runs per
/// credential set; it is the single consumer of the transport's events.
struct Supervisor {
    credentials: SessionCredentials,
    connector: Arc<dyn Connector>,
    reconciler: Arc<PresenceReconciler>,
    registrar: Arc<PushRegistrar>,
    events: broadcast::Sender<ClientEvent>,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    generations: Arc<AtomicU64>,
    backoff: LinearBackoff,
}

impl Supervisor {
    async fn run(mut self, cancel: CancellationToken) {
        loop {
            self.state_tx.send_replace(ConnectionState::Connecting);

            let attempt = tokio::select! {
                _ = cancel.cancelled() => return,
                result = self.connector.connect(&self.credentials) => result,
            };

            match attempt {
                Ok(transport) => {
                    let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
                    self.backoff.reset();
                    self.state_tx.send_replace(ConnectionState::Connected);
                    let _ = self.events.send(ClientEvent::Connected);
                    self.registrar.connection_ready(
                        generation,
                        self.credentials.user_id.clone(),
                        transport.outbound.clone(),
                    );

                    info!(
                        generation,
                        user_id = %self.credentials.user_id,
                        "Realtime connection established"
                    );

                    let end = self.consume(transport, &cancel).await;
                    self.registrar.connection_lost(generation);

                    match end {
                        ConnectionEnd::Cancelled => return,
                        ConnectionEnd::Closed { reason } => {
                            info!(
                                generation,
                                reason = reason.as_deref().unwrap_or("none"),
                                "Realtime connection closed"
                            );
                            self.state_tx.send_replace(ConnectionState::Disconnected);
                            let _ = self.events.send(ClientEvent::Disconnected { reason });
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Realtime connect failed");
                    self.state_tx.send_replace(ConnectionState::Disconnected);
                    let _ = self.events.send(ClientEvent::ConnectFailed {
                        error: e.to_string(),
                    });
                }
            }

            let delay = self.backoff.next_delay();
            debug!(
                attempt = self.backoff.attempt(),
                delay_ms = delay.as_millis() as u64,
                "Waiting before reconnect"
            );

            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Consumes transport events until the connection closes or teardown is
    /// requested. Returning drops the transport pair, which closes the
    /// underlying socket — consumption always stops first.
    async fn consume(&self, mut transport: TransportPair, cancel: &CancellationToken) -> ConnectionEnd {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return ConnectionEnd::Cancelled,
                event = transport.inbound.recv() => match event {
                    Some(TransportEvent::Message(message)) => self.dispatch(message),
                    Some(TransportEvent::Closed { reason }) => {
                        return ConnectionEnd::Closed { reason };
                    }
                    None => return ConnectionEnd::Closed { reason: None },
                },
            }
        }
    }

    fn dispatch(&self, message: ServerMessage) {
        match message {
            ServerMessage::Ack => {
                debug!("Server acknowledged handshake");
            }
            ServerMessage::UserStatusChanged { user, status } => {
                self.reconciler.apply(user.clone(), status);
                let _ = self
                    .events
                    .send(ClientEvent::PresenceChanged { user, status });
            }
            ServerMessage::NewMessage {
                from,
                message,
                title,
                data,
            } => {
                debug!(from = %from, "Message received");
                let _ = self.events.send(ClientEvent::MessageReceived {
                    from,
                    message,
                    title,
                    data,
                });
            }
            ServerMessage::Error { message } => {
                warn!(message = %message, "Server reported an error");
            }
        }
    }
}
