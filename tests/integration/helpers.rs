//! Shared test helpers for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use taskhive_core::config::RealtimeConfig;
use taskhive_core::AppResult;
use taskhive_push::token::{PushToken, PushTokenProvider, StaticTokenProvider};
use taskhive_realtime::{
    ClientEvent, ConnectionState, SessionCredentials, SyncEngine, WsConnector,
};

/// Upper bound for any single wait in a test.
pub const WAIT: Duration = Duration::from_secs(5);

/// Window after which we declare that an expected non-event did not happen.
pub const QUIET: Duration = Duration::from_millis(200);

/// In-process WebSocket endpoint standing in for the realtime server.
///
/// Binds a loopback listener and hands each accepted connection to the
/// test as a [`ServerSession`], in accept order.
pub struct TestServer {
    /// URL for the client side to connect to.
    pub url: String,
    sessions: Mutex<mpsc::UnboundedReceiver<ServerSession>>,
    accepted: Arc<AtomicUsize>,
    reject: Arc<AtomicUsize>,
}

impl TestServer {
    /// Bind a listener on an ephemeral port and start accepting.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener
            .local_addr()
            .expect("Failed to read listener address");

        let accepted = Arc::new(AtomicUsize::new(0));
        let reject = Arc::new(AtomicUsize::new(0));
        let (session_tx, session_rx) = mpsc::unbounded_channel();

        let counter = Arc::clone(&accepted);
        let reject_budget = Arc::clone(&reject);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                // Dropping the socket before the upgrade fails the
                // client's connect attempt.
                if reject_budget
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
                {
                    drop(stream);
                    continue;
                }
                let socket = match tokio_tungstenite::accept_async(stream).await {
                    Ok(socket) => socket,
                    Err(_) => continue,
                };
                counter.fetch_add(1, Ordering::SeqCst);
                if session_tx.send(ServerSession::spawn(socket)).is_err() {
                    return;
                }
            }
        });

        Self {
            url: format!("ws://{}", addr),
            sessions: Mutex::new(session_rx),
            accepted,
            reject,
        }
    }

    /// Make the next `count` connection attempts fail before the upgrade.
    pub fn reject_next(&self, count: usize) {
        self.reject.store(count, Ordering::SeqCst);
    }

    /// Wait for the next client connection.
    pub async fn accept(&self) -> ServerSession {
        let mut sessions = self.sessions.lock().await;
        tokio::time::timeout(WAIT, sessions.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("listener task ended")
    }

    /// Total number of connections accepted so far.
    pub fn connection_count(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Assert that no new connection arrives within [`QUIET`].
    pub async fn assert_no_connect(&self) {
        let mut sessions = self.sessions.lock().await;
        if tokio::time::timeout(QUIET, sessions.recv()).await.is_ok() {
            panic!("unexpected connection");
        }
    }
}

/// Server side of one accepted client socket.
pub struct ServerSession {
    frames: mpsc::UnboundedReceiver<Value>,
    outbound: mpsc::UnboundedSender<Message>,
}

impl ServerSession {
    /// Split the socket into pump tasks and return the test-facing handle.
    fn spawn(socket: WebSocketStream<TcpStream>) -> Self {
        let (mut write, mut read) = socket.split();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();

        // Read pump: client text frames become JSON values until the
        // socket closes, which drops the sender and ends the stream.
        tokio::spawn(async move {
            while let Some(Ok(message)) = read.next().await {
                match message {
                    Message::Text(text) => {
                        let value: Value = serde_json::from_str(text.as_str())
                            .expect("client sent an undecodable frame");
                        if frame_tx.send(value).is_err() {
                            return;
                        }
                    }
                    Message::Close(_) => return,
                    _ => {}
                }
            }
        });

        // Write pump: test-injected frames until the handle is dropped.
        tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                let closing = matches!(message, Message::Close(_));
                if write.send(message).await.is_err() || closing {
                    return;
                }
            }
            let _ = write.close().await;
        });

        Self {
            frames: frame_rx,
            outbound: out_tx,
        }
    }

    /// Next decoded frame from the client.
    pub async fn recv(&mut self) -> Value {
        tokio::time::timeout(WAIT, self.frames.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("client closed the socket")
    }

    /// Receive the authentication frame every connection opens with.
    pub async fn expect_handshake(&mut self) -> Value {
        let frame = self.recv().await;
        assert_eq!(frame["type"], "handshake", "expected handshake: {frame}");
        frame
    }

    /// Assert that no frame arrives within [`QUIET`].
    pub async fn assert_no_frame(&mut self) {
        if let Ok(Some(frame)) = tokio::time::timeout(QUIET, self.frames.recv()).await {
            panic!("unexpected frame: {frame}");
        }
    }

    /// Wait until the client closes the socket.
    pub async fn wait_closed(&mut self) {
        loop {
            match tokio::time::timeout(WAIT, self.frames.recv()).await {
                Ok(Some(_)) => continue,
                Ok(None) => return,
                Err(_) => panic!("timed out waiting for the client to close"),
            }
        }
    }

    /// Send a raw JSON frame to the client.
    pub fn send(&self, value: Value) {
        self.outbound
            .send(Message::Text(value.to_string().into()))
            .expect("session write pump ended");
    }

    /// Send a user status change.
    pub fn send_status(&self, user: &str, status: &str) {
        self.send(serde_json::json!({
            "type": "userStatusChanged",
            "user": user,
            "status": status,
        }));
    }

    /// Send a direct message.
    pub fn send_message(&self, from: &str, message: &str) {
        self.send(serde_json::json!({
            "type": "newMessage",
            "from": from,
            "message": message,
        }));
    }

    /// Close the socket from the server side with a reason.
    pub fn close(self, reason: &str) {
        let frame = CloseFrame {
            code: CloseCode::Away,
            reason: reason.to_string().into(),
        };
        let _ = self.outbound.send(Message::Close(Some(frame)));
    }
}

/// Build an engine dialing the given endpoint, with short retry delays.
pub fn make_engine(url: &str, token: Option<&str>) -> SyncEngine {
    let provider = StaticTokenProvider::new(token.map(PushToken::from));
    make_engine_with_provider(url, Arc::new(provider))
}

/// Build an engine with a caller-supplied token provider.
pub fn make_engine_with_provider(url: &str, provider: Arc<dyn PushTokenProvider>) -> SyncEngine {
    build_engine(url, 25, 100, provider)
}

/// Build an engine with explicit reconnect delays and no push token.
pub fn make_engine_with_delays(url: &str, min_delay_ms: u64, max_delay_ms: u64) -> SyncEngine {
    build_engine(
        url,
        min_delay_ms,
        max_delay_ms,
        Arc::new(StaticTokenProvider::new(None)),
    )
}

fn build_engine(
    url: &str,
    min_delay_ms: u64,
    max_delay_ms: u64,
    provider: Arc<dyn PushTokenProvider>,
) -> SyncEngine {
    let config = RealtimeConfig {
        url: url.to_string(),
        reconnect_min_delay_ms: min_delay_ms,
        reconnect_max_delay_ms: max_delay_ms,
        channel_buffer_size: 16,
    };
    let connector = Arc::new(WsConnector::new(&config));
    SyncEngine::new(config, connector, provider)
}

/// Credentials for a test user on a fixed device.
pub fn make_credentials(token: &str, user: &str) -> SessionCredentials {
    SessionCredentials::new(token, user, "device-1")
}

/// Block until the engine reports the given connection state.
pub async fn wait_for_state(engine: &SyncEngine, expected: ConnectionState) {
    let mut state = engine.connection_state_receiver();
    tokio::time::timeout(WAIT, state.wait_for(|s| *s == expected))
        .await
        .expect("timed out waiting for connection state")
        .expect("state channel closed");
}

/// Next domain event, bounded by [`WAIT`].
pub async fn next_event(rx: &mut tokio::sync::broadcast::Receiver<ClientEvent>) -> ClientEvent {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

/// Token provider that resolves when the test says so.
#[derive(Debug)]
pub struct DeferredTokenProvider {
    token: Mutex<Option<oneshot::Receiver<Option<PushToken>>>>,
}

impl DeferredTokenProvider {
    /// Create the provider plus the handle that resolves it.
    pub fn with_resolver() -> (Arc<Self>, oneshot::Sender<Option<PushToken>>) {
        let (resolve_tx, resolve_rx) = oneshot::channel();
        let provider = Arc::new(Self {
            token: Mutex::new(Some(resolve_rx)),
        });
        (provider, resolve_tx)
    }
}

#[async_trait]
impl PushTokenProvider for DeferredTokenProvider {
    async fn request_token(&self) -> AppResult<Option<PushToken>> {
        let pending = self.token.lock().await.take();
        match pending {
            Some(resolve_rx) => Ok(resolve_rx.await.unwrap_or(None)),
            None => Ok(None),
        }
    }
}
