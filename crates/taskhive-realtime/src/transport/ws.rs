//! WebSocket transport over tokio-tungstenite.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, warn};

use taskhive_core::config::RealtimeConfig;
use taskhive_core::error::{AppError, ErrorKind};
use taskhive_core::AppResult;

use crate::connection::SessionCredentials;
use crate::message::types::{ClientMessage, ServerMessage};

use super::{Connector, TransportEvent, TransportPair};

/// Production connector: a single long-lived WebSocket to the configured
/// endpoint, authenticated by a first-frame handshake. No fallback
/// transport — a failed connect is an error for the retry loop.
#[derive(Debug, Clone)]
pub struct WsConnector {
    /// Endpoint URL.
    url: String,
    /// Buffer size for the pump channels.
    channel_buffer: usize,
}

impl WsConnector {
    /// Create a connector from realtime configuration.
    pub fn new(config: &RealtimeConfig) -> Self {
        Self {
            url: config.url.clone(),
            channel_buffer: config.channel_buffer_size.max(1),
        }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, credentials: &SessionCredentials) -> AppResult<TransportPair> {
        let (stream, _response) = connect_async(self.url.as_str()).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Transport,
                format!("WebSocket connect to {} failed", self.url),
                e,
            )
        })?;

        let (mut write, mut read) = stream.split();

        // Authenticate before anything else flows on the socket.
        let handshake = ClientMessage::Handshake {
            token: credentials.token.clone(),
            device_id: credentials.device_id.clone(),
        }
        .encode()?;
        write
            .send(Message::Text(handshake.into()))
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Transport, "Handshake send failed", e)
            })?;

        let (out_tx, mut out_rx) = mpsc::channel::<ClientMessage>(self.channel_buffer);
        let (in_tx, in_rx) = mpsc::channel::<TransportEvent>(self.channel_buffer);

        // Write pump: outbound frames until the sender side is dropped,
        // then close the socket so the read pump winds down too.
        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                let text = match frame.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "Failed to encode outbound frame");
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(text.into())).await {
                    debug!(error = %e, "Outbound send failed, stopping write pump");
                    break;
                }
            }
            let _ = write.close().await;
        });

        // Read pump: inbound frames become transport events until the
        // socket closes or the supervisor stops listening.
        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => match ServerMessage::decode(&text) {
                        Ok(msg) => {
                            if in_tx.send(TransportEvent::Message(msg)).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, frame = %text, "Dropping undecodable frame");
                        }
                    },
                    Ok(Message::Close(frame)) => {
                        let reason = frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty());
                        let _ = in_tx.send(TransportEvent::Closed { reason }).await;
                        return;
                    }
                    Ok(_) => {
                        // Binary, ping, and pong frames carry nothing for us;
                        // tungstenite answers pings itself.
                    }
                    Err(e) => {
                        let _ = in_tx
                            .send(TransportEvent::Closed {
                                reason: Some(e.to_string()),
                            })
                            .await;
                        return;
                    }
                }
            }
            // Stream ended without a close frame.
            let _ = in_tx.send(TransportEvent::Closed { reason: None }).await;
        });

        Ok(TransportPair {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}
