//! Transport abstraction over the realtime socket.
//!
//! A [`Connector`] turns credentials into a pair of channels: typed
//! outbound frames in one direction, discrete [`TransportEvent`]s in the
//! other. All socket mechanics (handshake, framing, pump tasks) live behind
//! the trait, so the connection supervisor only ever consumes messages.

pub mod ws;

use async_trait::async_trait;
use tokio::sync::mpsc;

use taskhive_core::AppResult;

use crate::connection::SessionCredentials;
use crate::message::types::{ClientMessage, ServerMessage};

/// A transport-level event produced by the read side of a connection.
#[derive(Debug)]
pub enum TransportEvent {
    /// A decoded frame arrived from the server.
    Message(ServerMessage),
    /// The transport closed and will produce no further events.
    Closed {
        /// Reason from the close frame or transport error, when available.
        reason: Option<String>,
    },
}

/// The two channel ends of an established transport.
///
/// Dropping the pair tears the transport down: the write pump stops when
/// the outbound sender goes away and closes the socket behind it.
#[derive(Debug)]
pub struct TransportPair {
    /// Sender for outbound frames.
    pub outbound: mpsc::Sender<ClientMessage>,
    /// Receiver for inbound transport events.
    pub inbound: mpsc::Receiver<TransportEvent>,
}

/// Establishes authenticated transports to the realtime endpoint.
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug + 'static {
    /// Connect and authenticate, returning the channel pair on success.
    ///
    /// A returned error means this attempt failed; the caller owns retry.
    async fn connect(&self, credentials: &SessionCredentials) -> AppResult<TransportPair>;
}
