//! Push token registrar — sends (user, token) exactly once per connection.

use std::sync::Mutex;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use taskhive_core::types::UserId;
use taskhive_push::token::PushToken;

use crate::event::ClientEvent;
use crate::message::ClientMessage;

/// Registers the device push token with the remote peer.
///
/// The token and the connection resolve independently and in any relative
/// order. Both resolution paths update a shared record under one lock and
/// then attempt the send, so whichever side completes second performs it.
/// A registration goes out at most once per (connection generation, token)
/// pair and again whenever a new connection is established.
#[derive(Debug)]
pub struct PushRegistrar {
    record: Mutex<RegistrarRecord>,
    events: broadcast::Sender<ClientEvent>,
}

#[derive(Debug, Default)]
struct RegistrarRecord {
    /// Resolved device token, if the platform issued one.
    token: Option<PushToken>,
    /// Whether token resolution completed, even with no token.
    token_resolved: bool,
    /// Registration route of the live connection, if any.
    connection: Option<LiveConnection>,
    /// The (generation, token) pair last sent successfully.
    last_sent: Option<(u64, PushToken)>,
}

#[derive(Debug)]
struct LiveConnection {
    generation: u64,
    user: UserId,
    outbound: mpsc::Sender<ClientMessage>,
}

impl PushRegistrar {
    pub fn new(events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            record: Mutex::new(RegistrarRecord::default()),
            events,
        }
    }

    /// Records the outcome of device token resolution.
    ///
    /// `None` means the device has no push capability (unsupported platform
    /// or permission denied); no registration is ever sent for it and the
    /// rest of the connection flow is unaffected.
    pub fn token_resolved(&self, token: Option<PushToken>) {
        let mut record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        record.token_resolved = true;

        match token {
            Some(token) => {
                record.token = Some(token);
                self.try_register(&mut record);
            }
            None => {
                record.token = None;
                debug!("No push token available, skipping registration");
            }
        }
    }

    /// Records a newly established connection and registers the token if it
    /// has already resolved.
    pub(crate) fn connection_ready(
        &self,
        generation: u64,
        user: UserId,
        outbound: mpsc::Sender<ClientMessage>,
    ) {
        let mut record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        record.connection = Some(LiveConnection {
            generation,
            user,
            outbound,
        });
        self.try_register(&mut record);
    }

    /// Drops the registration route for a connection that ended. A stale
    /// generation is ignored so a late notification from a replaced
    /// connection never clears its successor.
    pub(crate) fn connection_lost(&self, generation: u64) {
        let mut record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        if record
            .connection
            .as_ref()
            .is_some_and(|c| c.generation == generation)
        {
            record.connection = None;
        }
    }

    /// Sends the registration frame when both sides of the record are
    /// present and this (generation, token) pair has not been sent yet.
    fn try_register(&self, record: &mut RegistrarRecord) {
        let Some(connection) = record.connection.as_ref() else {
            return;
        };
        if !record.token_resolved {
            return;
        }
        let Some(token) = record.token.clone() else {
            return;
        };
        if record.last_sent.as_ref() == Some(&(connection.generation, token.clone())) {
            return;
        }

        let frame = ClientMessage::RegisterPushToken {
            user_id: connection.user.clone(),
            token: token.as_str().to_string(),
        };

        match connection.outbound.try_send(frame) {
            Ok(()) => {
                info!(
                    generation = connection.generation,
                    user_id = %connection.user,
                    "Push token registered"
                );
                let _ = self.events.send(ClientEvent::PushRegistered {
                    user: connection.user.clone(),
                });
                record.last_sent = Some((connection.generation, token));
            }
            Err(e) => {
                // Not recorded as sent; the next trigger retries.
                warn!(
                    generation = connection.generation,
                    error = %e,
                    "Failed to queue push token registration"
                );
            }
        }
    }
}
