//! # taskhive-realtime
//!
//! Client-side realtime sync engine for TaskHive. Provides:
//!
//! - Connection lifecycle keyed by session credentials, with infinite
//!   bounded-backoff reconnection over a single WebSocket transport
//! - Presence reconciliation of remote user-status events into a shared map
//! - Push token registration racing token resolution against connection
//!   establishment
//! - Suspend/resume gating on application foreground/background transitions
//! - A broadcast stream of domain events for the embedding application

pub mod connection;
pub mod engine;
pub mod event;
pub mod lifecycle;
pub mod message;
pub mod presence;
pub mod push;
pub mod transport;


pub use connection::manager::ConnectionManager;
pub use connection::{ConnectionState, SessionCredentials};
pub use engine::SyncEngine;
pub use event::ClientEvent;
pub use lifecycle::{AppLifecycleState, LifecycleGate};
pub use presence::reconciler::PresenceReconciler;
pub use presence::status::PresenceStatus;
pub use push::registrar::PushRegistrar;
pub use transport::ws::WsConnector;
