//! Remote presence reconciliation.

pub mod reconciler;
pub mod status;

pub use reconciler::PresenceReconciler;
pub use status::PresenceStatus;
