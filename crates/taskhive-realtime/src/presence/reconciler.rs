//! Presence reconciler — folds remote status events into the shared map.

use std::collections::HashMap;

use dashmap::DashMap;
use tracing::debug;

use taskhive_core::types::UserId;

use super::status::PresenceStatus;

/// Reconciles remote user-status events into the shared presence mapping.
///
/// Updates are strictly per-key: an event for one user never touches the
/// entry of another. For the same user the last event to arrive wins; no
/// timestamp or ordering check is applied, so a delayed event can overwrite
/// a fresher one. The reconciler is the only writer of the map — inbound
/// dispatch applies events here, everything else reads.
#[derive(Debug, Default)]
pub struct PresenceReconciler {
    /// User ID → current status.
    statuses: DashMap<UserId, PresenceStatus>,
}

impl PresenceReconciler {
    /// Create an empty reconciler.
    pub fn new() -> Self {
        Self {
            statuses: DashMap::new(),
        }
    }

    /// Apply a remote status event for a single user.
    pub(crate) fn apply(&self, user: UserId, status: PresenceStatus) {
        debug!(user = %user, status = status.as_str(), "Presence updated");
        self.statuses.insert(user, status);
    }

    /// Get a user's current status. Users never seen are `Offline`.
    pub fn status_of(&self, user: &UserId) -> PresenceStatus {
        self.statuses
            .get(user)
            .map(|r| *r.value())
            .unwrap_or(PresenceStatus::Offline)
    }

    /// Number of users with a tracked status.
    pub fn tracked_count(&self) -> usize {
        self.statuses.len()
    }

    /// Snapshot of the full presence mapping.
    pub fn snapshot(&self) -> HashMap<UserId, PresenceStatus> {
        self.statuses
            .iter()
            .map(|r| (r.key().clone(), *r.value()))
            .collect()
    }
}
