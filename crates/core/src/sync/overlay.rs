//! Locally persisted read-state overlay.
//!
//! Server notification payloads never carry per-device read flags, so the
//! device keeps its own set of read ids and merges it over every fetched
//! page. The merge is one-directional: an id in the set forces `read = true`,
//! an id outside the set leaves whatever the server sent untouched.

use std::collections::HashSet;
use std::sync::Arc;

use log::warn;

use crate::store::KeyValueStore;

/// Storage key for the persisted set of read notification ids.
pub const READ_OVERLAY_KEY: &str = "read_notifications";

/// Persisted set of notification ids the user has read on this device.
///
/// The set only ever grows during normal operation; [`ReadOverlay::reset`]
/// exists for logout, where local per-user state must not leak into the next
/// session.
pub struct ReadOverlay {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl ReadOverlay {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: READ_OVERLAY_KEY.to_string(),
        }
    }

    /// The persisted id set. Absent or unreadable entries behave as empty.
    pub async fn read_ids(&self) -> HashSet<i64> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return HashSet::new(),
            Err(store_error) => {
                warn!("read overlay unavailable: {store_error}");
                return HashSet::new();
            }
        };
        match serde_json::from_str::<Vec<i64>>(&raw) {
            Ok(ids) => ids.into_iter().collect(),
            Err(parse_error) => {
                warn!("read overlay corrupt, treating as empty: {parse_error}");
                HashSet::new()
            }
        }
    }

    pub async fn is_read(&self, id: i64) -> bool {
        self.read_ids().await.contains(&id)
    }

    /// Add one id to the set. Returns `true` when the id was newly recorded;
    /// marking an already-read id is a no-op and skips the write entirely.
    pub async fn mark_read(&self, id: i64) -> bool {
        let mut ids = self.read_ids().await;
        if !ids.insert(id) {
            return false;
        }
        self.persist(&ids).await;
        true
    }

    /// Add every id in one write. Ids already present are kept; the write is
    /// skipped when nothing changes.
    pub async fn mark_all_read(&self, new_ids: &[i64]) -> usize {
        let mut ids = self.read_ids().await;
        let before = ids.len();
        ids.extend(new_ids.iter().copied());
        let added = ids.len() - before;
        if added > 0 {
            self.persist(&ids).await;
        }
        added
    }

    /// Drop the persisted set. Called on logout.
    pub async fn reset(&self) {
        if let Err(store_error) = self.store.remove(&self.key).await {
            warn!("failed to reset read overlay: {store_error}");
        }
    }

    async fn persist(&self, ids: &HashSet<i64>) {
        let mut sorted: Vec<i64> = ids.iter().copied().collect();
        sorted.sort_unstable();
        match serde_json::to_string(&sorted) {
            Ok(raw) => {
                if let Err(store_error) = self.store.set(&self.key, &raw).await {
                    warn!("failed to persist read overlay: {store_error}");
                }
            }
            Err(encode_error) => {
                warn!("failed to encode read overlay: {encode_error}");
            }
        }
    }
}
