//! Notifications: paged list merged with the device's read overlay.
//!
//! The server never tracks per-device read state, so every page commit runs
//! through a decorator that flags items whose ids are in the persisted
//! overlay. Marking happens locally and re-decorates in place; the unread
//! count is always derived from the merged items, never stored.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::PageCache;
use crate::store::KeyValueStore;
use crate::sync::{
    LoadOutcome, PageDecorator, PageFetcher, PagedSyncEngine, ReadOverlay, ResourceState,
    ResyncTarget, DEFAULT_PAGE_SIZE,
};

pub const NOTIFICATIONS_RESOURCE: &str = "notifications";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    /// Device-local read flag. Absent on the wire; owned by the overlay.
    #[serde(default)]
    pub read: bool,
}

struct OverlayDecorator {
    overlay: Arc<ReadOverlay>,
}

#[async_trait]
impl PageDecorator<Notification> for OverlayDecorator {
    async fn decorate(&self, items: &mut Vec<Notification>) {
        let read_ids = self.overlay.read_ids().await;
        for notification in items.iter_mut() {
            // One-directional merge: the overlay can mark, never unmark.
            if read_ids.contains(&notification.id) {
                notification.read = true;
            }
        }
    }
}

/// Offline-first access to notifications with local read tracking.
pub struct NotificationsSync {
    engine: PagedSyncEngine<Notification>,
    overlay: Arc<ReadOverlay>,
}

impl NotificationsSync {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        fetcher: Arc<dyn PageFetcher<Notification>>,
    ) -> Self {
        let overlay = Arc::new(ReadOverlay::new(Arc::clone(&store)));
        let cache = PageCache::new(NOTIFICATIONS_RESOURCE, store);
        let engine = PagedSyncEngine::new(cache, fetcher, DEFAULT_PAGE_SIZE).with_decorator(
            Arc::new(OverlayDecorator {
                overlay: Arc::clone(&overlay),
            }),
        );
        Self { engine, overlay }
    }

    pub async fn load_page(&self, page: u32, size: u32) -> LoadOutcome {
        self.engine.load_page(page, size).await
    }

    pub async fn load_cached_only(&self) -> ResourceState<Notification> {
        self.engine.load_cached_only().await
    }

    pub async fn state(&self) -> ResourceState<Notification> {
        self.engine.state().await
    }

    /// Record one notification as read and update the in-memory view.
    /// Returns `false` when the id was already read (nothing written).
    pub async fn mark_read(&self, id: i64) -> bool {
        let newly_marked = self.overlay.mark_read(id).await;
        if newly_marked {
            self.engine.redecorate().await;
        }
        newly_marked
    }

    /// Mark every notification currently in state as read. Returns how many
    /// were newly marked.
    pub async fn mark_all_read(&self) -> usize {
        let ids: Vec<i64> = self
            .engine
            .state()
            .await
            .items
            .iter()
            .map(|notification| notification.id)
            .collect();
        let added = self.overlay.mark_all_read(&ids).await;
        if added > 0 {
            self.engine.redecorate().await;
        }
        added
    }

    /// Unread count over the merged items currently in state.
    pub async fn unread_count(&self) -> usize {
        self.engine
            .state()
            .await
            .items
            .iter()
            .filter(|notification| !notification.read)
            .count()
    }

    pub async fn clear_cache(&self) {
        self.engine.clear_cache().await;
    }

    /// Drop cached pages and the read overlay. Called on logout.
    pub async fn reset_local(&self) {
        self.engine.clear_cache().await;
        self.overlay.reset().await;
    }
}

#[async_trait]
impl ResyncTarget for NotificationsSync {
    fn name(&self) -> &str {
        NOTIFICATIONS_RESOURCE
    }

    async fn has_data(&self) -> bool {
        self.engine.has_items().await
    }

    async fn resync(&self) -> LoadOutcome {
        self.engine.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SyncError;
    use crate::store::MemoryKeyValueStore;
    use crate::sync::tests::ScriptedPageFetcher;
    use crate::sync::Page;

    fn notification(id: i64) -> Notification {
        Notification {
            id,
            title: format!("Load {id} arriving"),
            body: "Truck due at the north ramp".to_string(),
            category: "arrivals".to_string(),
            created_at: "2026-04-02T05:15:00Z".parse().unwrap(),
            read: false,
        }
    }

    fn notification_page(ids: &[i64], page_number: u32, total_pages: u32) -> Page<Notification> {
        Page {
            items: ids.iter().copied().map(notification).collect(),
            page_number,
            total_pages,
            total_elements: ids.len() as u64,
            page_size: 9,
        }
    }

    #[tokio::test]
    async fn unread_count_follows_the_overlay() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let fetcher: Arc<dyn PageFetcher<Notification>> = Arc::new(ScriptedPageFetcher::new(
            vec![Ok(notification_page(&[1, 2, 3], 0, 1))],
        ));
        let notifications = NotificationsSync::new(store, fetcher);

        notifications.load_page(0, 9).await;
        assert_eq!(notifications.unread_count().await, 3);

        assert!(notifications.mark_read(2).await);
        assert_eq!(notifications.unread_count().await, 2);
        let state = notifications.state().await;
        let marked = state.items.iter().find(|n| n.id == 2).unwrap();
        assert!(marked.read);
    }

    #[tokio::test]
    async fn marking_read_twice_changes_nothing() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let fetcher: Arc<dyn PageFetcher<Notification>> = Arc::new(ScriptedPageFetcher::new(
            vec![Ok(notification_page(&[1, 2], 0, 1))],
        ));
        let notifications = NotificationsSync::new(store, fetcher);

        notifications.load_page(0, 9).await;
        assert!(notifications.mark_read(1).await);
        assert!(!notifications.mark_read(1).await);
        assert_eq!(notifications.unread_count().await, 1);
    }

    #[tokio::test]
    async fn read_state_survives_restart_offline() {
        let store = Arc::new(MemoryKeyValueStore::new());
        {
            let fetcher: Arc<dyn PageFetcher<Notification>> = Arc::new(ScriptedPageFetcher::new(
                vec![Ok(notification_page(&[1, 2, 3], 0, 1))],
            ));
            let first_session =
                NotificationsSync::new(Arc::clone(&store) as Arc<dyn KeyValueStore>, fetcher);
            first_session.load_page(0, 9).await;
            first_session.mark_read(2).await;
        }

        let offline: Arc<dyn PageFetcher<Notification>> = Arc::new(ScriptedPageFetcher::new(
            vec![Err(SyncError::network("offline"))],
        ));
        let next_session =
            NotificationsSync::new(Arc::clone(&store) as Arc<dyn KeyValueStore>, offline);

        assert_eq!(
            next_session.load_page(0, 9).await,
            LoadOutcome::CacheFallback
        );
        let state = next_session.state().await;
        assert!(state.items.iter().find(|n| n.id == 2).unwrap().read);
        assert_eq!(next_session.unread_count().await, 2);
    }

    #[tokio::test]
    async fn pagination_keeps_id_42_read() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let fetcher: Arc<dyn PageFetcher<Notification>> =
            Arc::new(ScriptedPageFetcher::new(vec![
                Ok(notification_page(&[40, 41, 42], 1, 2)),
                Ok(notification_page(&[1, 2, 3], 0, 2)),
                Ok(notification_page(&[40, 41, 42], 1, 2)),
            ]));
        let notifications = NotificationsSync::new(store, fetcher);

        notifications.load_page(1, 9).await;
        notifications.mark_read(42).await;

        // Page away and back; the server payload is raw again.
        notifications.load_page(0, 9).await;
        notifications.load_page(1, 9).await;

        let state = notifications.state().await;
        assert!(state.items.iter().find(|n| n.id == 42).unwrap().read);
        assert_eq!(notifications.unread_count().await, 2);
    }

    #[tokio::test]
    async fn mark_all_read_flags_the_current_page() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let fetcher: Arc<dyn PageFetcher<Notification>> = Arc::new(ScriptedPageFetcher::new(
            vec![Ok(notification_page(&[1, 2, 3], 0, 1))],
        ));
        let notifications = NotificationsSync::new(store, fetcher);

        notifications.load_page(0, 9).await;
        assert_eq!(notifications.mark_all_read().await, 3);
        assert_eq!(notifications.unread_count().await, 0);
        assert_eq!(notifications.mark_all_read().await, 0);
    }

    #[tokio::test]
    async fn reset_local_forgets_pages_and_overlay() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let fetcher: Arc<dyn PageFetcher<Notification>> = Arc::new(ScriptedPageFetcher::new(
            vec![Ok(notification_page(&[1, 2], 0, 1))],
        ));
        let notifications =
            NotificationsSync::new(Arc::clone(&store) as Arc<dyn KeyValueStore>, fetcher);

        notifications.load_page(0, 9).await;
        notifications.mark_read(1).await;
        notifications.reset_local().await;

        assert!(store.get_all_keys().await.unwrap().is_empty());
    }
}
