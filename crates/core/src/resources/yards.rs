//! Yard listings. Paged only, no aggregate.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::PageCache;
use crate::store::KeyValueStore;
use crate::sync::{
    LoadOutcome, PageFetcher, PagedSyncEngine, ResourceState, ResyncTarget, DEFAULT_PAGE_SIZE,
};

pub const YARDS_RESOURCE: &str = "yards";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Yard {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub capacity: u32,
    pub head_count: u32,
    pub status: YardStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YardStatus {
    Open,
    Closed,
    Quarantined,
}

/// Offline-first access to the yard list.
pub struct YardSync {
    engine: PagedSyncEngine<Yard>,
}

impl YardSync {
    pub fn new(store: Arc<dyn KeyValueStore>, fetcher: Arc<dyn PageFetcher<Yard>>) -> Self {
        let cache = PageCache::new(YARDS_RESOURCE, store);
        Self {
            engine: PagedSyncEngine::new(cache, fetcher, DEFAULT_PAGE_SIZE),
        }
    }

    pub async fn load_page(&self, page: u32, size: u32) -> LoadOutcome {
        self.engine.load_page(page, size).await
    }

    pub async fn load_cached_only(&self) -> ResourceState<Yard> {
        self.engine.load_cached_only().await
    }

    pub async fn state(&self) -> ResourceState<Yard> {
        self.engine.state().await
    }

    pub async fn clear_cache(&self) {
        self.engine.clear_cache().await;
    }
}

#[async_trait]
impl ResyncTarget for YardSync {
    fn name(&self) -> &str {
        YARDS_RESOURCE
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

    fn yard(id: i64) -> Yard {
        Yard {
            id,
            name: format!("Yard {id}"),
            location: "North block".to_string(),
            capacity: 220,
            head_count: 180,
            status: YardStatus::Open,
        }
    }

    fn yard_page(ids: &[i64], page_number: u32, total_pages: u32, page_size: u32) -> Page<Yard> {
        Page {
            items: ids.iter().copied().map(yard).collect(),
            page_number,
            total_pages,
            total_elements: ids.len() as u64,
            page_size,
        }
    }

    #[tokio::test]
    async fn offline_first_load_serves_nine_cached_yards() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let cache: PageCache<Yard> =
            PageCache::new(YARDS_RESOURCE, Arc::clone(&store) as Arc<dyn KeyValueStore>);
        cache
            .write_page(0, &yard_page(&[1, 2, 3, 4, 5, 6, 7, 8, 9], 0, 1, 9))
            .await;

        let offline: Arc<dyn PageFetcher<Yard>> = Arc::new(ScriptedPageFetcher::new(vec![
            Err(SyncError::network("offline")),
        ]));
        let yards = YardSync::new(Arc::clone(&store) as Arc<dyn KeyValueStore>, offline);

        let painted = yards.load_cached_only().await;
        assert_eq!(painted.items.len(), 9);
        assert!(painted.error.is_none());

        assert_eq!(yards.load_page(0, 9).await, LoadOutcome::CacheFallback);
        let state = yards.state().await;
        assert_eq!(state.items.len(), 9);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn online_load_overwrites_stale_cache() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let cache: PageCache<Yard> =
            PageCache::new(YARDS_RESOURCE, Arc::clone(&store) as Arc<dyn KeyValueStore>);
        cache
            .write_page(0, &yard_page(&[1, 2, 3, 4, 5, 6, 7, 8, 9], 0, 1, 9))
            .await;

        let online: Arc<dyn PageFetcher<Yard>> = Arc::new(ScriptedPageFetcher::new(vec![Ok(
            yard_page(&[21, 22, 23, 24, 25], 0, 2, 9),
        )]));
        let yards = YardSync::new(Arc::clone(&store) as Arc<dyn KeyValueStore>, online);

        assert_eq!(yards.load_page(0, 9).await, LoadOutcome::Network);
        let state = yards.state().await;
        assert_eq!(state.items.len(), 5);
        assert_eq!(state.total_pages, 2);

        let recached = cache.read_page(0).await.unwrap();
        assert_eq!(recached.items.len(), 5);
        assert_eq!(recached.total_pages, 2);
    }

    #[tokio::test]
    async fn resync_refreshes_only_after_first_load() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let fetcher = Arc::new(ScriptedPageFetcher::new(vec![
            Ok(yard_page(&[1, 2], 0, 1, 9)),
            Ok(yard_page(&[1, 2], 0, 1, 9)),
        ]));
        let port = Arc::clone(&fetcher) as Arc<dyn PageFetcher<Yard>>;
        let yards = YardSync::new(Arc::clone(&store) as Arc<dyn KeyValueStore>, port);

        assert!(!yards.has_data().await);
        yards.load_page(0, 9).await;
        assert!(yards.has_data().await);

        assert_eq!(yards.resync().await, LoadOutcome::Network);
        assert_eq!(fetcher.requests(), vec![(0, 9), (0, 9)]);
    }
}
