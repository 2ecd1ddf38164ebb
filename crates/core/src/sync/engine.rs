//! Fetch-or-fallback engines: network first, cache as the safety net.
//!
//! One generic engine serves every paged resource; a sibling covers the
//! fixed-key aggregates. Both follow the same contract: a successful fetch is
//! written through to the cache and committed to state, a failed fetch falls
//! back to the cached copy without surfacing an error, and only when both
//! sides come up empty does the failure land in state. Engine calls never
//! return `Err`; failures are data.
//!
//! Every request carries a monotonically increasing sequence number and a
//! completion older than the latest issued request is discarded, so rapid
//! page flips cannot commit out of order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::cache::{AggregateCache, PageCache};
use crate::errors::SyncError;
use crate::sync::model::{
    AggregateFetcher, AggregateState, LoadOutcome, Page, PageFetcher, ResourceState,
};

/// Rewrites fetched items before they reach resource state.
///
/// Runs on every commit path, network and cache alike. The notification read
/// overlay is the production implementation.
#[async_trait]
pub trait PageDecorator<T>: Send + Sync {
    async fn decorate(&self, items: &mut Vec<T>);
}

/// Offline-first loader for one paged resource.
pub struct PagedSyncEngine<T> {
    resource: String,
    cache: PageCache<T>,
    fetcher: Arc<dyn PageFetcher<T>>,
    decorator: Option<Arc<dyn PageDecorator<T>>>,
    state: RwLock<ResourceState<T>>,
    latest_request: AtomicU64,
    default_page_size: u32,
}

impl<T> PagedSyncEngine<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(
        cache: PageCache<T>,
        fetcher: Arc<dyn PageFetcher<T>>,
        default_page_size: u32,
    ) -> Self {
        let resource = cache.resource().to_string();
        Self {
            resource,
            cache,
            fetcher,
            decorator: None,
            state: RwLock::new(ResourceState::empty(default_page_size)),
            latest_request: AtomicU64::new(0),
            default_page_size,
        }
    }

    /// Attach an item decorator. Used at wiring time, before any load runs.
    pub fn with_decorator(mut self, decorator: Arc<dyn PageDecorator<T>>) -> Self {
        self.decorator = Some(decorator);
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Cloned snapshot of the current state.
    pub async fn state(&self) -> ResourceState<T> {
        self.state.read().await.clone()
    }

    pub async fn has_items(&self) -> bool {
        self.state.read().await.has_items()
    }

    /// Load one page, network first with cache fallback.
    pub async fn load_page(&self, page: u32, size: u32) -> LoadOutcome {
        let request_id = self.begin_request().await;
        match self.fetcher.fetch_page(page, size).await {
            Ok(fetched) => {
                if !fetched.is_consistent() {
                    warn!(
                        "{}: inconsistent page from API (page {}, {} items, {} total pages)",
                        self.resource,
                        fetched.page_number,
                        fetched.items.len(),
                        fetched.total_pages
                    );
                }
                // Cache even when the completion loses the sequence race;
                // the fetched payload is still the freshest copy of the page.
                self.cache.write_page(page, &fetched).await;
                self.commit(request_id, fetched, LoadOutcome::Network).await
            }
            Err(fetch_error) => {
                debug!(
                    "{}: fetch for page {} failed, trying cache: {}",
                    self.resource, page, fetch_error
                );
                match self.cache.read_page(page).await {
                    Some(cached) => {
                        self.commit(request_id, cached, LoadOutcome::CacheFallback)
                            .await
                    }
                    None => self.fail(request_id, page, fetch_error).await,
                }
            }
        }
    }

    /// Serve page zero straight from the cache for instant first paint.
    ///
    /// Never records an error: a missing or corrupt entry yields an empty but
    /// valid state the UI can render while a network load follows.
    pub async fn load_cached_only(&self) -> ResourceState<T> {
        let request_id = self.next_request_id();
        let page = match self.cache.read_page(0).await {
            Some(cached) => cached,
            None => Page::empty(self.default_page_size),
        };
        self.commit(request_id, page, LoadOutcome::CacheFallback)
            .await;
        self.state().await
    }

    /// Re-issue the fetch for the page currently in state. Used by the
    /// background resync trigger and pull-to-refresh.
    pub async fn refresh(&self) -> LoadOutcome {
        let (page, size) = {
            let state = self.state.read().await;
            let size = if state.page_size == 0 {
                self.default_page_size
            } else {
                state.page_size
            };
            (state.page_number, size)
        };
        self.load_page(page, size).await
    }

    /// Re-run the decorator over the items already in state. Called after
    /// local overlay mutations so the in-memory view catches up.
    pub async fn redecorate(&self) {
        let Some(decorator) = &self.decorator else {
            return;
        };
        let mut state = self.state.write().await;
        // Decorate a copy: a caller cancelled at this await must leave the
        // committed items untouched.
        let mut items = state.items.clone();
        decorator.decorate(&mut items).await;
        state.items = items;
    }

    /// Drop every cached page for this resource.
    pub async fn clear_cache(&self) {
        self.cache.clear_all().await;
    }

    fn next_request_id(&self) -> u64 {
        self.latest_request.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, request_id: u64) -> bool {
        self.latest_request.load(Ordering::SeqCst) == request_id
    }

    async fn begin_request(&self) -> u64 {
        let mut state = self.state.write().await;
        // Allocate under the state lock; an id taken before the lock could
        // mark `loading` after a newer request already committed, leaving
        // the flag set with no live request to clear it.
        let request_id = self.next_request_id();
        state.loading = true;
        state.error = None;
        request_id
    }

    async fn commit(&self, request_id: u64, mut page: Page<T>, outcome: LoadOutcome) -> LoadOutcome {
        if let Some(decorator) = &self.decorator {
            decorator.decorate(&mut page.items).await;
        }
        let mut state = self.state.write().await;
        if !self.is_current(request_id) {
            debug!(
                "{}: discarding stale completion (request {})",
                self.resource, request_id
            );
            return LoadOutcome::Superseded;
        }
        state.items = page.items;
        state.page_number = page.page_number;
        state.total_pages = page.total_pages;
        state.total_elements = page.total_elements;
        state.page_size = page.page_size;
        state.loading = false;
        state.error = None;
        if outcome == LoadOutcome::Network {
            state.last_synced_at = Some(Utc::now());
        }
        outcome
    }

    async fn fail(&self, request_id: u64, page: u32, error: SyncError) -> LoadOutcome {
        let mut state = self.state.write().await;
        if !self.is_current(request_id) {
            debug!(
                "{}: discarding stale failure (request {})",
                self.resource, request_id
            );
            return LoadOutcome::Superseded;
        }
        warn!(
            "{}: page {} unavailable and nothing cached: {}",
            self.resource, page, error
        );
        state.loading = false;
        state.error = Some(error);
        LoadOutcome::Failed
    }
}

/// Offline-first loader for a fixed-key aggregate (stats, KPIs).
pub struct AggregateSyncEngine<S> {
    resource: String,
    cache: AggregateCache<S>,
    fetcher: Arc<dyn AggregateFetcher<S>>,
    state: RwLock<AggregateState<S>>,
    latest_request: AtomicU64,
}

impl<S> AggregateSyncEngine<S>
where
    S: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(cache: AggregateCache<S>, fetcher: Arc<dyn AggregateFetcher<S>>) -> Self {
        let resource = cache.key().to_string();
        Self {
            resource,
            cache,
            fetcher,
            state: RwLock::new(AggregateState::empty()),
            latest_request: AtomicU64::new(0),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub async fn state(&self) -> AggregateState<S> {
        self.state.read().await.clone()
    }

    pub async fn has_value(&self) -> bool {
        self.state.read().await.value.is_some()
    }

    /// Fetch the aggregate, falling back to the cached copy on failure.
    pub async fn load(&self) -> LoadOutcome {
        let request_id = {
            let mut state = self.state.write().await;
            // Same ordering rule as the paged engine: allocate under the
            // lock so `loading` always belongs to the latest issued request.
            let id = self.next_request_id();
            state.loading = true;
            state.error = None;
            id
        };
        match self.fetcher.fetch().await {
            Ok(value) => {
                self.cache.write(&value).await;
                self.commit(request_id, Some(value), LoadOutcome::Network)
                    .await
            }
            Err(fetch_error) => {
                debug!(
                    "{}: aggregate fetch failed, trying cache: {}",
                    self.resource, fetch_error
                );
                match self.cache.read().await {
                    Some(cached) => {
                        self.commit(request_id, Some(cached), LoadOutcome::CacheFallback)
                            .await
                    }
                    None => self.fail(request_id, fetch_error).await,
                }
            }
        }
    }

    /// Serve the cached aggregate without touching the network. A miss
    /// leaves the value empty with no error.
    pub async fn load_cached_only(&self) -> AggregateState<S> {
        let request_id = self.next_request_id();
        let cached = self.cache.read().await;
        self.commit(request_id, cached, LoadOutcome::CacheFallback)
            .await;
        self.state().await
    }

    pub async fn refresh(&self) -> LoadOutcome {
        self.load().await
    }

    /// Drop the cached aggregate.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    fn next_request_id(&self) -> u64 {
        self.latest_request.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, request_id: u64) -> bool {
        self.latest_request.load(Ordering::SeqCst) == request_id
    }

    async fn commit(
        &self,
        request_id: u64,
        value: Option<S>,
        outcome: LoadOutcome,
    ) -> LoadOutcome {
        let mut state = self.state.write().await;
        if !self.is_current(request_id) {
            debug!(
                "{}: discarding stale completion (request {})",
                self.resource, request_id
            );
            return LoadOutcome::Superseded;
        }
        if value.is_some() {
            state.value = value;
        }
        state.loading = false;
        state.error = None;
        if outcome == LoadOutcome::Network {
            state.last_synced_at = Some(Utc::now());
        }
        outcome
    }

    async fn fail(&self, request_id: u64, error: SyncError) -> LoadOutcome {
        let mut state = self.state.write().await;
        if !self.is_current(request_id) {
            debug!(
                "{}: discarding stale failure (request {})",
                self.resource, request_id
            );
            return LoadOutcome::Superseded;
        }
        warn!(
            "{}: aggregate unavailable and nothing cached: {}",
            self.resource, error
        );
        state.loading = false;
        state.error = Some(error);
        LoadOutcome::Failed
    }
}
