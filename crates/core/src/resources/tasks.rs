//! Yard tasks: a paged list plus the completion-progress aggregate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{AggregateCache, PageCache};
use crate::store::KeyValueStore;
use crate::sync::{
    AggregateFetcher, AggregateState, AggregateSyncEngine, LoadOutcome, PageFetcher,
    PagedSyncEngine, ResourceState, ResyncTarget, DEFAULT_PAGE_SIZE,
};

pub const TASKS_RESOURCE: &str = "tasks";

/// Fixed cache key for the task progress aggregate.
pub const TASK_PROGRESS_KEY: &str = "progressStats";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub yard: Option<String>,
    pub due_at: DateTime<Utc>,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

/// Completion counters fetched from the tasks progress endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgress {
    pub total: u32,
    pub completed: u32,
    pub in_progress: u32,
    pub pending: u32,
}

/// Offline-first access to tasks and their progress counters.
///
/// The page list and the aggregate load concurrently and settle on their own:
/// a dead stats endpoint never blocks the task list, and vice versa.
pub struct TasksSync {
    pages: PagedSyncEngine<Task>,
    progress: AggregateSyncEngine<TaskProgress>,
}

impl TasksSync {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        page_fetcher: Arc<dyn PageFetcher<Task>>,
        progress_fetcher: Arc<dyn AggregateFetcher<TaskProgress>>,
    ) -> Self {
        let page_cache = PageCache::new(TASKS_RESOURCE, Arc::clone(&store));
        let progress_cache = AggregateCache::new(TASK_PROGRESS_KEY, store);
        Self {
            pages: PagedSyncEngine::new(page_cache, page_fetcher, DEFAULT_PAGE_SIZE),
            progress: AggregateSyncEngine::new(progress_cache, progress_fetcher),
        }
    }

    pub async fn load_page(&self, page: u32, size: u32) -> LoadOutcome {
        self.pages.load_page(page, size).await
    }

    pub async fn load_progress(&self) -> LoadOutcome {
        self.progress.load().await
    }

    /// Load the page and the aggregate together.
    pub async fn load_all(&self, page: u32, size: u32) -> (LoadOutcome, LoadOutcome) {
        tokio::join!(self.pages.load_page(page, size), self.progress.load())
    }

    pub async fn load_cached_only(&self) -> (ResourceState<Task>, AggregateState<TaskProgress>) {
        tokio::join!(self.pages.load_cached_only(), self.progress.load_cached_only())
    }

    pub async fn tasks_state(&self) -> ResourceState<Task> {
        self.pages.state().await
    }

    pub async fn progress_state(&self) -> AggregateState<TaskProgress> {
        self.progress.state().await
    }

    pub async fn clear_cache(&self) {
        self.pages.clear_cache().await;
        self.progress.clear_cache().await;
    }
}

#[async_trait]
impl ResyncTarget for TasksSync {
    fn name(&self) -> &str {
        TASKS_RESOURCE
    }

    async fn has_data(&self) -> bool {
        self.pages.has_items().await || self.progress.has_value().await
    }

    async fn resync(&self) -> LoadOutcome {
        let (pages, progress) = tokio::join!(self.pages.refresh(), self.progress.refresh());
        pages.combined(progress)
    }
}
