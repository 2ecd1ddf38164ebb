//! Sync domain models and the fetch contracts transports implement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SyncError;

/// One page of a remote collection, as committed to cache and state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
    pub total_elements: u64,
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Valid zero-page used when nothing has been fetched or cached yet.
    pub fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            page_number: 0,
            total_pages: 0,
            total_elements: 0,
            page_size,
        }
    }

    /// Pagination bookkeeping agrees with the item payload.
    pub fn is_consistent(&self) -> bool {
        self.items.len() <= self.page_size as usize
            && (self.total_pages == 0 || self.page_number < self.total_pages)
    }
}

/// Lifecycle of a background resync cycle, published for status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Idle,
    Syncing,
    Success,
    Error,
}

/// Where a completed load got its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Fresh data from the API; cache updated.
    Network,
    /// API unavailable; cached copy served with no error surfaced.
    CacheFallback,
    /// API unavailable and nothing cached; error recorded in state.
    Failed,
    /// A newer request was issued before this one finished; nothing committed.
    Superseded,
}

impl LoadOutcome {
    /// Fold two outcomes into the one worth reporting, worst first.
    ///
    /// Resources that refresh a page list and a stats aggregate side by side
    /// use this to report a single result to the resync worker.
    pub fn combined(self, other: LoadOutcome) -> LoadOutcome {
        fn severity(outcome: LoadOutcome) -> u8 {
            match outcome {
                LoadOutcome::Failed => 3,
                LoadOutcome::CacheFallback => 2,
                LoadOutcome::Network => 1,
                LoadOutcome::Superseded => 0,
            }
        }
        if severity(other) > severity(self) {
            other
        } else {
            self
        }
    }
}

/// Snapshot of a paged resource as the UI consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
    pub total_elements: u64,
    pub page_size: u32,
    pub loading: bool,
    pub error: Option<SyncError>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl<T> ResourceState<T> {
    pub fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            page_number: 0,
            total_pages: 0,
            total_elements: 0,
            page_size,
            loading: false,
            error: None,
            last_synced_at: None,
        }
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }
}

/// Snapshot of a fixed-key aggregate resource (stats, KPIs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateState<S> {
    pub value: Option<S>,
    pub loading: bool,
    pub error: Option<SyncError>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl<S> AggregateState<S> {
    pub fn empty() -> Self {
        Self {
            value: None,
            loading: false,
            error: None,
            last_synced_at: None,
        }
    }
}

/// Remote source of one paged collection.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch_page(&self, page: u32, size: u32) -> Result<Page<T>, SyncError>;
}

/// Remote source of one flat aggregate payload.
#[async_trait]
pub trait AggregateFetcher<S>: Send + Sync {
    async fn fetch(&self) -> Result<S, SyncError>;
}
