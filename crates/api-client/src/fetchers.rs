//! Adapters from the REST client to the core fetch ports.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use muster_core::registry::ResourceFetchers;
use muster_core::resources::{HerdKpis, Notification, Order, OrderStats, Task, TaskProgress, Yard};
use muster_core::sync::{AggregateFetcher, Page, PageFetcher};
use muster_core::SyncError;

use crate::client::ApiClient;

/// [`PageFetcher`] implementation backed by one REST list endpoint.
pub struct RestPageFetcher<T> {
    client: Arc<ApiClient>,
    resource: String,
    sort: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RestPageFetcher<T> {
    pub fn new(client: Arc<ApiClient>, resource: impl Into<String>) -> Self {
        Self {
            client,
            resource: resource.into(),
            sort: None,
            _marker: PhantomData,
        }
    }

    /// Server-side sort expression, e.g. `"dueAt,asc"`.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }
}

#[async_trait]
impl<T> PageFetcher<T> for RestPageFetcher<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch_page(&self, page: u32, size: u32) -> Result<Page<T>, SyncError> {
        self.client
            .fetch_page(&self.resource, page, size, self.sort.as_deref())
            .await
            .map_err(SyncError::from)
    }
}

/// [`AggregateFetcher`] implementation backed by one flat REST endpoint.
pub struct RestAggregateFetcher<S> {
    client: Arc<ApiClient>,
    path: String,
    _marker: PhantomData<fn() -> S>,
}

impl<S> RestAggregateFetcher<S> {
    pub fn new(client: Arc<ApiClient>, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<S> AggregateFetcher<S> for RestAggregateFetcher<S>
where
    S: DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch(&self) -> Result<S, SyncError> {
        self.client
            .fetch_value(&self.path)
            .await
            .map_err(SyncError::from)
    }
}

/// Standard endpoint wiring for the five resources.
pub fn resource_fetchers(client: &Arc<ApiClient>) -> ResourceFetchers {
    ResourceFetchers {
        yards: Arc::new(RestPageFetcher::<Yard>::new(Arc::clone(client), "yards")),
        tasks: Arc::new(
            RestPageFetcher::<Task>::new(Arc::clone(client), "tasks").with_sort("dueAt,asc"),
        ),
        task_progress: Arc::new(RestAggregateFetcher::<TaskProgress>::new(
            Arc::clone(client),
            "tasks/progress",
        )),
        orders: Arc::new(
            RestPageFetcher::<Order>::new(Arc::clone(client), "orders").with_sort("placedAt,desc"),
        ),
        order_stats: Arc::new(RestAggregateFetcher::<OrderStats>::new(
            Arc::clone(client),
            "orders/stats",
        )),
        notifications: Arc::new(
            RestPageFetcher::<Notification>::new(Arc::clone(client), "notifications")
                .with_sort("createdAt,desc"),
        ),
        herd_kpis: Arc::new(RestAggregateFetcher::<HerdKpis>::new(
            Arc::clone(client),
            "livestock/kpis",
        )),
    }
}
