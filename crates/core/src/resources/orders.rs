//! Livestock orders: a paged list plus the order-stats aggregate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cache::{AggregateCache, PageCache};
use crate::store::KeyValueStore;
use crate::sync::{
    AggregateFetcher, AggregateState, AggregateSyncEngine, LoadOutcome, PageFetcher,
    PagedSyncEngine, ResourceState, ResyncTarget, DEFAULT_PAGE_SIZE,
};

pub const ORDERS_RESOURCE: &str = "orders";

/// Fixed cache key for the order stats aggregate.
pub const ORDER_STATS_KEY: &str = "orderStats";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub reference: String,
    pub customer: String,
    pub head_count: u32,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

/// Counters and revenue fetched from the orders stats endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: u32,
    pub pending: u32,
    pub confirmed: u32,
    pub delivered: u32,
    pub cancelled: u32,
    pub total_revenue: Decimal,
}

/// Offline-first access to orders and their stats.
pub struct OrdersSync {
    pages: PagedSyncEngine<Order>,
    stats: AggregateSyncEngine<OrderStats>,
}

impl OrdersSync {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        page_fetcher: Arc<dyn PageFetcher<Order>>,
        stats_fetcher: Arc<dyn AggregateFetcher<OrderStats>>,
    ) -> Self {
        let page_cache = PageCache::new(ORDERS_RESOURCE, Arc::clone(&store));
        let stats_cache = AggregateCache::new(ORDER_STATS_KEY, store);
        Self {
            pages: PagedSyncEngine::new(page_cache, page_fetcher, DEFAULT_PAGE_SIZE),
            stats: AggregateSyncEngine::new(stats_cache, stats_fetcher),
        }
    }

    pub async fn load_page(&self, page: u32, size: u32) -> LoadOutcome {
        self.pages.load_page(page, size).await
    }

    pub async fn load_stats(&self) -> LoadOutcome {
        self.stats.load().await
    }

    /// Load the page and the aggregate together.
    pub async fn load_all(&self, page: u32, size: u32) -> (LoadOutcome, LoadOutcome) {
        tokio::join!(self.pages.load_page(page, size), self.stats.load())
    }

    pub async fn load_cached_only(&self) -> (ResourceState<Order>, AggregateState<OrderStats>) {
        tokio::join!(self.pages.load_cached_only(), self.stats.load_cached_only())
    }

    pub async fn orders_state(&self) -> ResourceState<Order> {
        self.pages.state().await
    }

    pub async fn stats_state(&self) -> AggregateState<OrderStats> {
        self.stats.state().await
    }

    pub async fn clear_cache(&self) {
        self.pages.clear_cache().await;
        self.stats.clear_cache().await;
    }
}

#[async_trait]
impl ResyncTarget for OrdersSync {
    fn name(&self) -> &str {
        ORDERS_RESOURCE
    }

    async fn has_data(&self) -> bool {
        self.pages.has_items().await || self.stats.has_value().await
    }

    async fn resync(&self) -> LoadOutcome {
        let (pages, stats) = tokio::join!(self.pages.refresh(), self.stats.refresh());
        pages.combined(stats)
    }
}
