//! Livestock KPIs. A single flat snapshot, no paging.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::AggregateCache;
use crate::store::KeyValueStore;
use crate::sync::{
    AggregateFetcher, AggregateState, AggregateSyncEngine, LoadOutcome, ResyncTarget,
};

pub const LIVESTOCK_RESOURCE: &str = "livestock";

/// Fixed cache key for the herd KPI snapshot.
pub const LIVESTOCK_KPIS_KEY: &str = "livestockKpis";

/// Herd-level indicators for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HerdKpis {
    pub total_head: u32,
    pub yard_utilisation_pct: f64,
    pub average_weight_kg: f64,
    pub daily_gain_kg: f64,
    pub mortality_pct: f64,
}

/// Offline-first access to the herd KPI snapshot.
pub struct LivestockSync {
    kpis: AggregateSyncEngine<HerdKpis>,
}

impl LivestockSync {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        fetcher: Arc<dyn AggregateFetcher<HerdKpis>>,
    ) -> Self {
        let cache = AggregateCache::new(LIVESTOCK_KPIS_KEY, store);
        Self {
            kpis: AggregateSyncEngine::new(cache, fetcher),
        }
    }

    pub async fn load(&self) -> LoadOutcome {
        self.kpis.load().await
    }

    pub async fn load_cached_only(&self) -> AggregateState<HerdKpis> {
        self.kpis.load_cached_only().await
    }

    pub async fn state(&self) -> AggregateState<HerdKpis> {
        self.kpis.state().await
    }

    pub async fn clear_cache(&self) {
        self.kpis.clear_cache().await;
    }
}

#[async_trait]
impl ResyncTarget for LivestockSync {
    fn name(&self) -> &str {
        LIVESTOCK_RESOURCE
    }

    async fn has_data(&self) -> bool {
        self.kpis.has_value().await
    }

    async fn resync(&self) -> LoadOutcome {
        self.kpis.refresh().await
    }
}
