//! Write-through caches layered over the key-value store.
//!
//! Paged collections are cached one entry per page under
//! `{resource}_page_{n}`; stats and KPI payloads live under a single fixed
//! key per resource. Entries never expire: validity is indefinite and fresh
//! fetches simply overwrite. All store failures are logged and swallowed so a
//! broken disk can never take a screen down.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::store::KeyValueStore;
use crate::sync::Page;

fn page_key(resource: &str, page: u32) -> String {
    format!("{}_page_{}", resource, page)
}

fn page_prefix(resource: &str) -> String {
    format!("{}_page_", resource)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a, T> {
    data: &'a T,
    cached_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    data: T,
    // Absent on entries written before the timestamp was introduced.
    #[serde(default)]
    cached_at: Option<DateTime<Utc>>,
}

/// Page-keyed cache for one paged resource.
pub struct PageCache<T> {
    resource: String,
    store: Arc<dyn KeyValueStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PageCache<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(resource: impl Into<String>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            resource: resource.into(),
            store,
            _marker: PhantomData,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Persist one page, best effort. Failures are logged, never surfaced.
    pub async fn write_page(&self, page: u32, value: &Page<T>) {
        let key = page_key(&self.resource, page);
        let envelope = EnvelopeRef {
            data: value,
            cached_at: Utc::now(),
        };
        let payload = match serde_json::to_string(&envelope) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    "{}: failed to serialize page {} for caching: {}",
                    self.resource, page, e
                );
                return;
            }
        };
        if let Err(e) = self.store.set(&key, &payload).await {
            warn!("{}: failed to cache page {}: {}", self.resource, page, e);
        }
    }

    /// Read one cached page. Absent, unreadable and corrupt entries all
    /// count as a miss.
    pub async fn read_page(&self, page: u32) -> Option<Page<T>> {
        let key = page_key(&self.resource, page);
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(
                    "{}: failed to read cached page {}: {}",
                    self.resource, page, e
                );
                return None;
            }
        };
        match serde_json::from_str::<Envelope<Page<T>>>(&raw) {
            Ok(envelope) => {
                debug!(
                    "{}: cache hit for page {} (cached at {:?})",
                    self.resource, page, envelope.cached_at
                );
                Some(envelope.data)
            }
            Err(e) => {
                warn!(
                    "{}: dropping corrupt cache entry for page {}: {}",
                    self.resource, page, e
                );
                None
            }
        }
    }

    /// Remove every cached page belonging to this resource.
    pub async fn clear_all(&self) {
        let prefix = page_prefix(&self.resource);
        let keys = match self.store.get_all_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("{}: failed to enumerate cache keys: {}", self.resource, e);
                return;
            }
        };
        let own: Vec<String> = keys
            .into_iter()
            .filter(|key| key.starts_with(&prefix))
            .collect();
        if own.is_empty() {
            return;
        }
        if let Err(e) = self.store.multi_remove(&own).await {
            warn!("{}: failed to clear cached pages: {}", self.resource, e);
        }
    }
}

/// Fixed-key cache for a stats or KPI payload.
pub struct AggregateCache<S> {
    key: String,
    store: Arc<dyn KeyValueStore>,
    _marker: PhantomData<fn() -> S>,
}

impl<S> AggregateCache<S>
where
    S: Serialize + DeserializeOwned,
{
    pub fn new(key: impl Into<String>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            key: key.into(),
            store,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persist the aggregate, best effort.
    pub async fn write(&self, value: &S) {
        let envelope = EnvelopeRef {
            data: value,
            cached_at: Utc::now(),
        };
        let payload = match serde_json::to_string(&envelope) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("{}: failed to serialize aggregate: {}", self.key, e);
                return;
            }
        };
        if let Err(e) = self.store.set(&self.key, &payload).await {
            warn!("{}: failed to cache aggregate: {}", self.key, e);
        }
    }

    /// Read the cached aggregate, treating corrupt entries as a miss.
    pub async fn read(&self) -> Option<S> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("{}: failed to read cached aggregate: {}", self.key, e);
                return None;
            }
        };
        match serde_json::from_str::<Envelope<S>>(&raw) {
            Ok(envelope) => {
                debug!(
                    "{}: cache hit (cached at {:?})",
                    self.key, envelope.cached_at
                );
                Some(envelope.data)
            }
            Err(e) => {
                warn!("{}: dropping corrupt cache entry: {}", self.key, e);
                None
            }
        }
    }

    /// Remove the cached aggregate.
    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key).await {
            warn!("{}: failed to clear cached aggregate: {}", self.key, e);
        }
    }
}
