//! Shared doubles for the sync engine and worker tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::SyncError;
use crate::sync::model::{AggregateFetcher, LoadOutcome, Page, PageFetcher};
use crate::sync::resync::ResyncTarget;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TestItem {
    pub id: i64,
    pub name: String,
}

pub(crate) fn item(id: i64) -> TestItem {
    TestItem {
        id,
        name: format!("item {id}"),
    }
}

pub(crate) fn page_of(ids: &[i64], page_number: u32, total_pages: u32, page_size: u32) -> Page<TestItem> {
    Page {
        items: ids.iter().copied().map(item).collect(),
        page_number,
        total_pages,
        total_elements: ids.len() as u64,
        page_size,
    }
}

/// Page fetcher that replays a prepared script, one entry per call.
pub(crate) struct ScriptedPageFetcher<T> {
    script: Mutex<VecDeque<Result<Page<T>, SyncError>>>,
    delays: Mutex<VecDeque<Duration>>,
    requests: Mutex<Vec<(u32, u32)>>,
}

impl<T> ScriptedPageFetcher<T> {
    pub(crate) fn new(script: Vec<Result<Page<T>, SyncError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            delays: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Per-call artificial latencies, consumed in call order.
    pub(crate) fn with_delays(self, delays: Vec<Duration>) -> Self {
        *self.delays.lock().unwrap() = delays.into();
        self
    }

    /// Every `(page, size)` pair requested so far.
    pub(crate) fn requests(&self) -> Vec<(u32, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl<T> PageFetcher<T> for ScriptedPageFetcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn fetch_page(&self, page: u32, size: u32) -> Result<Page<T>, SyncError> {
        self.requests.lock().unwrap().push((page, size));
        // Claim the scripted response before sleeping so overlapping calls
        // consume entries in request order, not completion order.
        let response = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::network("script exhausted")));
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response
    }
}

/// Aggregate fetcher twin of [`ScriptedPageFetcher`].
pub(crate) struct ScriptedAggregateFetcher<S> {
    script: Mutex<VecDeque<Result<S, SyncError>>>,
    calls: AtomicU32,
}

impl<S> ScriptedAggregateFetcher<S> {
    pub(crate) fn new(script: Vec<Result<S, SyncError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S> AggregateFetcher<S> for ScriptedAggregateFetcher<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn fetch(&self) -> Result<S, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::network("script exhausted")))
    }
}

/// Resync target with a fixed outcome and call counter.
pub(crate) struct ScriptedTarget {
    name: String,
    has_data: AtomicBool,
    outcome: LoadOutcome,
    delay: Duration,
    calls: AtomicU32,
}

impl ScriptedTarget {
    pub(crate) fn new(name: &str, has_data: bool, outcome: LoadOutcome) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            has_data: AtomicBool::new(has_data),
            outcome,
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
        })
    }

    pub(crate) fn with_delay(name: &str, outcome: LoadOutcome, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            has_data: AtomicBool::new(true),
            outcome,
            delay,
            calls: AtomicU32::new(0),
        })
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResyncTarget for ScriptedTarget {
    fn name(&self) -> &str {
        &self.name
    }

    async fn has_data(&self) -> bool {
        self.has_data.load(Ordering::SeqCst)
    }

    async fn resync(&self) -> LoadOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome
    }
}
