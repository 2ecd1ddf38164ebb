//! Background resync on connectivity regain.
//!
//! A single worker task watches the reachability channel and, on every
//! offline-to-online transition, refreshes each registered resource that has
//! already loaded data at least once. Resources that were never loaded are
//! skipped so a reconnect on the login screen stays silent. The same cycle
//! can be requested manually; requests arriving while a cycle runs coalesce
//! into at most one follow-up cycle.
//!
//! Cycle status is published on a watch channel: `Idle` at rest, `Syncing`
//! while refreshing, then `Success` or `Error`, which decays back to `Idle`
//! after a short hold so UI badges get a chance to render the outcome.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::sync::model::{LoadOutcome, SyncStatus};

/// One refreshable resource as seen by the resync worker.
#[async_trait]
pub trait ResyncTarget: Send + Sync {
    /// Resource name used in logs.
    fn name(&self) -> &str;

    /// Whether this resource has ever committed data to state. Targets
    /// without data are skipped by the cycle.
    async fn has_data(&self) -> bool;

    /// Re-issue the load for whatever the resource currently shows.
    async fn resync(&self) -> LoadOutcome;
}

/// Owner handle for the spawned resync worker. Dropping it stops the task.
pub struct ResyncHandle {
    status_rx: watch::Receiver<SyncStatus>,
    trigger_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl ResyncHandle {
    /// Spawn the worker over `targets`, reacting to `reachability` edges.
    ///
    /// `reset_after` is how long `Success`/`Error` stays visible before the
    /// status decays to `Idle`.
    pub fn spawn(
        targets: Vec<Arc<dyn ResyncTarget>>,
        reachability: watch::Receiver<bool>,
        reset_after: Duration,
    ) -> Self {
        let (status_tx, status_rx) = watch::channel(SyncStatus::Idle);
        // Capacity one on purpose: triggers fired mid-cycle collapse into a
        // single queued follow-up instead of piling up.
        let (trigger_tx, trigger_rx) = mpsc::channel(1);
        // Snapshot reachability before the task starts polling, so an edge
        // arriving in the spawn gap is still seen as a transition.
        let was_reachable = *reachability.borrow();
        let worker = ResyncWorker {
            targets,
            status_tx,
            trigger_rx,
            reachability,
            reset_after,
            was_reachable,
        };
        let task = tokio::spawn(worker.run());
        Self {
            status_rx,
            trigger_tx,
            task,
        }
    }

    /// Current cycle status.
    pub fn status(&self) -> SyncStatus {
        *self.status_rx.borrow()
    }

    /// Watch status transitions.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }

    /// Request a resync cycle now. No-op when one is already queued.
    pub fn trigger(&self) {
        let _ = self.trigger_tx.try_send(());
    }
}

impl Drop for ResyncHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct ResyncWorker {
    targets: Vec<Arc<dyn ResyncTarget>>,
    status_tx: watch::Sender<SyncStatus>,
    trigger_rx: mpsc::Receiver<()>,
    reachability: watch::Receiver<bool>,
    reset_after: Duration,
    was_reachable: bool,
}

impl ResyncWorker {
    async fn run(mut self) {
        let mut was_reachable = self.was_reachable;
        // Deadline for decaying Success/Error back to Idle. Held as a select
        // arm, not an inline sleep, so a connectivity dip landing while the
        // outcome is on display still reads as an edge.
        let mut decay_at: Option<Instant> = None;
        loop {
            let should_sync = tokio::select! {
                changed = self.reachability.changed() => match changed {
                    Ok(()) => {
                        let now_reachable = *self.reachability.borrow_and_update();
                        let regained = !was_reachable && now_reachable;
                        was_reachable = now_reachable;
                        regained
                    }
                    // Reachability source is gone; nothing left to react to.
                    Err(_) => break,
                },
                trigger = self.trigger_rx.recv() => match trigger {
                    Some(()) => true,
                    None => break,
                },
                _ = sleep_until(decay_at.unwrap_or_else(Instant::now)), if decay_at.is_some() => {
                    self.status_tx.send_replace(SyncStatus::Idle);
                    decay_at = None;
                    false
                }
            };
            if should_sync && self.run_cycle().await {
                decay_at = Some(Instant::now() + self.reset_after);
            }
        }
    }

    /// Refresh every loaded target once. Returns whether a cycle actually
    /// ran; a skipped cycle leaves the status untouched.
    async fn run_cycle(&self) -> bool {
        let mut pending = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            if target.has_data().await {
                pending.push(Arc::clone(target));
            } else {
                debug!("resync: skipping {} (nothing loaded yet)", target.name());
            }
        }
        if pending.is_empty() {
            debug!("resync: nothing loaded yet, cycle skipped");
            return false;
        }
        self.status_tx.send_replace(SyncStatus::Syncing);
        let mut any_failure = false;
        for target in &pending {
            match target.resync().await {
                LoadOutcome::Network => {
                    debug!("resync: {} refreshed from API", target.name());
                }
                LoadOutcome::CacheFallback => {
                    warn!("resync: {} still offline, served cache", target.name());
                    any_failure = true;
                }
                LoadOutcome::Failed => {
                    warn!("resync: {} failed with nothing cached", target.name());
                    any_failure = true;
                }
                LoadOutcome::Superseded => {
                    debug!(
                        "resync: {} superseded by a direct load, ignoring",
                        target.name()
                    );
                }
            }
        }
        let outcome = if any_failure {
            SyncStatus::Error
        } else {
            SyncStatus::Success
        };
        debug!("resync: cycle done, {} resource(s) refreshed", pending.len());
        self.status_tx.send_replace(outcome);
        true
    }
}
