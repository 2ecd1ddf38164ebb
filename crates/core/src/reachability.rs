//! Network reachability port.
//!
//! The embedding shell owns the platform connectivity monitor and drives a
//! [`ReachabilityHandle`]; the sync core only ever observes transitions
//! through the watch channel. Callers that gate actions on connectivity
//! (page-forward while offline, for instance) check `is_reachable` first.

use tokio::sync::watch;

/// Read-side view of device connectivity.
pub trait Reachability: Send + Sync {
    /// Last reported reachability.
    fn is_reachable(&self) -> bool;

    /// Subscribe to reachability transitions.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Watch-channel backed reachability source driven by the shell.
#[derive(Debug)]
pub struct ReachabilityHandle {
    tx: watch::Sender<bool>,
}

impl ReachabilityHandle {
    pub fn new(initial: bool) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Report the current connectivity state. Repeated reports of the same
    /// value are dropped so subscribers only wake on transitions.
    pub fn set_reachable(&self, reachable: bool) {
        self.tx.send_if_modified(|current| {
            if *current == reachable {
                false
            } else {
                *current = reachable;
                true
            }
        });
    }
}

impl Reachability for ReachabilityHandle {
    fn is_reachable(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_wake_only_on_transitions() {
        let handle = ReachabilityHandle::new(true);
        let mut rx = handle.subscribe();

        handle.set_reachable(true);
        assert!(!rx.has_changed().unwrap());

        handle.set_reachable(false);
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
        assert!(!handle.is_reachable());
    }
}
