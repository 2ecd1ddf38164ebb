//! Composition root: the five resources over one shared store, plus the
//! background resync worker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::reachability::{Reachability, ReachabilityHandle};
use crate::resources::{
    HerdKpis, LivestockSync, Notification, NotificationsSync, Order, OrderStats, OrdersSync, Task,
    TaskProgress, TasksSync, Yard, YardSync,
};
use crate::store::KeyValueStore;
use crate::sync::{
    AggregateFetcher, PageFetcher, ResyncHandle, ResyncTarget, SyncStatus,
    RESYNC_STATUS_RESET_SECS,
};

/// Remote fetch ports for every resource, injected at wiring time.
pub struct ResourceFetchers {
    pub yards: Arc<dyn PageFetcher<Yard>>,
    pub tasks: Arc<dyn PageFetcher<Task>>,
    pub task_progress: Arc<dyn AggregateFetcher<TaskProgress>>,
    pub orders: Arc<dyn PageFetcher<Order>>,
    pub order_stats: Arc<dyn AggregateFetcher<OrderStats>>,
    pub notifications: Arc<dyn PageFetcher<Notification>>,
    pub herd_kpis: Arc<dyn AggregateFetcher<HerdKpis>>,
}

/// Everything the UI layer reads, wired once at startup.
pub struct SyncRegistry {
    pub yards: Arc<YardSync>,
    pub tasks: Arc<TasksSync>,
    pub orders: Arc<OrdersSync>,
    pub notifications: Arc<NotificationsSync>,
    pub livestock: Arc<LivestockSync>,
    reachability: ReachabilityHandle,
    resync: ResyncHandle,
}

impl SyncRegistry {
    /// Wire every resource and start the resync worker, assuming the network
    /// is up until the shell reports otherwise. Must be called from within a
    /// tokio runtime.
    pub fn new(store: Arc<dyn KeyValueStore>, fetchers: ResourceFetchers) -> Self {
        Self::with_reachability(store, fetchers, ReachabilityHandle::new(true))
    }

    pub fn with_reachability(
        store: Arc<dyn KeyValueStore>,
        fetchers: ResourceFetchers,
        reachability: ReachabilityHandle,
    ) -> Self {
        let yards = Arc::new(YardSync::new(Arc::clone(&store), fetchers.yards));
        let tasks = Arc::new(TasksSync::new(
            Arc::clone(&store),
            fetchers.tasks,
            fetchers.task_progress,
        ));
        let orders = Arc::new(OrdersSync::new(
            Arc::clone(&store),
            fetchers.orders,
            fetchers.order_stats,
        ));
        let notifications = Arc::new(NotificationsSync::new(
            Arc::clone(&store),
            fetchers.notifications,
        ));
        let livestock = Arc::new(LivestockSync::new(store, fetchers.herd_kpis));

        let targets: Vec<Arc<dyn ResyncTarget>> = vec![
            Arc::clone(&yards) as Arc<dyn ResyncTarget>,
            Arc::clone(&tasks) as Arc<dyn ResyncTarget>,
            Arc::clone(&orders) as Arc<dyn ResyncTarget>,
            Arc::clone(&notifications) as Arc<dyn ResyncTarget>,
            Arc::clone(&livestock) as Arc<dyn ResyncTarget>,
        ];
        let resync = ResyncHandle::spawn(
            targets,
            reachability.subscribe(),
            Duration::from_secs(RESYNC_STATUS_RESET_SECS),
        );

        Self {
            yards,
            tasks,
            orders,
            notifications,
            livestock,
            reachability,
            resync,
        }
    }

    pub fn yards(&self) -> Arc<YardSync> {
        Arc::clone(&self.yards)
    }

    pub fn tasks(&self) -> Arc<TasksSync> {
        Arc::clone(&self.tasks)
    }

    pub fn orders(&self) -> Arc<OrdersSync> {
        Arc::clone(&self.orders)
    }

    pub fn notifications(&self) -> Arc<NotificationsSync> {
        Arc::clone(&self.notifications)
    }

    pub fn livestock(&self) -> Arc<LivestockSync> {
        Arc::clone(&self.livestock)
    }

    /// Report a connectivity change from the platform shell.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachability.set_reachable(reachable);
    }

    pub fn is_reachable(&self) -> bool {
        self.reachability.is_reachable()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.resync.status()
    }

    pub fn subscribe_sync_status(&self) -> watch::Receiver<SyncStatus> {
        self.resync.subscribe()
    }

    /// Queue a resync cycle outside the reconnect path (pull-to-refresh).
    pub fn trigger_resync(&self) {
        self.resync.trigger();
    }

    /// Clear every cached namespace and the read overlay, so the next login
    /// starts cold and sees none of the previous user's data.
    pub async fn logout_reset(&self) {
        self.yards.clear_cache().await;
        self.tasks.clear_cache().await;
        self.orders.clear_cache().await;
        self.notifications.reset_local().await;
        self.livestock.clear_cache().await;
    }
}
