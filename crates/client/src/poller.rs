//! # Metrics Poller
//!
//! Pulls fleet metrics and node health on a fixed cadence with
//! per-slice failure isolation.
//!
//! ## Tick Anatomy
//!
//! Each tick issues five independent fetches concurrently:
//!
//! | Slice | Endpoint | View field |
//! |-------|----------|------------|
//! | status | `/status` | `snapshot.{registered_nodes, pending_tasks, completed_tasks}` |
//! | task analytics | `/analytics/tasks` | `snapshot.{average_latency, system_uptime}` |
//! | model usage | `/analytics/models` | `snapshot.model_usage` |
//! | node health | `/analytics/nodes` | `nodes` |
//! | recent activity | `/analytics/recent` | `recent` |
//!
//! Failure of one slice never blocks or invalidates the others. A
//! failed slice keeps its previous successful value (stale data over a
//! dead dashboard); before the first success, defined defaults apply:
//! zero counts, empty maps, uptime `"unknown"`.
//!
//! The merge is a pure function ([`merge_tick`]) over typed per-slice
//! outcomes — the transport never swallows errors into defaults.
//!
//! ## Cadence and Overlap
//!
//! The loop performs one immediate refresh, then alternates
//! `sleep(interval)` with a fully awaited tick. Because a tick runs to
//! completion before the next sleep starts, fetch cycles never stack,
//! bounding concurrent load on the metrics service to one cycle.
//!
//! ## Teardown
//!
//! [`MetricsPoller::start`] returns a [`PollerHandle`]; the owner must
//! call [`PollerHandle::stop`] when the consuming view goes away. Stop
//! signals the loop and awaits the task, so no recurring timer outlives
//! its owner.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use parallax_common::{
    MetricsSnapshot, ModelUsageResponse, NodeHealthMap, NodeHealthResponse, RecentActivityResponse,
    RecentTask, StatusResponse, TaskAnalyticsResponse,
};

use crate::api::MetricsApi;
use crate::error::ClientError;

// ════════════════════════════════════════════════════════════════════════════
// VIEW STATE
// ════════════════════════════════════════════════════════════════════════════

/// Everything the metrics dashboard renders, replaced slice-wise per tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsView {
    /// Fleet counters, latency, usage, uptime.
    pub snapshot: MetricsSnapshot,
    /// Per-node health, replaced wholesale on success.
    pub nodes: NodeHealthMap,
    /// Recent task activity feed, replaced wholesale on success.
    pub recent: Vec<RecentTask>,
}

/// Typed per-slice outcomes of one tick.
pub struct TickOutcome {
    pub status: Result<StatusResponse, ClientError>,
    pub tasks: Result<TaskAnalyticsResponse, ClientError>,
    pub models: Result<ModelUsageResponse, ClientError>,
    pub nodes: Result<NodeHealthResponse, ClientError>,
    pub recent: Result<RecentActivityResponse, ClientError>,
}

// ════════════════════════════════════════════════════════════════════════════
// MERGE
// ════════════════════════════════════════════════════════════════════════════

/// Merge one tick's outcomes into the previous view.
///
/// Pure: no I/O, no clock reads (`now_secs` is passed in). Successful
/// slices replace their view fields wholesale; failed slices retain the
/// previous values and are logged at `warn`.
pub fn merge_tick(prev: &MetricsView, outcome: TickOutcome, now_secs: u64) -> MetricsView {
    let mut next = prev.clone();

    match outcome.status {
        Ok(s) => {
            next.snapshot.registered_nodes = s.registered_nodes;
            next.snapshot.pending_tasks = s.pending_tasks;
            next.snapshot.completed_tasks = s.completed_tasks;
        }
        Err(e) => warn!("status fetch failed, keeping previous values: {}", e),
    }

    match outcome.tasks {
        Ok(t) => {
            next.snapshot.average_latency = t.average_latency;
            next.snapshot.system_uptime = format_uptime(t.boot_time, now_secs);
        }
        Err(e) => warn!("task analytics fetch failed, keeping previous values: {}", e),
    }

    match outcome.models {
        Ok(m) => next.snapshot.model_usage = m.model_usage,
        Err(e) => warn!("model usage fetch failed, keeping previous values: {}", e),
    }

    match outcome.nodes {
        Ok(n) => next.nodes = n.nodes,
        Err(e) => warn!("node health fetch failed, keeping previous values: {}", e),
    }

    match outcome.recent {
        Ok(r) => next.recent = r.recent_tasks,
        Err(e) => warn!("recent activity fetch failed, keeping previous values: {}", e),
    }

    next
}

/// Whole minutes since boot (`"1 minute"` / `"N minutes"`), or
/// `"unknown"` when the source did not report a boot time.
fn format_uptime(boot_time: Option<u64>, now_secs: u64) -> String {
    match boot_time {
        Some(boot) => {
            let minutes = now_secs.saturating_sub(boot) / 60;
            if minutes == 1 {
                "1 minute".to_string()
            } else {
                format!("{} minutes", minutes)
            }
        }
        None => "unknown".to_string(),
    }
}

fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

// ════════════════════════════════════════════════════════════════════════════
// POLLER
// ════════════════════════════════════════════════════════════════════════════

/// Recurring metrics refresher. Start with [`MetricsPoller::start`],
/// stop with the returned handle.
pub struct MetricsPoller {
    api: Arc<dyn MetricsApi>,
    view: Arc<RwLock<MetricsView>>,
    interval: Duration,
    shutdown: Arc<Notify>,
}

/// Handle owning the running poll task. Dropping it without calling
/// [`PollerHandle::stop`] detaches the task; owners are expected to
/// stop it on teardown.
pub struct PollerHandle {
    join: JoinHandle<()>,
    shutdown: Arc<Notify>,
}

impl PollerHandle {
    /// Signals the loop to exit and awaits it. Guaranteed cancellation:
    /// after this returns, no further fetches are issued.
    pub async fn stop(self) {
        self.shutdown.notify_one();
        let _ = self.join.await;
    }
}

impl MetricsPoller {
    pub fn new(api: Arc<dyn MetricsApi>, interval: Duration) -> Self {
        MetricsPoller {
            api,
            view: Arc::new(RwLock::new(MetricsView::default())),
            interval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Shared handle to the view state for consumers to render from.
    pub fn view_handle(&self) -> Arc<RwLock<MetricsView>> {
        Arc::clone(&self.view)
    }

    /// Cloned snapshot of the current view.
    pub fn view(&self) -> MetricsView {
        self.view.read().clone()
    }

    /// Run one fetch-and-merge cycle immediately, outside the cadence.
    pub async fn refresh(&self) {
        let (status, tasks, models, nodes, recent) = tokio::join!(
            self.api.fetch_status(),
            self.api.fetch_task_analytics(),
            self.api.fetch_model_usage(),
            self.api.fetch_node_health(),
            self.api.fetch_recent_activity(),
        );
        let outcome = TickOutcome {
            status,
            tasks,
            models,
            nodes,
            recent,
        };
        let now = unix_now_secs();
        let merged = {
            let prev = self.view.read();
            merge_tick(&prev, outcome, now)
        };
        *self.view.write() = merged;
        debug!("metrics view refreshed");
    }

    /// Spawns the recurring poll loop: one immediate refresh, then one
    /// per interval until stopped.
    pub fn start(self: Arc<Self>) -> PollerHandle {
        let shutdown = Arc::clone(&self.shutdown);
        let join = tokio::spawn(async move {
            info!("metrics poller started: refreshing every {:?}", self.interval);
            self.refresh().await;
            loop {
                tokio::select! {
                    _ = self.shutdown.notified() => {
                        info!("metrics poller shutting down");
                        break;
                    }
                    _ = sleep(self.interval) => {
                        self.refresh().await;
                    }
                }
            }
        });
        PollerHandle { join, shutdown }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════
