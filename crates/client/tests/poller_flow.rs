//! Integration tests for the metrics poller against an in-memory
//! metrics service stub with per-slice failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use parallax_client::{ClientError, MetricsApi, MetricsPoller};
use parallax_common::{
    ModelUsageResponse, NodeHealthInfo, NodeHealthResponse, RecentActivityResponse,
    StatusResponse, TaskAnalyticsResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// MOCK METRICS SERVICE
// ════════════════════════════════════════════════════════════════════════════

/// In-memory metrics service with an independent failure switch per
/// slice and a tick counter.
struct MockMetrics {
    status_calls: AtomicUsize,
    registered_nodes: AtomicUsize,
    fail_status: AtomicBool,
    fail_tasks: AtomicBool,
    fail_models: AtomicBool,
    fail_nodes: AtomicBool,
    fail_recent: AtomicBool,
}

impl MockMetrics {
    fn new() -> Self {
        MockMetrics {
            status_calls: AtomicUsize::new(0),
            registered_nodes: AtomicUsize::new(3),
            fail_status: AtomicBool::new(false),
            fail_tasks: AtomicBool::new(false),
            fail_models: AtomicBool::new(false),
            fail_nodes: AtomicBool::new(false),
            fail_recent: AtomicBool::new(false),
        }
    }

    fn check(flag: &AtomicBool) -> Result<(), ClientError> {
        if flag.load(Ordering::SeqCst) {
            Err(ClientError::Status(500))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MetricsApi for MockMetrics {
    async fn fetch_status(&self) -> Result<StatusResponse, ClientError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_status)?;
        Ok(StatusResponse {
            registered_nodes: self.registered_nodes.load(Ordering::SeqCst) as u64,
            pending_tasks: 1,
            completed_tasks: 10,
        })
    }

    async fn fetch_task_analytics(&self) -> Result<TaskAnalyticsResponse, ClientError> {
        Self::check(&self.fail_tasks)?;
        Ok(TaskAnalyticsResponse {
            average_latency: 0.42,
            boot_time: Some(0),
        })
    }

    async fn fetch_model_usage(&self) -> Result<ModelUsageResponse, ClientError> {
        Self::check(&self.fail_models)?;
        let mut usage = HashMap::new();
        usage.insert("m1".to_string(), 5);
        Ok(ModelUsageResponse { model_usage: usage })
    }

    async fn fetch_node_health(&self) -> Result<NodeHealthResponse, ClientError> {
        Self::check(&self.fail_nodes)?;
        let mut nodes = HashMap::new();
        nodes.insert(
            "node-1".to_string(),
            NodeHealthInfo {
                capabilities: vec!["inference".to_string()],
                last_seen: 1_700_000_000,
            },
        );
        Ok(NodeHealthResponse { nodes })
    }

    async fn fetch_recent_activity(&self) -> Result<RecentActivityResponse, ClientError> {
        Self::check(&self.fail_recent)?;
        Ok(RecentActivityResponse {
            recent_tasks: Vec::new(),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════

/// A manual refresh populates every slice.
#[tokio::test]
async fn test_refresh_populates_view() {
    let api = Arc::new(MockMetrics::new());
    let poller = MetricsPoller::new(api, Duration::from_secs(3600));

    poller.refresh().await;

    let view = poller.view();
    assert_eq!(view.snapshot.registered_nodes, 3);
    assert_eq!(view.snapshot.pending_tasks, 1);
    assert_eq!(view.snapshot.model_usage.get("m1"), Some(&5));
    assert!(view.nodes.contains_key("node-1"));
    assert_ne!(view.snapshot.system_uptime, "unknown");
}

/// The retained-value property end to end: tick 1 succeeds, tick
/// 2's model-usage fetch fails while status updates normally.
#[tokio::test]
async fn test_failed_slice_retains_value_across_ticks() {
    let api = Arc::new(MockMetrics::new());
    let poller = MetricsPoller::new(Arc::clone(&api) as Arc<dyn MetricsApi>, Duration::from_secs(3600));

    poller.refresh().await;
    assert_eq!(poller.view().snapshot.model_usage.get("m1"), Some(&5));

    api.fail_models.store(true, Ordering::SeqCst);
    api.registered_nodes.store(7, Ordering::SeqCst);
    poller.refresh().await;

    let view = poller.view();
    assert_eq!(view.snapshot.model_usage.get("m1"), Some(&5), "stale value retained");
    assert_eq!(view.snapshot.registered_nodes, 7, "independent slice updated");
}

/// Every slice failing still leaves a usable (default) dashboard.
#[tokio::test]
async fn test_total_outage_keeps_defaults() {
    let api = Arc::new(MockMetrics::new());
    api.fail_status.store(true, Ordering::SeqCst);
    api.fail_tasks.store(true, Ordering::SeqCst);
    api.fail_models.store(true, Ordering::SeqCst);
    api.fail_nodes.store(true, Ordering::SeqCst);
    api.fail_recent.store(true, Ordering::SeqCst);

    let poller = MetricsPoller::new(Arc::clone(&api) as Arc<dyn MetricsApi>, Duration::from_secs(3600));
    poller.refresh().await;

    let view = poller.view();
    assert_eq!(view.snapshot.registered_nodes, 0);
    assert_eq!(view.snapshot.system_uptime, "unknown");
    assert!(view.nodes.is_empty());
}

/// `start` performs an immediate first refresh without waiting a full
/// interval lap.
#[tokio::test]
async fn test_start_refreshes_immediately() {
    let api = Arc::new(MockMetrics::new());
    let poller = Arc::new(MetricsPoller::new(
        Arc::clone(&api) as Arc<dyn MetricsApi>,
        Duration::from_secs(3600),
    ));

    let handle = Arc::clone(&poller).start();

    // wait for the first tick to land without depending on the interval
    for _ in 0..100 {
        if api.status_calls.load(Ordering::SeqCst) >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(api.status_calls.load(Ordering::SeqCst) >= 1);
    assert_eq!(poller.view().snapshot.registered_nodes, 3);

    handle.stop().await;
}

/// After `stop` returns, no further fetches are issued.
#[tokio::test]
async fn test_stop_cancels_recurring_ticks() {
    let api = Arc::new(MockMetrics::new());
    let poller = Arc::new(MetricsPoller::new(
        Arc::clone(&api) as Arc<dyn MetricsApi>,
        Duration::from_millis(10),
    ));

    let handle = Arc::clone(&poller).start();
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.stop().await;

    let calls_after_stop = api.status_calls.load(Ordering::SeqCst);
    assert!(calls_after_stop >= 1);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        api.status_calls.load(Ordering::SeqCst),
        calls_after_stop,
        "no ticks after stop"
    );
}
