//! Wire types for the Parallax inference and metrics services.
//!
//! All types here mirror the JSON bodies exchanged with the two remote
//! services. They are plain owned data: immutable once received, `Clone`
//! for snapshotting, and serde-derived on both sides so the same structs
//! serve requests, responses, and test fixtures.
//!
//! ## Service Split
//!
//! | Service | Types |
//! |---------|-------|
//! | Inference (`/query`, `/history`) | [`QueryRequest`], [`TaskResponse`], [`HistoryResponse`] |
//! | Metrics (`/status`, `/analytics/*`) | [`StatusResponse`], [`TaskAnalyticsResponse`], [`ModelUsageResponse`], [`NodeHealthResponse`], [`RecentActivityResponse`] |
//!
//! [`MetricsSnapshot`] is not a wire type: it is the client-side view
//! derived from several metrics responses, replaced wholesale on each
//! successful poll merge.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Opaque per-profile session identifier (`sess-<millis>-<suffix>` shape).
///
/// Created once per profile by the session store and reused unchanged
/// across restarts.
pub type SessionId = String;

// ════════════════════════════════════════════════════════════════════════════
// INFERENCE SERVICE TYPES
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /query`.
///
/// `query` is trimmed and non-empty by the time a request is constructed;
/// the query client enforces that precondition before any network call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Trimmed, non-empty natural-language query.
    pub query: String,
    /// Session the query belongs to.
    pub session_id: SessionId,
    /// Model the service should run the query against.
    pub model_id: String,
    /// Whether the service should attach an attestation certificate.
    pub return_dacert: bool,
}

/// A single inference result as produced by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// The query text the service received.
    pub input: String,
    /// The model output.
    pub output: String,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    /// Model that produced the output.
    pub model_id: String,
    /// Unix timestamp (seconds) when the result was produced.
    pub timestamp: u64,
}

/// Decentralized Attestation Certificate attached to a result.
///
/// A bundle of signer identities, their signatures (aligned 1:1 with
/// `signers`), and the quorum threshold asserted to back `output_hash`.
/// The client checks the *structural* integrity of these fields; it does
/// not verify the signatures cryptographically (see the validator module).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DACert {
    /// Task the certificate attests to.
    pub task_id: String,
    /// Hash of the attested output, as reported by the service.
    pub output_hash: String,
    /// Ordered signer identifiers. Uniqueness is expected, not guaranteed.
    pub signers: Vec<String>,
    /// Signatures aligned 1:1 with `signers`.
    pub signatures: Vec<String>,
    /// Minimum number of valid signatures required to back the output.
    pub quorum: u32,
}

/// Response to a submitted query. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Service-assigned task identifier.
    pub task_id: String,
    /// Session the task was submitted under.
    pub session_id: SessionId,
    /// The inference result.
    pub result: InferenceResult,
    /// Attestation certificate, present only when requested.
    #[serde(default)]
    pub dacert: Option<DACert>,
}

/// Envelope of `GET /history/{session_id}`.
///
/// `history` is ascending (oldest first). An absent field deserializes
/// as empty; a malformed field fails the envelope parse, which the
/// transport layer also maps to an empty history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<TaskResponse>,
}

// ════════════════════════════════════════════════════════════════════════════
// METRICS SERVICE TYPES
// ════════════════════════════════════════════════════════════════════════════

/// Envelope of `GET /status`: fleet-level counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub registered_nodes: u64,
    pub pending_tasks: u64,
    pub completed_tasks: u64,
}

/// Envelope of `GET /analytics/tasks`.
///
/// `boot_time` is the fleet's boot timestamp (unix seconds); it may be
/// absent, in which case uptime is reported as `"unknown"` rather than
/// derived from a misleading default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAnalyticsResponse {
    pub average_latency: f64,
    #[serde(default)]
    pub boot_time: Option<u64>,
}

/// Envelope of `GET /analytics/models`: per-model task counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelUsageResponse {
    #[serde(default)]
    pub model_usage: HashMap<String, u64>,
}

/// Health record for one worker node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeHealthInfo {
    /// Capability tags the node advertises.
    pub capabilities: Vec<String>,
    /// Unix timestamp (seconds) of the node's last heartbeat.
    pub last_seen: u64,
}

/// Node id → health record, replaced wholesale on each successful poll.
pub type NodeHealthMap = HashMap<String, NodeHealthInfo>;

/// Envelope of `GET /analytics/nodes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeHealthResponse {
    #[serde(default)]
    pub nodes: NodeHealthMap,
}

/// One entry of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTask {
    pub task_id: String,
    pub model_id: String,
    pub timestamp: u64,
    pub latency: f64,
}

/// Envelope of `GET /analytics/recent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentActivityResponse {
    #[serde(default)]
    pub recent_tasks: Vec<RecentTask>,
}

// ════════════════════════════════════════════════════════════════════════════
// CLIENT-SIDE METRICS VIEW
// ════════════════════════════════════════════════════════════════════════════

/// Fleet metrics as shown to the user.
///
/// Derived from `/status`, `/analytics/tasks`, and `/analytics/models`
/// by the poller's merge step. Each slice is replaced wholesale when its
/// fetch succeeds and retained unchanged when it fails; this struct is
/// never partially merged field-by-field within one slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub registered_nodes: u64,
    pub pending_tasks: u64,
    pub completed_tasks: u64,
    pub average_latency: f64,
    pub model_usage: HashMap<String, u64>,
    /// Human-readable uptime (`"1 minute"` / `"N minutes"`), or
    /// `"unknown"` before the first successful task-analytics fetch or
    /// when `boot_time` is absent.
    pub system_uptime: String,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        MetricsSnapshot {
            registered_nodes: 0,
            pending_tasks: 0,
            completed_tasks: 0,
            average_latency: 0.0,
            model_usage: HashMap::new(),
            system_uptime: "unknown".to_string(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_response_roundtrip_with_cert() {
        let json = r#"{
            "task_id": "task-1",
            "session_id": "sess-1700000000000-abc",
            "result": {
                "input": "hello",
                "output": "POSITIVE",
                "confidence": 0.9,
                "model_id": "parallax-llm-v1",
                "timestamp": 1700000000
            },
            "dacert": {
                "task_id": "task-1",
                "output_hash": "deadbeef",
                "signers": ["a", "b", "c"],
                "signatures": ["s1", "s2", "s3"],
                "quorum": 2
            }
        }"#;
        let resp: TaskResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(resp.task_id, "task-1");
        let cert = resp.dacert.as_ref().expect("cert present");
        assert_eq!(cert.signers.len(), 3);
        assert_eq!(cert.quorum, 2);
    }

    #[test]
    fn test_task_response_without_cert_field() {
        let json = r#"{
            "task_id": "task-2",
            "session_id": "sess-x",
            "result": {
                "input": "q",
                "output": "NEGATIVE",
                "confidence": 0.5,
                "model_id": "m",
                "timestamp": 1
            }
        }"#;
        let resp: TaskResponse = serde_json::from_str(json).expect("parse");
        assert!(resp.dacert.is_none());
    }

    #[test]
    fn test_history_response_absent_field_is_empty() {
        let resp: HistoryResponse = serde_json::from_str("{}").expect("parse");
        assert!(resp.history.is_empty());
    }

    #[test]
    fn test_task_analytics_boot_time_optional() {
        let with: TaskAnalyticsResponse =
            serde_json::from_str(r#"{"average_latency": 0.4, "boot_time": 1700000000}"#)
                .expect("parse");
        assert_eq!(with.boot_time, Some(1_700_000_000));

        let without: TaskAnalyticsResponse =
            serde_json::from_str(r#"{"average_latency": 0.4}"#).expect("parse");
        assert!(without.boot_time.is_none());
    }

    #[test]
    fn test_metrics_snapshot_default_is_unknown_uptime() {
        let snap = MetricsSnapshot::default();
        assert_eq!(snap.registered_nodes, 0);
        assert_eq!(snap.system_uptime, "unknown");
        assert!(snap.model_usage.is_empty());
    }
}
