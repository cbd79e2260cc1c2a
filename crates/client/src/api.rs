//! # Service Transport
//!
//! Trait seams and HTTP implementations for the two remote services.
//!
//! [`InferenceApi`] and [`MetricsApi`] are the abstraction boundary the
//! rest of the client is written against; tests substitute in-memory
//! mocks for them. The HTTP implementations wrap a `reqwest::Client`
//! with a bounded request timeout and a configured base address.
//!
//! ## Failure Discipline
//!
//! Transport returns typed outcomes, never defaults:
//!
//! - network failure / timeout → [`ClientError::Transport`]
//! - non-2xx status → [`ClientError::Status`]
//! - undecodable body → [`ClientError::Malformed`]
//!
//! The "retain previous value on failure" policy lives in the poller's
//! merge step, not here. The single exception is the history envelope,
//! where an absent or malformed `history` field reads as empty — that
//! is the documented service contract, not error swallowing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use parallax_common::{
    HistoryResponse, ModelUsageResponse, NodeHealthResponse, QueryRequest,
    RecentActivityResponse, StatusResponse, TaskAnalyticsResponse, TaskResponse,
};

use crate::error::ClientError;

// ════════════════════════════════════════════════════════════════════════════
// TRAITS
// ════════════════════════════════════════════════════════════════════════════

/// Contract with the inference service.
#[async_trait]
pub trait InferenceApi: Send + Sync {
    /// `POST /query`. Any non-2xx response is a submission failure.
    async fn submit_query(&self, request: &QueryRequest) -> Result<TaskResponse, ClientError>;

    /// `GET /history/{session_id}`, ascending order. An absent or
    /// malformed `history` field is treated as empty.
    async fn fetch_history(&self, session_id: &str) -> Result<Vec<TaskResponse>, ClientError>;
}

/// Contract with the metrics service. Each fetch is independent; the
/// poller isolates their failures from one another.
#[async_trait]
pub trait MetricsApi: Send + Sync {
    async fn fetch_status(&self) -> Result<StatusResponse, ClientError>;
    async fn fetch_task_analytics(&self) -> Result<TaskAnalyticsResponse, ClientError>;
    async fn fetch_model_usage(&self) -> Result<ModelUsageResponse, ClientError>;
    async fn fetch_node_health(&self) -> Result<NodeHealthResponse, ClientError>;
    async fn fetch_recent_activity(&self) -> Result<RecentActivityResponse, ClientError>;
}

// ════════════════════════════════════════════════════════════════════════════
// SHARED HELPERS
// ════════════════════════════════════════════════════════════════════════════

fn build_client(timeout: Duration) -> Result<Client, ClientError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ClientError::Transport)
}

async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, ClientError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ClientError::Status(status.as_u16()));
    }
    resp.json::<T>()
        .await
        .map_err(|e| ClientError::Malformed(e.to_string()))
}

// ════════════════════════════════════════════════════════════════════════════
// INFERENCE CLIENT
// ════════════════════════════════════════════════════════════════════════════

/// HTTP client for the inference service.
#[derive(Clone)]
pub struct HttpInferenceClient {
    base: String,
    client: Client,
}

impl HttpInferenceClient {
    /// Creates a client against the given base address with a bounded
    /// per-request timeout.
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        Ok(HttpInferenceClient {
            base: base.into(),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl InferenceApi for HttpInferenceClient {
    async fn submit_query(&self, request: &QueryRequest) -> Result<TaskResponse, ClientError> {
        let url = format!("{}/query", self.base);
        let resp = self.client.post(&url).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        resp.json::<TaskResponse>()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<TaskResponse>, ClientError> {
        let url = format!("{}/history/{}", self.base, session_id);
        let body: serde_json::Value = get_json(&self.client, &url).await?;
        // Absent or mistyped `history` reads as empty per the service
        // contract; a body that is not JSON at all already failed above.
        let history = serde_json::from_value::<HistoryResponse>(body)
            .map(|h| h.history)
            .unwrap_or_default();
        Ok(history)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// METRICS CLIENT
// ════════════════════════════════════════════════════════════════════════════

/// HTTP client for the metrics service.
#[derive(Clone)]
pub struct HttpMetricsClient {
    base: String,
    client: Client,
}

impl HttpMetricsClient {
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        Ok(HttpMetricsClient {
            base: base.into(),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl MetricsApi for HttpMetricsClient {
    async fn fetch_status(&self) -> Result<StatusResponse, ClientError> {
        get_json(&self.client, &format!("{}/status", self.base)).await
    }

    async fn fetch_task_analytics(&self) -> Result<TaskAnalyticsResponse, ClientError> {
        get_json(&self.client, &format!("{}/analytics/tasks", self.base)).await
    }

    async fn fetch_model_usage(&self) -> Result<ModelUsageResponse, ClientError> {
        get_json(&self.client, &format!("{}/analytics/models", self.base)).await
    }

    async fn fetch_node_health(&self) -> Result<NodeHealthResponse, ClientError> {
        get_json(&self.client, &format!("{}/analytics/nodes", self.base)).await
    }

    async fn fetch_recent_activity(&self) -> Result<RecentActivityResponse, ClientError> {
        get_json(&self.client, &format!("{}/analytics/recent", self.base)).await
    }
}
