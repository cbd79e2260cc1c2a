//! # Parallax Common Crate
//!
//! Wire types and configuration shared across the Parallax client.
//!
//! ## Modules
//! - `types`: request/response types for the inference and metrics services
//! - `config`: typed client configuration (TOML file + environment overrides)
//!
//! The inference service and the metrics service are separate deployments
//! with separate base addresses. Both addresses are explicit configuration
//! values carried in [`ClientConfig`]; nothing in this workspace reads a
//! service address from ambient global state.

pub mod config;
pub mod types;

pub use config::{ClientConfig, ConfigError};
pub use types::{
    DACert, HistoryResponse, InferenceResult, MetricsSnapshot, ModelUsageResponse,
    NodeHealthInfo, NodeHealthMap, NodeHealthResponse, QueryRequest, RecentActivityResponse,
    RecentTask, SessionId, StatusResponse, TaskAnalyticsResponse, TaskResponse,
};
