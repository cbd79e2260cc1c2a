//! Typed client configuration, loadable from TOML with environment
//! overrides.
//!
//! The two service base addresses are deliberately explicit fields
//! passed to each component at construction; there is no ambient global
//! address anywhere in the workspace.
//!
//! Precedence (lowest to highest): defaults → TOML file → `PARALLAX_*`
//! environment variables.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default inference service base address.
pub const DEFAULT_INFERENCE_ADDR: &str = "http://localhost:8080";
/// Default metrics service base address.
pub const DEFAULT_METRICS_ADDR: &str = "http://localhost:5050";
/// Default model identifier sent with each query.
pub const DEFAULT_MODEL_ID: &str = "parallax-llm-v1";
/// Default metrics poll cadence in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;
/// Default per-request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
/// Default directory for the durable session file.
pub const DEFAULT_SESSION_DIR: &str = "./data";

/// Configuration error: file I/O or TOML parse failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Client configuration.
///
/// Every field has a default so a bare `ClientConfig::default()` talks
/// to a local development deployment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base address of the inference service (`/query`, `/history`).
    pub inference_addr: String,
    /// Base address of the metrics service (`/status`, `/analytics/*`).
    pub metrics_addr: String,
    /// Model identifier sent with each query.
    pub model_id: String,
    /// Whether to request an attestation certificate with each query.
    pub return_dacert: bool,
    /// Metrics poll cadence in milliseconds.
    pub poll_interval_ms: u64,
    /// Bounded wait for each network call, in milliseconds.
    pub request_timeout_ms: u64,
    /// Directory holding the durable session id file.
    pub session_dir: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            inference_addr: DEFAULT_INFERENCE_ADDR.to_string(),
            metrics_addr: DEFAULT_METRICS_ADDR.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            return_dacert: true,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            session_dir: DEFAULT_SESSION_DIR.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file path.
    ///
    /// Missing keys fall back to defaults; a missing file or a parse
    /// failure is an error.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path.as_ref())?;
        let cfg: ClientConfig = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Apply `PARALLAX_*` environment variable overrides.
    pub fn apply_env(&mut self) {
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with("PARALLAX_"))
            .collect();
        self.apply_pairs(&vars);
    }

    /// Apply overrides from key/value pairs. Unknown keys are ignored;
    /// unparseable numeric values leave the existing value in place.
    fn apply_pairs(&mut self, vars: &HashMap<String, String>) {
        if let Some(v) = vars.get("PARALLAX_INFERENCE_ADDR") {
            self.inference_addr = v.clone();
        }
        if let Some(v) = vars.get("PARALLAX_METRICS_ADDR") {
            self.metrics_addr = v.clone();
        }
        if let Some(v) = vars.get("PARALLAX_MODEL_ID") {
            self.model_id = v.clone();
        }
        if let Some(v) = vars.get("PARALLAX_RETURN_DACERT") {
            if let Ok(b) = v.parse::<bool>() {
                self.return_dacert = b;
            }
        }
        if let Some(v) = vars.get("PARALLAX_POLL_INTERVAL_MS") {
            if let Ok(n) = v.parse::<u64>() {
                self.poll_interval_ms = n;
            }
        }
        if let Some(v) = vars.get("PARALLAX_REQUEST_TIMEOUT_MS") {
            if let Ok(n) = v.parse::<u64>() {
                self.request_timeout_ms = n;
            }
        }
        if let Some(v) = vars.get("PARALLAX_SESSION_DIR") {
            self.session_dir = v.clone();
        }
    }
}
