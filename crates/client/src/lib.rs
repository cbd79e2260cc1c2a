//! # Parallax Client
//!
//! Client-side state-reconciliation and trust-verification layer for
//! the Parallax inference network.
//!
//! ## Components
//!
//! - [`session::SessionStore`] — durable per-profile session identity
//! - [`timeline::Timeline`] — ordered, newest-first response timeline
//! - [`dacert::validate`] — structural validation of attestation certificates
//! - [`poller::MetricsPoller`] — fixed-cadence fleet metrics polling with
//!   per-slice failure isolation
//! - [`query::QueryClient`] — submission orchestration with at-most-one
//!   in-flight serialization
//!
//! ## Control Flow
//!
//! ```text
//! SessionStore ──▶ QueryClient ──POST /query──▶ inference service
//!                      │
//!                      ├─ dacert::validate (trust verdict)
//!                      └─ Timeline::with_submission (prepend)
//!
//! MetricsPoller ──tick──▶ metrics service (5 isolated fetches)
//!                      └─ merge_tick (retain previous on failure)
//! ```
//!
//! The metrics path and the query path share no mutable state; each can
//! fail without affecting the other. No error on either path terminates
//! the process.

pub mod api;
pub mod dacert;
pub mod error;
pub mod poller;
pub mod query;
pub mod session;
pub mod timeline;

pub use api::{HttpInferenceClient, HttpMetricsClient, InferenceApi, MetricsApi};
pub use dacert::{validate, MalformedReason, VerificationVerdict};
pub use error::ClientError;
pub use poller::{merge_tick, MetricsPoller, MetricsView, PollerHandle, TickOutcome};
pub use query::{QueryClient, SubmitOutcome};
pub use session::{Session, SessionStore};
pub use timeline::{Timeline, TimelineEntry};
