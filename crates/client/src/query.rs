//! # Query Client
//!
//! Orchestrates query submission: precondition checks, at-most-one
//! in-flight serialization, trust-verdict stamping, and timeline
//! reconciliation.
//!
//! ## Submission Rules
//!
//! - A trimmed-empty query is rejected without a network call.
//! - Exactly one submission may be outstanding; a second attempt while
//!   one is in flight is ignored (not queued) and makes no network call.
//! - On success: the optional certificate is validated, the verdict is
//!   stamped, the entry is prepended, and the input buffer is cleared.
//! - On failure: the timeline is untouched and the input buffer is
//!   retained so the same text can be retried; the error is recorded
//!   and returned to the caller.
//!
//! ## Session Activation
//!
//! [`QueryClient::load_history`] is called once when the session id
//! becomes known, before any submission is reachable. It replaces the
//! timeline wholesale with the server's authoritative record — it never
//! merges with live entries.
//!
//! The in-flight guard is an `AtomicBool` taken with `compare_exchange`
//! and released on every exit path; the guard is the only
//! serialization this path needs since no two submissions can then race
//! to prepend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use parallax_common::QueryRequest;

use crate::api::InferenceApi;
use crate::dacert::validate;
use crate::error::ClientError;
use crate::session::Session;
use crate::timeline::{Timeline, TimelineEntry};

// ════════════════════════════════════════════════════════════════════════════
// OUTCOME
// ════════════════════════════════════════════════════════════════════════════

/// Result of a submission attempt that did not hit a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The response was received, stamped, and prepended.
    Accepted,
    /// The trimmed query was empty; no network call was made.
    RejectedEmpty,
    /// A submission was already in flight; no network call was made.
    RejectedBusy,
}

// ════════════════════════════════════════════════════════════════════════════
// CLIENT
// ════════════════════════════════════════════════════════════════════════════

struct ClientState {
    timeline: Timeline,
    /// Last submitted text, kept on failure for retry; cleared on success.
    input: String,
    last_error: Option<String>,
}

/// Submission orchestrator. All methods take `&self`; the type is
/// `Send + Sync` and safe to share behind an `Arc`.
pub struct QueryClient {
    api: Arc<dyn InferenceApi>,
    session: Session,
    model_id: String,
    return_dacert: bool,
    in_flight: AtomicBool,
    state: Mutex<ClientState>,
}

impl QueryClient {
    pub fn new(
        api: Arc<dyn InferenceApi>,
        session: Session,
        model_id: impl Into<String>,
        return_dacert: bool,
    ) -> Self {
        QueryClient {
            api,
            session,
            model_id: model_id.into(),
            return_dacert,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(ClientState {
                timeline: Timeline::new(),
                input: String::new(),
                last_error: None,
            }),
        }
    }

    /// The session this client submits under.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Busy indicator: `true` while a submission is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// The buffered input text (empty after a successful submission).
    pub fn input(&self) -> String {
        self.state.lock().input.clone()
    }

    /// The most recent submission failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    /// Cloned snapshot of the timeline, newest-first.
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        self.state.lock().timeline.entries()
    }

    /// Fetches the session's server-side history and replaces the
    /// timeline wholesale. Returns the number of entries loaded.
    ///
    /// Called once per session activation; each entry's certificate is
    /// validated so history carries trust verdicts like live results.
    pub async fn load_history(&self) -> Result<usize, ClientError> {
        let fetched = self.api.fetch_history(&self.session.id).await?;
        let entries: Vec<TimelineEntry> = fetched
            .into_iter()
            .map(|response| {
                let verdict = validate(response.dacert.as_ref());
                TimelineEntry { response, verdict }
            })
            .collect();
        let timeline = Timeline::from_history(entries);
        let count = timeline.len();
        self.state.lock().timeline = timeline;
        info!("loaded {} prior responses for session {}", count, self.session.id);
        Ok(count)
    }

    /// Submits a query.
    ///
    /// Preconditions (checked in order, no network call on rejection):
    /// trimmed non-empty, no submission in flight. See the module docs
    /// for the success/failure state effects.
    pub async fn submit(&self, raw: &str) -> Result<SubmitOutcome, ClientError> {
        let query = raw.trim();
        if query.is_empty() {
            return Ok(SubmitOutcome::RejectedEmpty);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("submission already in flight, ignoring query");
            return Ok(SubmitOutcome::RejectedBusy);
        }

        self.state.lock().input = query.to_string();

        let request = QueryRequest {
            query: query.to_string(),
            session_id: self.session.id.clone(),
            model_id: self.model_id.clone(),
            return_dacert: self.return_dacert,
        };

        let result = match self.api.submit_query(&request).await {
            Ok(response) => {
                let verdict = validate(response.dacert.as_ref());
                let mut state = self.state.lock();
                let timeline = std::mem::take(&mut state.timeline);
                state.timeline = timeline.with_submission(TimelineEntry { response, verdict });
                state.input.clear();
                state.last_error = None;
                Ok(SubmitOutcome::Accepted)
            }
            Err(e) => {
                warn!("query submission failed: {}", e);
                self.state.lock().last_error = Some(e.to_string());
                Err(e)
            }
        };

        self.in_flight.store(false, Ordering::SeqCst);
        result
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════
