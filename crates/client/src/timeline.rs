//! # Result Timeline
//!
//! Ordered, newest-first sequence of task responses with their trust
//! verdicts.
//!
//! ## Ordering Invariant
//!
//! Every [`Timeline`] this module produces is ordered by descending
//! submission order: index 0 is the newest entry. The two constructors
//! establish it from opposite directions:
//!
//! - [`Timeline::with_submission`] prepends a live submission in O(1)
//!   amortized time;
//! - [`Timeline::from_history`] reverses a chronological (ascending)
//!   server history.
//!
//! A history fetch replaces the current timeline wholesale — it is the
//! authoritative server-side record at that point. A submission always
//! prepends to whatever is currently displayed. The two are never merged
//! entry-by-entry.
//!
//! ## No Deduplication
//!
//! Repeated `task_id`s are tolerated, not collapsed. The service is the
//! sole authority on task identity; a live prepend followed by a history
//! refresh may legitimately carry the same task until the refresh
//! replaces the timeline. No entry is ever silently dropped.
//!
//! ## Update Discipline
//!
//! The timeline is never mutated in place: updates consume the old
//! value and return a new sequence.

use std::collections::VecDeque;

use serde::Serialize;

use parallax_common::TaskResponse;

use crate::dacert::VerificationVerdict;

// ════════════════════════════════════════════════════════════════════════════
// TIMELINE ENTRY
// ════════════════════════════════════════════════════════════════════════════

/// One displayed result: the response plus its stamped trust verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub response: TaskResponse,
    pub verdict: VerificationVerdict,
}

// ════════════════════════════════════════════════════════════════════════════
// TIMELINE
// ════════════════════════════════════════════════════════════════════════════

/// Newest-first sequence of timeline entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
    entries: VecDeque<TimelineEntry>,
}

impl Timeline {
    /// An empty timeline.
    pub fn new() -> Self {
        Timeline {
            entries: VecDeque::new(),
        }
    }

    /// Consumes the timeline and returns a new one with `newest`
    /// prepended. O(1) amortized.
    #[must_use]
    pub fn with_submission(mut self, newest: TimelineEntry) -> Timeline {
        self.entries.push_front(newest);
        self
    }

    /// Builds a timeline from a server history fetched in chronological
    /// (ascending) order. Order-reversing: the last fetched entry
    /// becomes index 0.
    pub fn from_history(fetched: Vec<TimelineEntry>) -> Timeline {
        Timeline {
            entries: fetched.into_iter().rev().collect(),
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter()
    }

    /// The most recent entry, if any.
    pub fn newest(&self) -> Option<&TimelineEntry> {
        self.entries.front()
    }

    /// Cloned snapshot of the entries, newest-first.
    pub fn entries(&self) -> Vec<TimelineEntry> {
        self.entries.iter().cloned().collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    use parallax_common::InferenceResult;

    fn entry(task_id: &str, timestamp: u64) -> TimelineEntry {
        TimelineEntry {
            response: TaskResponse {
                task_id: task_id.to_string(),
                session_id: "sess-test".to_string(),
                result: InferenceResult {
                    input: "q".to_string(),
                    output: "POSITIVE".to_string(),
                    confidence: 0.8,
                    model_id: "parallax-llm-v1".to_string(),
                    timestamp,
                },
                dacert: None,
            },
            verdict: VerificationVerdict::Absent,
        }
    }

    fn task_ids(t: &Timeline) -> Vec<String> {
        t.iter().map(|e| e.response.task_id.clone()).collect()
    }

    #[test]
    fn test_new_is_empty() {
        let t = Timeline::new();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
        assert!(t.newest().is_none());
    }

    #[test]
    fn test_submissions_are_newest_first() {
        let mut t = Timeline::new();
        for i in 1..=5 {
            t = t.with_submission(entry(&format!("task-{}", i), i));
        }
        assert_eq!(t.len(), 5);
        assert_eq!(
            task_ids(&t),
            vec!["task-5", "task-4", "task-3", "task-2", "task-1"]
        );
        assert_eq!(t.newest().map(|e| e.response.task_id.as_str()), Some("task-5"));
    }

    #[test]
    fn test_from_history_reverses_chronological_input() {
        let fetched = vec![entry("r1", 1), entry("r2", 2), entry("r3", 3)];
        let t = Timeline::from_history(fetched);
        assert_eq!(task_ids(&t), vec!["r3", "r2", "r1"]);
    }

    #[test]
    fn test_from_history_empty() {
        let t = Timeline::from_history(Vec::new());
        assert!(t.is_empty());
    }

    #[test]
    fn test_submission_after_history_prepends() {
        let t = Timeline::from_history(vec![entry("r1", 1), entry("r2", 2)]);
        let t = t.with_submission(entry("live", 3));
        assert_eq!(task_ids(&t), vec!["live", "r2", "r1"]);
    }

    #[test]
    fn test_duplicate_task_ids_are_tolerated() {
        let t = Timeline::new()
            .with_submission(entry("dup", 1))
            .with_submission(entry("dup", 2));
        assert_eq!(t.len(), 2);
        assert_eq!(task_ids(&t), vec!["dup", "dup"]);
    }

    #[test]
    fn test_entries_snapshot_matches_iteration_order() {
        let t = Timeline::new()
            .with_submission(entry("a", 1))
            .with_submission(entry("b", 2));
        let snapshot = t.entries();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].response.task_id, "b");
        assert_eq!(snapshot[1].response.task_id, "a");
    }
}
