//! Port for structured transcript logging.
//!
//! Defines the [`ConversationLogger`] trait for recording what a run did
//! (rounds started and completed, the final answer, failures) to a
//! machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the run transcript.

use rethink_domain::{RoundResult, UserMessage};
use serde_json::{Value, json};

/// A structured transcript event.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "round_started", "run_finished").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn run_started(message: &UserMessage, supervisor: &str, budget: usize) -> Self {
        Self::new(
            "run_started",
            json!({
                "message": message.content(),
                "supervisor": supervisor,
                "budget": budget,
            }),
        )
    }

    pub fn round_started(round: usize, input_entries: usize) -> Self {
        Self::new(
            "round_started",
            json!({ "round": round, "input_entries": input_entries }),
        )
    }

    pub fn round_completed(result: &RoundResult) -> Self {
        Self::new(
            "round_completed",
            json!({
                "round": result.round,
                "text": result.text,
                "completed": result.completed,
                "structured_history": result.history.as_ref().map(|h| h.len()),
            }),
        )
    }

    pub fn run_finished(final_answer: &str, rounds: usize, cancelled: bool) -> Self {
        Self::new(
            "run_finished",
            json!({
                "final_answer": final_answer,
                "rounds": rounds,
                "cancelled": cancelled,
            }),
        )
    }

    pub fn run_failed(round: usize, error: &str) -> Self {
        Self::new("run_failed", json!({ "round": round, "error": error }))
    }
}

/// Port for logging transcript events.
///
/// `log` is synchronous and infallible so that logging never disrupts a
/// run; implementations swallow their own I/O failures.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
