//! Progress notification port
//!
//! Defines the interface for reporting progress while a rethink run streams.

use rethink_domain::{RoundResult, RunItemEvent};

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer. All methods are called
/// from the orchestration loop itself, in order, and must return quickly:
/// treat them as fire-and-forget notifications.
///
/// Any `Fn(usize, &str)` closure is a notifier that only listens to deltas.
pub trait ProgressNotifier: Send + Sync {
    /// Called with the round's accumulated text after every text delta, and
    /// once more with a trailing newline when the round completes.
    ///
    /// `round` is 1-based and constant for the whole round; `text` never shrinks
    /// within a round.
    fn on_delta(&self, round: usize, text: &str);

    /// Called before the supervising unit is invoked for `round`.
    fn on_round_start(&self, _round: usize, _total: usize) {}

    /// Called for delegate tool bookkeeping observed in the stream.
    fn on_tool_event(&self, _round: usize, _event: &RunItemEvent) {}

    /// Called once a round's result is recorded.
    fn on_round_complete(&self, _round: usize, _result: &RoundResult) {}
}

impl<F> ProgressNotifier for F
where
    F: Fn(usize, &str) + Send + Sync,
{
    fn on_delta(&self, round: usize, text: &str) {
        self(round, text)
    }
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_delta(&self, _round: usize, _text: &str) {}
}
