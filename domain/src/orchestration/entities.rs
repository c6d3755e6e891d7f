//! Orchestration domain entities

use super::value_objects::{IterationBudget, RoundResult};
use crate::core::message::UserMessage;
use serde::{Deserialize, Serialize};

/// State of a rethink run
///
/// ```text
/// Idle → RoundStarting → RoundStreaming → RoundComplete ─┬→ RoundStarting
///                                                        └→ Finished
/// ```
/// Cancellation jumps from any state straight to `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    RoundStarting,
    RoundStreaming,
    RoundComplete,
    Finished,
}

impl RunState {
    pub fn as_str(&self) -> &str {
        match self {
            RunState::Idle => "idle",
            RunState::RoundStarting => "round_starting",
            RunState::RoundStreaming => "round_streaming",
            RunState::RoundComplete => "round_complete",
            RunState::Finished => "finished",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Finished)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single rethink run (Entity)
///
/// Tracks the state machine, the iteration counter and the rounds recorded so
/// far. Transition methods panic on an illegal transition: they are driven
/// by one loop in the application layer and a wrong order is a bug there.
#[derive(Debug, Clone)]
pub struct RethinkRun {
    message: UserMessage,
    budget: IterationBudget,
    state: RunState,
    counter: usize,
    rounds: Vec<RoundResult>,
    cancelled: bool,
}

impl RethinkRun {
    pub fn new(message: UserMessage, budget: IterationBudget) -> Self {
        Self {
            message,
            budget,
            state: RunState::Idle,
            counter: 1,
            rounds: Vec::new(),
            cancelled: false,
        }
    }

    pub fn message(&self) -> &UserMessage {
        &self.message
    }

    pub fn budget(&self) -> IterationBudget {
        self.budget
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Current 1-based round index.
    pub fn round(&self) -> usize {
        self.counter
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Text of the last recorded round (empty before round 1 finishes).
    pub fn final_answer(&self) -> &str {
        self.rounds.last().map(|r| r.text.as_str()).unwrap_or("")
    }

    /// `Idle | RoundComplete → RoundStarting`
    pub fn start_round(&mut self) {
        assert!(
            matches!(self.state, RunState::Idle | RunState::RoundComplete),
            "cannot start a round from {}",
            self.state
        );
        assert!(self.counter <= self.budget.get(), "iteration budget exhausted");
        self.state = RunState::RoundStarting;
    }

    /// `RoundStarting → RoundStreaming`
    pub fn begin_streaming(&mut self) {
        assert_eq!(self.state, RunState::RoundStarting);
        self.state = RunState::RoundStreaming;
    }

    /// `RoundStreaming → RoundComplete`, recording the round and advancing the counter.
    pub fn complete_round(&mut self, result: RoundResult) {
        assert_eq!(self.state, RunState::RoundStreaming);
        self.rounds.push(result);
        self.counter += 1;
        self.state = RunState::RoundComplete;
    }

    /// Whether another round fits in the budget.
    pub fn has_next_round(&self) -> bool {
        self.counter <= self.budget.get()
    }

    /// `RoundComplete → Finished` once the budget is spent.
    pub fn finish(&mut self) {
        assert_eq!(self.state, RunState::RoundComplete);
        assert!(!self.has_next_round(), "rounds remain in the budget");
        self.state = RunState::Finished;
    }

    /// Any state → `Finished`, recording the in-flight round's partial text.
    pub fn cancel(&mut self, partial: Option<RoundResult>) {
        if let Some(result) = partial {
            self.rounds.push(result);
        }
        self.cancelled = true;
        self.state = RunState::Finished;
    }
}
