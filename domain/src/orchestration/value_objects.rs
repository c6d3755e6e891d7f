//! Orchestration value objects - immutable result types for rethink runs.
//!
//! - [`IterationBudget`] - how many rounds a run performs
//! - [`RoundResult`] - what one round produced
//! - [`RethinkResult`] - the complete outcome of a run

use crate::conversation::input_list::InputList;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Number of refinement rounds in a run (always ≥ 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct IterationBudget(usize);

impl IterationBudget {
    pub const DEFAULT: usize = 5;

    pub fn new(rounds: usize) -> Result<Self, DomainError> {
        if rounds == 0 {
            return Err(DomainError::InvalidIterationBudget);
        }
        Ok(Self(rounds))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for IterationBudget {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<usize> for IterationBudget {
    type Error = DomainError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IterationBudget> for usize {
    fn from(budget: IterationBudget) -> Self {
        budget.0
    }
}

impl std::fmt::Display for IterationBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output of one round of the supervising unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// 1-based round index
    pub round: usize,
    /// Text accumulated from the round's deltas (with the trailing newline
    /// added when the completion marker was seen)
    pub text: String,
    /// Whether the stream produced an explicit completion marker
    pub completed: bool,
    /// Structured history supplied by the provider, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<InputList>,
}

impl RoundResult {
    pub fn new(round: usize, text: impl Into<String>, completed: bool) -> Self {
        Self {
            round,
            text: text.into(),
            completed,
            history: None,
        }
    }

    pub fn with_history(mut self, history: Option<InputList>) -> Self {
        self.history = history;
        self
    }
}

/// Complete outcome of a rethink run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RethinkResult {
    /// The original user message
    pub message: String,
    /// Configured number of rounds
    pub budget: usize,
    /// Every round that ran, in order (the last one may be partial if cancelled)
    pub rounds: Vec<RoundResult>,
    /// Text of the last round
    pub final_answer: String,
    /// Whether the run was cut short by cancellation
    pub cancelled: bool,
}

impl RethinkResult {
    pub fn rounds_completed(&self) -> usize {
        self.rounds.len()
    }
}
