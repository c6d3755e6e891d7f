//! Execution parameters — orchestration loop control.
//!
//! [`ExecutionParams`] groups the static parameters that control the round
//! loop in [`RunRethinkUseCase`](crate::use_cases::run_rethink::RunRethinkUseCase).

use rethink_domain::{IterationBudget, ThreadingFallback};
use serde::{Deserialize, Serialize};

/// Round loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Number of refinement rounds (validated when the run starts).
    pub iterations: usize,
    /// What to thread between rounds when the provider has no structured history.
    pub threading: ThreadingFallback,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            iterations: IterationBudget::DEFAULT,
            threading: ThreadingFallback::default(),
        }
    }
}

impl ExecutionParams {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_threading(mut self, threading: ThreadingFallback) -> Self {
        self.threading = threading;
        self
    }
}
