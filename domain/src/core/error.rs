//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Everything here is raised while *building* a run (capability units,
/// budgets, the user message). Failures of the model provider live in the
/// application layer's gateway error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Duplicate tool name '{tool}' on capability unit '{unit}'")]
    DuplicateToolName { unit: String, tool: String },

    #[error("Malformed instructions for '{0}': instructions cannot be empty")]
    MalformedInstructions(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Iteration budget must be at least 1")]
    InvalidIterationBudget,
}

impl DomainError {
    /// Check if this error is a construction-time configuration problem
    /// (as opposed to a user-correctable input problem).
    pub fn is_configuration(&self) -> bool {
        !matches!(self, DomainError::EmptyMessage)
    }
}
