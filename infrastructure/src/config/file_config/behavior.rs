//! Round loop configuration from TOML (`[behavior]` section)

use super::ConfigValidationError;
use rethink_application::ExecutionParams;
use rethink_domain::{IterationBudget, ThreadingFallback};
use serde::{Deserialize, Serialize};

/// Raw behavior configuration from TOML
///
/// ```toml
/// [behavior]
/// iterations = 5
/// threading = "append_text"   # or "reuse_prior"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Number of refinement rounds
    pub iterations: usize,
    /// Fallback when the provider returns no structured history
    pub threading: ThreadingFallback,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        Self {
            iterations: IterationBudget::DEFAULT,
            threading: ThreadingFallback::default(),
        }
    }
}

impl FileBehaviorConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.iterations == 0 {
            return Err(ConfigValidationError::InvalidIterations);
        }
        Ok(())
    }

    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_iterations(self.iterations)
            .with_threading(self.threading)
    }
}
