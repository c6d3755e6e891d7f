//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod behavior;
mod models;
mod output;
mod provider;
mod repl;

pub use behavior::FileBehaviorConfig;
pub use models::FileModelsConfig;
pub use output::FileOutputConfig;
pub use provider::FileProviderConfig;
pub use repl::FileReplConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("behavior.iterations must be at least 1")]
    InvalidIterations,

    #[error("provider.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("provider.api_base cannot be empty")]
    EmptyApiBase,

    #[error("{0}: model name cannot be empty")]
    EmptyModelName(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Role-based model selection
    pub models: FileModelsConfig,
    /// Round loop settings
    pub behavior: FileBehaviorConfig,
    /// Chat Completions endpoint
    pub provider: FileProviderConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Check semantic constraints that deserialization cannot express.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.models.validate()?;
        self.behavior.validate()?;
        self.provider.validate()
    }
}
