//! Provider configuration from TOML (`[provider]` section)

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible endpoint configuration.
///
/// The API key itself is never stored in the file; only the name of the
/// environment variable holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Base URL of the Chat Completions API
    pub api_base: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Connect timeout and maximum stream silence, in seconds
    pub timeout_seconds: u64,
    /// Tool-call turns allowed per invocation
    pub max_tool_turns: usize,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: 120,
            max_tool_turns: 8,
        }
    }
}

impl FileProviderConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.api_base.trim().is_empty() {
            return Err(ConfigValidationError::EmptyApiBase);
        }
        Ok(())
    }
}
