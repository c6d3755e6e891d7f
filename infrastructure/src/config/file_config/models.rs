//! Role-based model configuration from TOML (`[models]` section)

use super::ConfigValidationError;
use rethink_domain::{Model, TeamModels};
use serde::{Deserialize, Serialize};

/// Role-based model configuration from TOML
///
/// # Example
///
/// ```toml
/// [models]
/// supervisor = "gpt-4o"        # Orchestrator driving the rounds
/// rethink = "gpt-4o-mini"      # Rethinking Subagent
/// finalize = "gpt-4o"          # Final Answer Agent
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    pub supervisor: String,
    pub rethink: String,
    pub finalize: String,
}

impl Default for FileModelsConfig {
    fn default() -> Self {
        let model = Model::default().to_string();
        Self {
            supervisor: model.clone(),
            rethink: model.clone(),
            finalize: model,
        }
    }
}

impl FileModelsConfig {
    /// Set every role to the same model.
    pub fn set_all(&mut self, model: &str) {
        self.supervisor = model.to_string();
        self.rethink = model.to_string();
        self.finalize = model.to_string();
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("supervisor", &self.supervisor),
            ("rethink", &self.rethink),
            ("finalize", &self.finalize),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyModelName(format!("models.{}", field)));
            }
        }
        Ok(())
    }

    pub fn to_team_models(&self) -> TeamModels {
        TeamModels::default()
            .with_supervisor(Model::from(self.supervisor.as_str()))
            .with_rethink(Model::from(self.rethink.as_str()))
            .with_finalize(Model::from(self.finalize.as_str()))
    }
}
