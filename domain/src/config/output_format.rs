//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished run is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Only the final answer (default)
    #[default]
    Answer,
    /// Every round followed by the final answer
    Full,
    /// JSON dump of the run result
    Json,
}
