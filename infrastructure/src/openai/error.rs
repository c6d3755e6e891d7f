//! Error types for the OpenAI-compatible adapter

use rethink_application::ports::llm_gateway::GatewayError;
use thiserror::Error;

/// Result type alias for OpenAI adapter operations
pub type Result<T> = std::result::Result<T, OpenAiError>;

/// Errors that can occur when talking to a Chat Completions endpoint
#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse stream frame: {error}\nRaw frame: {raw}")]
    MalformedFrame { error: String, raw: String },

    #[error("API key not found in environment variable {0}")]
    MissingApiKey(String),

    #[error("Model requested unknown tool: {0}")]
    UnknownTool(String),

    #[error("No final answer after {0} tool turns")]
    ToolTurnsExceeded(usize),

    #[error("No data received for {0} seconds")]
    Idle(u64),

    #[error("Delegate '{tool}' failed: {source}")]
    Delegate { tool: String, source: GatewayError },
}

impl From<OpenAiError> for GatewayError {
    fn from(error: OpenAiError) -> Self {
        match error {
            OpenAiError::Http(e) if e.is_timeout() => GatewayError::Timeout,
            OpenAiError::Http(e) => GatewayError::ConnectionError(e.to_string()),
            OpenAiError::Status { status: 401 | 403, body } => GatewayError::Unauthorized(body),
            OpenAiError::Status { status: 404, body } => GatewayError::ModelNotAvailable(body),
            e @ OpenAiError::Status { .. } => GatewayError::RequestFailed(e.to_string()),
            e @ (OpenAiError::MalformedFrame { .. } | OpenAiError::SerializationError(_)) => {
                GatewayError::MalformedStream(e.to_string())
            }
            OpenAiError::UnknownTool(name) => GatewayError::UnknownTool(name),
            OpenAiError::Idle(_) => GatewayError::Timeout,
            OpenAiError::Delegate { source, .. } => source,
            e => GatewayError::Other(e.to_string()),
        }
    }
}
