//! Infrastructure layer for rethink
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod openai;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigSource, ConfigValidationError, FileBehaviorConfig, FileConfig,
    FileModelsConfig, FileOutputConfig, FileProviderConfig, FileReplConfig,
};
pub use logging::JsonlConversationLogger;
pub use openai::{
    error::{OpenAiError, Result},
    gateway::{OpenAiGateway, ProviderConfig},
};
