//! Application layer for rethink
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway, StreamHandle, StreamItem},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::consume_stream::{ConsumeOutcome, EventStreamConsumer};
pub use use_cases::run_rethink::{RunRethinkError, RunRethinkInput, RunRethinkUseCase};
