//! Domain layer for rethink
//!
//! This crate contains the core entities and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Capability units
//!
//! A supervising unit (the "Orchestrator") is given two delegate units as
//! tools: `rethink`, which reworks a message into a more nuanced perspective,
//! and `finalize`, which condenses the iterations into one answer.
//!
//! ## Rounds
//!
//! A run invokes the supervisor a fixed number of times. Each round streams
//! [`StreamEvent`]s; the round's accumulated text and, when available, its
//! structured history ([`InputList`]) seed the next round. The last round's
//! text is the final answer.

pub mod capability;
pub mod config;
pub mod conversation;
pub mod core;
pub mod orchestration;
pub mod prompt;

// Re-export commonly used types
pub use capability::{
    team::{FINALIZE_TOOL, RETHINK_TOOL, RethinkTeam, TeamModels},
    tool::ToolAdapter,
    unit::CapabilityUnit,
};
pub use config::OutputFormat;
pub use conversation::{
    entities::{ConversationEntry, Role},
    input_list::InputList,
    stream::{ResponseEvent, RunItemEvent, StreamEvent},
};
pub use core::{error::DomainError, message::UserMessage, model::Model};
pub use orchestration::{
    entities::{RethinkRun, RunState},
    threading::{RoundStateThreader, ThreadingFallback},
    value_objects::{IterationBudget, RethinkResult, RoundResult},
};
pub use prompt::RethinkPrompts;
