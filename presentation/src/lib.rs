//! Presentation layer for rethink
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;
pub mod signal;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, OutputFormat};
pub use config::{OutputConfig, ProgressMode, ReplConfig};
pub use output::{console::ConsoleFormatter, formatter::OutputFormatter};
pub use progress::reporter::{RoundProgress, StreamPrinter, progress_for};
pub use signal::InterruptGuard;
