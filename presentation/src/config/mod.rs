//! Presentation-level configuration
//!
//! Configuration for output formatting, progress display and REPL behavior.

use rethink_domain::OutputFormat;
use std::path::PathBuf;

/// Output configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Turn off `colored` output process-wide when color is disabled.
    pub fn apply_color_preference(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}

/// How progress is shown on stderr while a run is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    /// Stream each round's text as it arrives
    #[default]
    Stream,
    /// A round progress bar
    Bar,
    /// Nothing
    Quiet,
}

impl ProgressMode {
    pub fn from_flags(quiet: bool, no_stream: bool) -> Self {
        match (quiet, no_stream) {
            (true, _) => ProgressMode::Quiet,
            (false, true) => ProgressMode::Bar,
            (false, false) => ProgressMode::Stream,
        }
    }
}

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, Default)]
pub struct ReplConfig {
    pub progress: ProgressMode,
    /// Where line history is persisted; `None` keeps it in memory
    pub history_path: Option<PathBuf>,
}
