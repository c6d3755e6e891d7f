//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for rethink results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Only the final answer
    Answer,
    /// Every round followed by the final answer
    Full,
    /// JSON dump of the run
    Json,
}

impl From<OutputFormat> for rethink_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Answer => rethink_domain::OutputFormat::Answer,
            OutputFormat::Full => rethink_domain::OutputFormat::Full,
            OutputFormat::Json => rethink_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for rethink
#[derive(Parser, Debug)]
#[command(name = "rethink")]
#[command(author, version, about = "Iteratively rethink a message with a small team of LLM agents")]
#[command(long_about = r#"
Rethink runs an Orchestrator agent for a fixed number of rounds. Each round the
Orchestrator may call two delegate agents as tools:

  rethink    iterative rethinking subagent
  finalize   after the rethink iterations produces a final answer

The text of the last round is the final answer.

Configuration files are loaded from (in priority order):
1. RETHINK_* environment variables (e.g. RETHINK_BEHAVIOR__ITERATIONS=3)
2. --config <path>     Explicit config file
3. ./rethink.toml      Project-level config
4. ~/.config/rethink/config.toml   Global config

Example:
  rethink "Is remote work good?"
  rethink -n 3 -m gpt-4.1 --output full "Should I learn Rust?"
  rethink                 # interactive mode
"#)]
pub struct Cli {
    /// The message to rethink (omit for interactive mode)
    pub message: Option<String>,

    /// Model for every agent (overridden per role by the flags below)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Model for the Rethinking Subagent
    #[arg(long, value_name = "MODEL")]
    pub rethink_model: Option<String>,

    /// Model for the Final Answer Agent
    #[arg(long, value_name = "MODEL")]
    pub finalize_model: Option<String>,

    /// Number of refinement rounds
    #[arg(short = 'n', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub iterations: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Show a round progress bar instead of streaming text
    #[arg(long)]
    pub no_stream: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and the merged configuration, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Append a JSONL transcript of each run to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Also write diagnostic logs to a daily-rotated file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_single_run_flags() {
        let cli = Cli::try_parse_from([
            "rethink",
            "-n",
            "3",
            "-m",
            "gpt-4.1",
            "--output",
            "full",
            "-vv",
            "Is remote work good?",
        ])
        .unwrap();

        assert_eq!(cli.message.as_deref(), Some("Is remote work good?"));
        assert_eq!(cli.iterations, Some(3));
        assert_eq!(cli.model.as_deref(), Some("gpt-4.1"));
        assert_eq!(cli.output, Some(OutputFormat::Full));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(Cli::try_parse_from(["rethink", "-n", "0", "hi"]).is_err());
    }

    #[test]
    fn test_no_message_means_interactive() {
        let cli = Cli::try_parse_from(["rethink"]).unwrap();
        assert!(cli.message.is_none());
        assert!(cli.output.is_none());
    }
}
