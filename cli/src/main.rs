//! CLI entrypoint for rethink
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rethink_application::{ConversationLogger, RunRethinkError, RunRethinkInput, RunRethinkUseCase};
use rethink_domain::{OutputFormat, RethinkResult, UserMessage};
use rethink_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, OpenAiGateway, ProviderConfig,
};
use rethink_presentation::{
    ChatRepl, Cli, ConsoleFormatter, InterruptGuard, OutputConfig, OutputFormatter, ProgressMode,
    ReplConfig, progress_for,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref());

    info!("Starting rethink");

    if cli.show_config {
        return show_config(&cli);
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {e}"))?
    };
    apply_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;
    check_message(cli.message.as_deref())?;

    // === Dependency Injection ===
    let provider = ProviderConfig::from_env(&config.provider.api_key_env)?
        .with_api_base(config.provider.api_base.as_str())
        .with_timeout(Duration::from_secs(config.provider.timeout_seconds))
        .with_max_tool_turns(config.provider.max_tool_turns);
    let gateway = Arc::new(OpenAiGateway::new(provider)?);

    let logger: Option<Arc<dyn ConversationLogger>> = match &cli.transcript {
        Some(path) => {
            let logger = JsonlConversationLogger::open(path)
                .with_context(|| format!("Cannot open transcript {}", path.display()))?;
            Some(Arc::new(logger))
        }
        None => None,
    };

    let output = OutputConfig {
        format: config.output.format,
        color: config.output.color,
    };
    output.apply_color_preference();

    let models = config.models.to_team_models();
    let params = config.behavior.to_execution_params();

    // Interactive mode
    let Some(message) = cli.message else {
        let quiet = cli.quiet || !config.repl.show_progress;
        let mut repl = ChatRepl::new(gateway, models, params)
            .with_output(output)
            .with_repl_config(ReplConfig {
                progress: ProgressMode::from_flags(quiet, cli.no_stream),
                history_path: config.repl.history_path(),
            });
        if let Some(logger) = logger {
            repl = repl.with_conversation_logger(logger);
        }

        repl.run().await?;
        return Ok(());
    };

    // Single message mode
    let interrupt = InterruptGuard::install();
    let mut use_case = RunRethinkUseCase::new(gateway).with_cancellation(interrupt.token());
    if let Some(logger) = logger {
        use_case = use_case.with_conversation_logger(logger);
    }

    let progress = progress_for(ProgressMode::from_flags(cli.quiet, cli.no_stream), output.color);
    let input = RunRethinkInput::new(message, models).with_params(params);
    let result = use_case.execute_with_progress(input, progress.as_ref()).await?;

    if result.cancelled {
        warn!(
            rounds = result.rounds_completed(),
            "Interrupted; printing the last available answer"
        );
    }

    write_answer(&mut std::io::stdout().lock(), &result, output.format)?;

    Ok(())
}

/// Reject a blank message before any provider setup.
fn check_message(message: Option<&str>) -> Result<(), RunRethinkError> {
    if let Some(message) = message {
        UserMessage::try_new(message)?;
    }
    Ok(())
}

fn write_answer(
    out: &mut impl Write,
    result: &RethinkResult,
    format: OutputFormat,
) -> std::io::Result<()> {
    // Every format already ends with a newline.
    write!(out, "{}", ConsoleFormatter.format(result, format))?;
    out.flush()
}

fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "rethink.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

/// Flags take precedence over every configuration source.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.models.set_all(model);
    }
    if let Some(model) = &cli.rethink_model {
        config.models.rethink = model.clone();
    }
    if let Some(model) = &cli.finalize_model {
        config.models.finalize = model.clone();
    }
    if let Some(iterations) = cli.iterations {
        config.behavior.iterations = iterations as usize;
    }
    if let Some(format) = cli.output {
        config.output.format = format.into();
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let explicit = cli.config.as_deref();

    println!("Configuration sources (highest priority first):");
    if cli.no_config {
        println!("  (files disabled by --no-config)");
    } else {
        for source in ConfigLoader::sources(explicit) {
            let mark = if source.found { "*" } else { " " };
            println!("  {} {:<10} {}", mark, source.label, source.location);
        }
    }
    println!();

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(explicit).map_err(|e| anyhow!("Failed to load configuration: {e}"))?
    };
    apply_overrides(&mut config, cli);

    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
