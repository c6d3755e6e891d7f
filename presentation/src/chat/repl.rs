//! REPL (Read-Eval-Print Loop) for interactive use

use crate::config::{OutputConfig, ReplConfig};
use crate::output::console::ConsoleFormatter;
use crate::output::formatter::OutputFormatter;
use crate::progress::reporter::progress_for;
use crate::signal::InterruptGuard;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use rethink_application::{
    ConversationLogger, ExecutionParams, LlmGateway, NoConversationLogger, RunRethinkInput,
    RunRethinkUseCase,
};
use rethink_domain::TeamModels;
use std::sync::Arc;
use tracing::warn;

const HISTORY_CAPACITY: usize = 1000;

/// Outcome of a slash command
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Help,
    Config,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        match line.split_whitespace().next().unwrap_or(line) {
            "/quit" | "/exit" | "/q" => Command::Quit,
            "/help" | "/h" | "/?" => Command::Help,
            "/config" => Command::Config,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Interactive REPL: every line is rethought as its own run
pub struct ChatRepl<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    models: TeamModels,
    params: ExecutionParams,
    output: OutputConfig,
    repl: ReplConfig,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl<G: LlmGateway + 'static> ChatRepl<G> {
    pub fn new(gateway: Arc<G>, models: TeamModels, params: ExecutionParams) -> Self {
        Self {
            gateway,
            models,
            params,
            output: OutputConfig::default(),
            repl: ReplConfig::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    pub fn with_repl_config(mut self, repl: ReplConfig) -> Self {
        self.repl = repl;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    fn line_editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.repl.history_path else {
            return editor;
        };
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(path = %parent.display(), error = %e, "Cannot create history directory");
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "History unavailable");
                editor
            }
        }
    }

    /// Run the interactive REPL until `/quit` or Ctrl-D
    pub async fn run(&self) -> std::io::Result<()> {
        let mut line_editor = self.line_editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("rethink".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match line_editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
                _ => {
                    println!("^C");
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              Rethink - Chat Mode            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        self.print_config();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /config           - Show models and round settings");
        println!("  /quit, /exit, /q  - Exit");
        println!();
        println!("Press Ctrl-C during a run to stop it and keep the partial answer.");
        println!();
    }

    fn print_config(&self) {
        println!("Supervisor: {}", self.models.supervisor);
        println!("Rethink:    {}", self.models.rethink);
        println!("Finalize:   {}", self.models.finalize);
        println!(
            "Rounds:     {} (threading: {})",
            self.params.iterations,
            self.params.threading.as_str()
        );
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&self, line: &str) -> bool {
        match Command::parse(line) {
            Command::Quit => {
                println!("Bye!");
                true
            }
            Command::Help => {
                println!();
                Self::print_help();
                false
            }
            Command::Config => {
                println!();
                self.print_config();
                false
            }
            Command::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn process_message(&self, message: &str) {
        println!();

        let interrupt = InterruptGuard::install();
        let use_case = RunRethinkUseCase::new(Arc::clone(&self.gateway))
            .with_cancellation(interrupt.token())
            .with_conversation_logger(Arc::clone(&self.conversation_logger));
        let input = RunRethinkInput::new(message, self.models.clone()).with_params(self.params.clone());
        let progress = progress_for(self.repl.progress, self.output.color);

        let result = use_case.execute_with_progress(input, progress.as_ref()).await;
        drop(interrupt);

        match result {
            Ok(result) => {
                if result.cancelled {
                    eprintln!("(cancelled after {} rounds)", result.rounds_completed());
                }
                print!("{}", ConsoleFormatter.format(&result, self.output.format));
            }
            Err(e) => {
                eprintln!("Error: {}", e);
            }
        }
        println!();
    }
}
