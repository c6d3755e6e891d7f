//! Console output formatter for rethink results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use rethink_domain::RethinkResult;

/// Formats finished runs for the terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    fn header(title: &str) -> String {
        format!("{}\n", format!("=== {} ===", title).cyan().bold())
    }

    fn with_newline(text: &str) -> String {
        let mut text = text.to_string();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_full(&self, result: &RethinkResult) -> String {
        let mut output = Self::header("Rethink");
        output.push_str(&format!("{} {}\n", "Message:".cyan().bold(), result.message));
        output.push_str(&format!(
            "{} {}/{}{}\n",
            "Rounds:".cyan().bold(),
            result.rounds_completed(),
            result.budget,
            if result.cancelled { " (cancelled)" } else { "" }
        ));

        for round in &result.rounds {
            let title = format!("── Round {} ──", round.round);
            let title = if round.completed {
                title.yellow().bold()
            } else {
                title.red().bold()
            };
            output.push_str(&format!("\n{}\n", title));
            output.push_str(&Self::with_newline(&round.text));
        }

        output.push('\n');
        output.push_str(&Self::header("Final Answer"));
        output.push_str(&Self::with_newline(&result.final_answer));
        output
    }

    fn format_json(&self, result: &RethinkResult) -> String {
        let mut json = serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string());
        json.push('\n');
        json
    }

    fn format_answer(&self, result: &RethinkResult) -> String {
        Self::with_newline(&result.final_answer)
    }
}
