//! Output formatter trait

use rethink_domain::{OutputFormat, RethinkResult};

/// Trait for formatting finished runs
pub trait OutputFormatter {
    /// Every round followed by the final answer
    fn format_full(&self, result: &RethinkResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &RethinkResult) -> String;

    /// The final answer alone
    fn format_answer(&self, result: &RethinkResult) -> String;

    fn format(&self, result: &RethinkResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Answer => self.format_answer(result),
            OutputFormat::Full => self.format_full(result),
            OutputFormat::Json => self.format_json(result),
        }
    }
}
