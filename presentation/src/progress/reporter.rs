//! Progress reporting for rethink runs
//!
//! Everything here writes to stderr so stdout carries only the answer.

use crate::config::ProgressMode;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rethink_application::ports::progress::{NoProgress, ProgressNotifier};
use rethink_domain::{RoundResult, RunItemEvent};
use std::io::Write;
use std::sync::Mutex;

struct PrinterState<W> {
    out: W,
    /// Bytes of the current round's text already written
    printed: usize,
}

/// Streams each round's text as it grows
pub struct StreamPrinter<W: Write + Send = std::io::Stderr> {
    state: Mutex<PrinterState<W>>,
    color: bool,
}

impl StreamPrinter {
    pub fn stderr(color: bool) -> Self {
        Self::new(std::io::stderr(), color)
    }
}

impl<W: Write + Send> StreamPrinter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            state: Mutex::new(PrinterState { out, printed: 0 }),
            color,
        }
    }

    pub fn into_inner(self) -> W {
        match self.state.into_inner() {
            Ok(state) => state.out,
            Err(poisoned) => poisoned.into_inner().out,
        }
    }

    fn header(&self, round: usize, total: usize) -> String {
        let title = format!("── Round {}/{} ──", round, total);
        if self.color {
            title.bold().cyan().to_string()
        } else {
            title
        }
    }

    fn dim(&self, text: String) -> String {
        if self.color { text.dimmed().to_string() } else { text }
    }
}

impl<W: Write + Send> ProgressNotifier for StreamPrinter<W> {
    fn on_round_start(&self, round: usize, total: usize) {
        let header = self.header(round, total);
        if let Ok(mut state) = self.state.lock() {
            state.printed = 0;
            let _ = writeln!(state.out, "{}", header);
        }
    }

    fn on_delta(&self, _round: usize, text: &str) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        // Text only ever grows within a round, so the old length is a char boundary.
        if let Some(suffix) = text.get(state.printed..) {
            let _ = write!(state.out, "{}", suffix);
            let _ = state.out.flush();
            state.printed = text.len();
        }
    }

    fn on_tool_event(&self, _round: usize, event: &RunItemEvent) {
        if let RunItemEvent::ToolCalled { name, .. } = event {
            let line = self.dim(format!("  ↳ {}", name));
            if let Ok(mut state) = self.state.lock() {
                let _ = writeln!(state.out, "{}", line);
            }
        }
    }

    fn on_round_complete(&self, _round: usize, result: &RoundResult) {
        if let Ok(mut state) = self.state.lock() {
            if !result.text.ends_with('\n') {
                let _ = writeln!(state.out);
            }
            let _ = writeln!(state.out);
        }
    }
}

/// A progress bar advancing once per round
pub struct RoundProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl RoundProgress {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for RoundProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for RoundProgress {
    fn on_round_start(&self, round: usize, total: usize) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        let bar = slot.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(Self::style());
            bar.set_prefix("Rethinking");
            bar
        });
        bar.set_message(format!("round {}", round));
    }

    fn on_delta(&self, round: usize, text: &str) {
        if let Ok(slot) = self.bar.lock()
            && let Some(bar) = slot.as_ref()
        {
            bar.set_message(format!("round {} · {} chars", round, text.chars().count()));
        }
    }

    fn on_round_complete(&self, _round: usize, result: &RoundResult) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        if let Some(bar) = slot.as_ref() {
            bar.inc(1);
            let done = bar.length().is_some_and(|len| bar.position() >= len);
            if done || !result.completed {
                let message = if result.completed {
                    "done".green().to_string()
                } else {
                    "cancelled".yellow().to_string()
                };
                bar.finish_with_message(message);
                *slot = None;
            }
        }
    }
}

/// Build the notifier for a progress mode.
pub fn progress_for(mode: ProgressMode, color: bool) -> Box<dyn ProgressNotifier> {
    match mode {
        ProgressMode::Stream => Box::new(StreamPrinter::stderr(color)),
        ProgressMode::Bar => Box::new(RoundProgress::new()),
        ProgressMode::Quiet => Box::new(NoProgress),
    }
}
