//! Round state threading: how one round's result seeds the next round.

use crate::conversation::entities::ConversationEntry;
use crate::conversation::input_list::InputList;
use crate::orchestration::value_objects::RoundResult;
use serde::{Deserialize, Serialize};

/// What to thread when the provider supplies no structured history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadingFallback {
    /// Reuse the prior input list unchanged.
    #[default]
    ReusePrior,
    /// Append the round's accumulated text as an assistant entry.
    AppendText,
}

impl ThreadingFallback {
    pub fn as_str(&self) -> &str {
        match self {
            ThreadingFallback::ReusePrior => "reuse_prior",
            ThreadingFallback::AppendText => "append_text",
        }
    }
}

impl std::str::FromStr for ThreadingFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "reuse_prior" | "reuse" => Ok(ThreadingFallback::ReusePrior),
            "append_text" | "append" => Ok(ThreadingFallback::AppendText),
            other => Err(format!("unknown threading fallback: {}", other)),
        }
    }
}

/// Converts a round's result into the next round's input list
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundStateThreader {
    fallback: ThreadingFallback,
}

impl RoundStateThreader {
    pub fn new(fallback: ThreadingFallback) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> ThreadingFallback {
        self.fallback
    }

    /// Structured history wins; otherwise apply the fallback.
    pub fn next_input(&self, prior: InputList, result: &RoundResult) -> InputList {
        if let Some(history) = &result.history {
            return history.clone();
        }

        match self.fallback {
            ThreadingFallback::ReusePrior => prior,
            ThreadingFallback::AppendText => {
                let text = result.text.trim_end();
                if text.is_empty() {
                    prior
                } else {
                    prior.with(ConversationEntry::assistant(text))
                }
            }
        }
    }
}
