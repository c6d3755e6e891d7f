//! Streaming events for one round of a supervising unit.
//!
//! A round's stream is a tagged union of two kinds of events:
//!
//! - [`StreamEvent::RawResponse`] — what the model itself emits while generating
//!   ([`ResponseEvent::TextDelta`], [`ResponseEvent::ContentPartDone`], ...)
//! - [`StreamEvent::Other`] — run bookkeeping such as delegate tool calls and
//!   their outputs ([`RunItemEvent`])
//!
//! Only raw response events carry visible text. Tool dispatch is reported as a
//! distinct variant so consumers can pass it through without interpreting it.

use serde::{Deserialize, Serialize};

/// An event emitted by the model while producing a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ResponseEvent {
    /// An incremental fragment of generated text.
    TextDelta(String),
    /// The current content part is complete (marks the end of a round's text).
    ContentPartDone,
    /// Any other provider event, identified by its type name.
    Other(String),
}

/// Bookkeeping emitted by the run around the model's output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunItemEvent {
    /// The active unit changed (e.g. a handoff or a new model turn).
    AgentUpdated { name: String },
    /// The model asked to invoke a delegate tool.
    ToolCalled {
        call_id: String,
        name: String,
        arguments: String,
    },
    /// A delegate tool returned.
    ToolOutput { call_id: String, output: String },
    /// A complete assistant message item was produced.
    MessageOutput(String),
}

/// An event in a round's stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    RawResponse(ResponseEvent),
    Other(RunItemEvent),
}

impl StreamEvent {
    pub fn text_delta(delta: impl Into<String>) -> Self {
        StreamEvent::RawResponse(ResponseEvent::TextDelta(delta.into()))
    }

    pub fn content_part_done() -> Self {
        StreamEvent::RawResponse(ResponseEvent::ContentPartDone)
    }

    /// Returns the delta if this is a raw text-delta event.
    pub fn as_text_delta(&self) -> Option<&str> {
        match self {
            StreamEvent::RawResponse(ResponseEvent::TextDelta(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_raw_response(&self) -> bool {
        matches!(self, StreamEvent::RawResponse(_))
    }

    /// Returns true if this event marks the end of the round's text.
    pub fn is_content_part_done(&self) -> bool {
        matches!(self, StreamEvent::RawResponse(ResponseEvent::ContentPartDone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_delta_returns_content() {
        let event = StreamEvent::text_delta("hello");
        assert_eq!(event.as_text_delta(), Some("hello"));
        assert!(event.is_raw_response());
        assert!(!event.is_content_part_done());
    }

    #[test]
    fn content_part_done_is_raw_and_terminal() {
        let event = StreamEvent::content_part_done();
        assert!(event.is_raw_response());
        assert!(event.is_content_part_done());
        assert_eq!(event.as_text_delta(), None);
    }

    #[test]
    fn tool_call_is_not_raw() {
        let event = StreamEvent::Other(RunItemEvent::ToolCalled {
            call_id: "call_1".to_string(),
            name: "rethink".to_string(),
            arguments: "{\"input\":\"x\"}".to_string(),
        });
        assert!(!event.is_raw_response());
        assert_eq!(event.as_text_delta(), None);
    }

    #[test]
    fn raw_other_carries_no_text() {
        let event = StreamEvent::RawResponse(ResponseEvent::Other("response.created".to_string()));
        assert!(event.is_raw_response());
        assert_eq!(event.as_text_delta(), None);
        assert!(!event.is_content_part_done());
    }
}
