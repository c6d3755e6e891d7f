//! Server-sent event decoding for streamed completions.
//!
//! [`SseDecoder`] turns raw body bytes into `data:` frames; [`TurnAccumulator`]
//! folds parsed chunks into one assistant turn (text plus tool calls).

use super::error::{OpenAiError, Result};
use super::protocol::{ChatChunk, ToolCall};
use std::collections::BTreeMap;

/// A complete SSE frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    Data(String),
    /// The `[DONE]` sentinel
    Done,
}

/// Incremental line decoder
///
/// Bytes are buffered until a full line is available, so multi-byte UTF-8
/// sequences split across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every frame completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(frame) = Self::parse_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<SseFrame> {
        let line = std::mem::take(&mut self.buffer);
        Self::parse_line(&line)
    }

    fn parse_line(line: &[u8]) -> Option<SseFrame> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\n', '\r']);

        // Comments (": keep-alive"), `event:`, `id:` and blank separators carry no data.
        let data = line.strip_prefix("data:")?;
        let data = data.strip_prefix(' ').unwrap_or(data);

        if data == "[DONE]" {
            Some(SseFrame::Done)
        } else {
            Some(SseFrame::Data(data.to_string()))
        }
    }
}

/// Parse a `data:` payload into a chunk.
pub fn parse_chunk(data: &str) -> Result<ChatChunk> {
    serde_json::from_str(data).map_err(|e| OpenAiError::MalformedFrame {
        error: e.to_string(),
        raw: data.to_string(),
    })
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// One finished assistant turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantTurn {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<String>,
}

/// Folds chunks of one streamed response into an [`AssistantTurn`].
#[derive(Debug, Default)]
pub struct TurnAccumulator {
    content: String,
    tool_calls: BTreeMap<u32, PartialToolCall>,
    finish_reason: Option<String>,
}

impl TurnAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a chunk; returns the visible text fragments it carried, in order.
    pub fn apply(&mut self, chunk: ChatChunk) -> Vec<String> {
        let mut deltas = Vec::new();

        // Only the first choice is requested.
        let Some(choice) = chunk.choices.into_iter().next() else {
            return deltas;
        };

        if let Some(reason) = choice.finish_reason {
            self.finish_reason = Some(reason);
        }

        if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
            self.content.push_str(&content);
            deltas.push(content);
        }

        for fragment in choice.delta.tool_calls {
            let entry = self.tool_calls.entry(fragment.index).or_default();
            if let Some(id) = fragment.id {
                entry.id = id;
            }
            if let Some(function) = fragment.function {
                if let Some(name) = function.name {
                    entry.name = name;
                }
                if let Some(arguments) = function.arguments {
                    entry.arguments.push_str(&arguments);
                }
            }
        }

        deltas
    }

    pub fn finish(self) -> AssistantTurn {
        AssistantTurn {
            content: self.content,
            tool_calls: self
                .tool_calls
                .into_values()
                .map(|call| ToolCall::function(call.id, call.name, call.arguments))
                .collect(),
            finish_reason: self.finish_reason,
        }
    }
}
