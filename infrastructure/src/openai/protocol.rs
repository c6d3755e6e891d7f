//! Chat Completions wire types.
//!
//! This module defines the request and streaming-chunk structures used to talk
//! to an OpenAI-compatible `/chat/completions` endpoint, and the conversion
//! from a domain [`InputList`] to the wire message list.
//!
//! # Protocol Overview
//!
//! - **Request**: `{model, messages, tools?, stream: true}`
//! - **Chunks**: `data: {"choices":[{"delta":{...},"finish_reason":...}]}` frames
//! - **Tool calls**: arrive as fragments keyed by `index`; `id` and `function.name`
//!   appear once, `function.arguments` is split across chunks

use rethink_domain::{CapabilityUnit, ConversationEntry, InputList, Role as EntryRole};
use serde::{Deserialize, Serialize};

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A function invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, exactly as produced by the model.
    pub arguments: String,
}

/// Tool call carried on an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates a system message (the unit's instructions).
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// Creates a tool result message answering `call_id`.
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// Function tool definition.
///
/// Converted from the domain's `to_api_tool()` JSON Schema format via
/// [`from_api_tool()`](Self::from_api_tool).
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Convert from `{"name": "...", "description": "...", "input_schema": {...}}`.
    pub fn from_api_tool(value: &serde_json::Value) -> Option<Self> {
        Some(Self {
            kind: "function",
            function: FunctionDefinition {
                name: value.get("name")?.as_str()?.to_string(),
                description: value.get("description")?.as_str()?.to_string(),
                parameters: value.get("input_schema")?.clone(),
            },
        })
    }
}

/// Streaming chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    pub stream: bool,
}

impl ChatRequest {
    /// Build the request for one turn of `unit` over `history`.
    pub fn for_unit(unit: &CapabilityUnit, history: &InputList) -> Self {
        Self {
            model: unit.model().to_string(),
            messages: to_chat_messages(unit.instructions(), history),
            tools: unit
                .tools_schema()
                .iter()
                .filter_map(ToolDefinition::from_api_tool)
                .collect(),
            stream: true,
        }
    }
}

/// One `data:` frame of a streamed completion
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallDelta>,
}

/// Fragment of a tool call, keyed by `index`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolCallDelta {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<FunctionCallDelta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionCallDelta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

/// Convert a conversation into wire messages, prefixed by the instructions.
///
/// Consecutive tool-call entries are grouped onto one assistant message, and
/// attach to an immediately preceding assistant text message if there is one.
pub fn to_chat_messages(instructions: &str, history: &InputList) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(instructions)];

    for entry in history.entries() {
        match entry {
            ConversationEntry::Message { role, content } => messages.push(match role {
                EntryRole::User => ChatMessage::user(content.as_str()),
                EntryRole::Assistant => ChatMessage::assistant(content.as_str()),
            }),
            ConversationEntry::ToolCall {
                call_id,
                name,
                arguments,
            } => {
                let call = ToolCall::function(call_id.as_str(), name.as_str(), arguments.as_str());
                match messages.last_mut() {
                    Some(last) if last.role == Role::Assistant => last.tool_calls.push(call),
                    _ => messages.push(ChatMessage {
                        role: Role::Assistant,
                        content: None,
                        tool_calls: vec![call],
                        tool_call_id: None,
                    }),
                }
            }
            ConversationEntry::ToolOutput { call_id, output } => {
                messages.push(ChatMessage::tool(call_id.as_str(), output.as_str()))
            }
        }
    }

    messages
}
