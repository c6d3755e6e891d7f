//! Conversation domain entities

use serde::{Deserialize, Serialize};

/// Who produced a conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single entry in a conversation (Entity)
///
/// Plain messages carry a role and text. Tool calls and their outputs are
/// agent-produced entries kept in the history so that a later round sees what
/// the delegates were asked and what they answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEntry {
    Message {
        role: Role,
        content: String,
    },
    ToolCall {
        call_id: String,
        name: String,
        /// Raw JSON arguments as produced by the model.
        arguments: String,
    },
    ToolOutput {
        call_id: String,
        output: String,
    },
}

impl ConversationEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self::Message {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Message {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn tool_call(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self::ToolCall {
            call_id: call_id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    pub fn tool_output(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self::ToolOutput {
            call_id: call_id.into(),
            output: output.into(),
        }
    }

    /// Role tag of this entry. Tool calls and outputs are agent-produced.
    pub fn role(&self) -> Role {
        match self {
            Self::Message { role, .. } => *role,
            Self::ToolCall { .. } | Self::ToolOutput { .. } => Role::Assistant,
        }
    }

    /// Text content of the entry (message text or tool output).
    pub fn content(&self) -> &str {
        match self {
            Self::Message { content, .. } => content,
            Self::ToolCall { arguments, .. } => arguments,
            Self::ToolOutput { output, .. } => output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_entries_are_agent_produced() {
        assert_eq!(ConversationEntry::user("hi").role(), Role::User);
        assert_eq!(
            ConversationEntry::tool_call("call_1", "rethink", "{}").role(),
            Role::Assistant
        );
        assert_eq!(
            ConversationEntry::tool_output("call_1", "done").role(),
            Role::Assistant
        );
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(ConversationEntry::assistant("ok")).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "ok");
    }
}
