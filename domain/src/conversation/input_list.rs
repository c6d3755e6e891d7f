//! The Input List: conversation state threaded from one round to the next.

use super::entities::{ConversationEntry, Role};
use crate::core::message::UserMessage;
use serde::{Deserialize, Serialize};

/// Ordered conversation history fed to the supervising unit (Value Object)
///
/// A list built by [`InputList::from_message`] always starts with the
/// original user message. Lists handed back by a model provider
/// ([`InputList::from_entries`]) are taken as-is; the provider owns their shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputList {
    entries: Vec<ConversationEntry>,
}

impl InputList {
    /// The round-1 input: a single user entry.
    pub fn from_message(message: &UserMessage) -> Self {
        Self {
            entries: vec![ConversationEntry::user(message.content())],
        }
    }

    pub fn from_entries(entries: Vec<ConversationEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: ConversationEntry) {
        self.entries.push(entry);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, entry: ConversationEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Content of the first user entry, if any.
    pub fn first_user_message(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| matches!(e, ConversationEntry::Message { role: Role::User, .. }))
            .map(|e| e.content())
    }

    /// Content of the last plain assistant message, if any.
    pub fn last_assistant_message(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| {
                matches!(
                    e,
                    ConversationEntry::Message {
                        role: Role::Assistant,
                        ..
                    }
                )
            })
            .map(|e| e.content())
    }

    /// Render the list as plain text, one `role: content` line per message.
    ///
    /// Used when a capability unit is invoked with text rather than a list.
    pub fn to_transcript(&self) -> String {
        self.entries
            .iter()
            .map(|e| match e {
                ConversationEntry::Message { role, content } => format!("{}: {}", role, content),
                ConversationEntry::ToolCall { name, arguments, .. } => {
                    format!("tool call {}: {}", name, arguments)
                }
                ConversationEntry::ToolOutput { output, .. } => format!("tool output: {}", output),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl IntoIterator for InputList {
    type Item = ConversationEntry;
    type IntoIter = std::vec::IntoIter<ConversationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
