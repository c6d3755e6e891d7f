//! User message value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// The message a run refines (Value Object)
///
/// Always non-empty after trimming. Unlike most value objects in this crate
/// there is no panicking constructor: an empty message is a user-correctable
/// condition and is reported as [`DomainError::EmptyMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserMessage {
    content: String,
}

impl UserMessage {
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        Ok(Self { content })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for UserMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for UserMessage {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<UserMessage> for String {
    fn from(message: UserMessage) -> Self {
        message.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let m = UserMessage::try_new("Is remote work good?").unwrap();
        assert_eq!(m.content(), "Is remote work good?");
    }

    #[test]
    fn test_empty_and_whitespace_rejected() {
        assert_eq!(UserMessage::try_new(""), Err(DomainError::EmptyMessage));
        assert_eq!(UserMessage::try_new("  \n\t "), Err(DomainError::EmptyMessage));
    }

    #[test]
    fn test_content_is_not_trimmed() {
        let m = UserMessage::try_new("  padded ").unwrap();
        assert_eq!(m.content(), "  padded ");
    }
}
