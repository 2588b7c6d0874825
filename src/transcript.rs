//! Chat transcript state.
//!
//! An ordered, role-tagged message history scoped to one interactive
//! session. Append-only, except for an explicit reset that replaces the
//! whole transcript with the seed greeting.

use serde::{Deserialize, Serialize};

/// Content of the seed message shown after a reset.
pub const GREETING: &str = "How can I help you?";

/// Role of a message in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Returns the role as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The ordered chat history shown to the user.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Creates a transcript seeded with the greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }

    /// Replaces the transcript with exactly the seed greeting.
    pub fn reset(&mut self) {
        self.messages = vec![ChatMessage::assistant(GREETING)];
    }

    /// Appends one message at the end. Ordering is append order; messages
    /// are never reordered or deduplicated.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Read-only ordered view for rendering.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages in the transcript.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// A transcript is never empty; it always holds at least the greeting.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transcript_holds_greeting() {
        let transcript = Transcript::new();
        assert_eq!(transcript.len(), 1);
        assert_eq!(
            transcript.messages()[0],
            ChatMessage::assistant(GREETING)
        );
    }

    #[test]
    fn test_reset_discards_history() {
        let mut transcript = Transcript::new();
        transcript.append(ChatMessage::user("Q1"));
        transcript.append(ChatMessage::assistant("A1"));
        transcript.append(ChatMessage::user("Q2"));

        transcript.reset();

        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].role, ChatRole::Assistant);
        assert_eq!(transcript.messages()[0].content, GREETING);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.append(ChatMessage::user("Q1"));
        transcript.append(ChatMessage::assistant("A1"));
        transcript.append(ChatMessage::user("Q2"));

        let contents: Vec<&str> = transcript
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec![GREETING, "Q1", "A1", "Q2"]);
    }

    #[test]
    fn test_duplicate_messages_are_kept() {
        let mut transcript = Transcript::new();
        transcript.append(ChatMessage::user("same"));
        transcript.append(ChatMessage::user("same"));
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(ChatRole::User.as_str(), "user");
        assert_eq!(ChatRole::Assistant.as_str(), "assistant");
    }
}
