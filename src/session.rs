//! One interactive chat session.
//!
//! Owns the transcript, the handle cache, and the currently-active
//! connection. A turn is two steps so the UI can run the agent in the
//! background: `begin_turn` records the user message immediately, and
//! `complete_turn` records the assistant answer once the agent finishes.
//! A failed turn records nothing beyond the user message.

use std::sync::Arc;

use tracing::info;

use crate::agent::{ProgressSink, SqlAgent};
use crate::cache::HandleCache;
use crate::db::DatabaseHandle;
use crate::error::Result;
use crate::profile::ConnectionProfile;
use crate::transcript::{ChatMessage, Transcript};

/// Session state for one run of the application.
pub struct Session {
    transcript: Transcript,
    cache: HandleCache,
    active: Option<(ConnectionProfile, Arc<dyn DatabaseHandle>)>,
}

impl Session {
    /// Creates a session with a seeded transcript and an empty cache.
    pub fn new() -> Self {
        Self {
            transcript: Transcript::new(),
            cache: HandleCache::new(),
            active: None,
        }
    }

    /// Connects to `profile`, reusing a fresh cached handle when one
    /// exists, and makes it the active connection.
    pub async fn connect(&mut self, profile: &ConnectionProfile) -> Result<Arc<dyn DatabaseHandle>> {
        let handle = self.cache.get_or_connect(profile).await?;
        self.active = Some((profile.clone(), Arc::clone(&handle)));
        Ok(handle)
    }

    /// The handle of the active connection, if any.
    pub fn active_handle(&self) -> Option<Arc<dyn DatabaseHandle>> {
        self.active.as_ref().map(|(_, h)| Arc::clone(h))
    }

    /// The profile of the active connection, if any.
    pub fn active_profile(&self) -> Option<&ConnectionProfile> {
        self.active.as_ref().map(|(p, _)| p)
    }

    /// Records the user's utterance at the end of the transcript.
    pub fn begin_turn(&mut self, utterance: impl Into<String>) {
        self.transcript.append(ChatMessage::user(utterance));
    }

    /// Records the agent's answer, if the turn succeeded.
    ///
    /// On error nothing is appended; the transcript keeps the user
    /// message as its tail and the error surfaces outside the history.
    pub fn complete_turn(&mut self, outcome: &Result<String>) {
        if let Ok(answer) = outcome {
            self.transcript.append(ChatMessage::assistant(answer.clone()));
        }
    }

    /// Runs one full turn synchronously: append the user message, run
    /// the agent, append its answer on success.
    pub async fn handle_turn(
        &mut self,
        utterance: &str,
        agent: &dyn SqlAgent,
        progress: &dyn ProgressSink,
    ) -> Result<String> {
        self.begin_turn(utterance);
        let outcome = agent.run(utterance, progress).await;
        self.complete_turn(&outcome);
        outcome
    }

    /// Resets the transcript to the seed greeting. The active connection
    /// and the cache are untouched.
    pub fn clear_history(&mut self) {
        info!("chat history cleared");
        self.transcript.reset();
    }

    /// Read-only view of the transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{MockAgent, NullSink};
    use crate::transcript::{ChatRole, GREETING};

    #[tokio::test]
    async fn test_successful_turn_appends_both_messages() {
        let mut session = Session::new();
        let agent = MockAgent::answering("Alice has the top marks.");

        let answer = session
            .handle_turn("who has the top marks?", &agent, &NullSink)
            .await
            .unwrap();

        assert_eq!(answer, "Alice has the top marks.");
        let contents: Vec<&str> = session
            .transcript()
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(
            contents,
            vec![GREETING, "who has the top marks?", "Alice has the top marks."]
        );
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_only_user_message() {
        let mut session = Session::new();
        let agent = MockAgent::failing("model unavailable");

        let outcome = session.handle_turn("anything", &agent, &NullSink).await;

        assert!(outcome.is_err());
        let last = session.transcript().messages().last().unwrap();
        assert_eq!(last.role, ChatRole::User);
        assert_eq!(last.content, "anything");
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_history_resets_to_greeting() {
        let mut session = Session::new();
        let agent = MockAgent::answering("A1");
        session.handle_turn("Q1", &agent, &NullSink).await.unwrap();

        session.clear_history();

        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript().messages()[0].content, GREETING);
    }

    #[test]
    fn test_split_turn_matches_handle_turn() {
        let mut session = Session::new();
        session.begin_turn("Q1");
        session.complete_turn(&Ok("A1".to_string()));

        let contents: Vec<&str> = session
            .transcript()
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec![GREETING, "Q1", "A1"]);
    }

    #[test]
    fn test_no_active_connection_initially() {
        let session = Session::new();
        assert!(session.active_handle().is_none());
        assert!(session.active_profile().is_none());
    }
}
