//! Scripted agent for testing the turn pipeline without the network.

use async_trait::async_trait;

use super::{AgentEvent, ProgressSink, SqlAgent};
use crate::error::{ChatError, Result};

/// An agent that replays a scripted answer and progress events.
pub struct MockAgent {
    answer: std::result::Result<String, String>,
    events: Vec<AgentEvent>,
}

impl MockAgent {
    /// Creates an agent that answers every utterance with `answer`.
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            answer: Ok(answer.into()),
            events: Vec::new(),
        }
    }

    /// Creates an agent whose every turn fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            answer: Err(message.into()),
            events: Vec::new(),
        }
    }

    /// Adds progress events to emit before answering.
    pub fn with_events(mut self, events: Vec<AgentEvent>) -> Self {
        self.events = events;
        self
    }
}

#[async_trait]
impl SqlAgent for MockAgent {
    async fn run(&self, _utterance: &str, progress: &dyn ProgressSink) -> Result<String> {
        for event in &self.events {
            progress.emit(event.clone());
        }
        match &self.answer {
            Ok(answer) => Ok(answer.clone()),
            Err(message) => Err(ChatError::agent(message.clone())),
        }
    }
}
