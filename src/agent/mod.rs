//! The natural-language-to-SQL agent boundary.
//!
//! The rest of the application only sees the narrow `SqlAgent` capability:
//! one utterance in, one answer out, with advisory progress events along
//! the way. Planning, tool use, and recovery live behind this trait.

pub mod groq;
pub mod mock;

pub use groq::GroqAgent;
pub use mock::MockAgent;

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;

/// An intermediate progress event emitted during a turn.
///
/// Events are advisory: they are rendered live in the UI while the agent
/// works, but never persisted into the transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// The agent selected a tool.
    ToolCall { name: String, input: String },
    /// The agent is about to execute this SQL.
    Sql(String),
    /// Result (or error text) observed from a tool.
    Observation(String),
}

impl fmt::Display for AgentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolCall { name, input } if input.is_empty() => write!(f, "→ {name}"),
            Self::ToolCall { name, input } => write!(f, "→ {name}({input})"),
            Self::Sql(sql) => write!(f, "⚙ {sql}"),
            Self::Observation(text) => {
                // First line only; observations can be whole result sets
                let first = text.lines().next().unwrap_or("");
                write!(f, "· {first}")
            }
        }
    }
}

/// Receives progress events during an agent turn.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: AgentEvent);
}

/// A sink that discards all events.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: AgentEvent) {}
}

/// A sink forwarding events over an unbounded channel, for the TUI.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<AgentEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiving half.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AgentEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: AgentEvent) {
        // Receiver may be gone if the UI dropped the turn; nothing to do
        let _ = self.tx.send(event);
    }
}

/// The agent capability: turn one natural-language utterance into a
/// textual answer, using the database it was built around.
#[async_trait]
pub trait SqlAgent: Send + Sync {
    async fn run(&self, utterance: &str, progress: &dyn ProgressSink) -> Result<String>;
}
