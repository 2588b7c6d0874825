//! Error types for sqlchat.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for sqlchat operations.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Required connection fields were left empty. Blocks the turn before
    /// any connection attempt is made.
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingCredentials { fields: Vec<String> },

    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors. These are fed back to the agent as tool
    /// output rather than shown to the user.
    #[error("Query error: {0}")]
    Query(String),

    /// Agent invocation errors (API failures, malformed tool calls, etc.)
    #[error("Agent error: {0}")]
    Agent(String),

    /// Internal application errors (terminal failures, unexpected states).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Creates a missing-credentials error naming the unmet fields.
    pub fn missing_credentials(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::MissingCredentials {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an agent error with the given message.
    pub fn agent(msg: impl Into<String>) -> Self {
        Self::Agent(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingCredentials { .. } => "Missing Credentials",
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Agent(_) => "Agent Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using ChatError.
pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_credentials() {
        let err = ChatError::missing_credentials(["host", "database"]);
        assert_eq!(err.to_string(), "Missing required fields: host, database");
        assert_eq!(err.category(), "Missing Credentials");
    }

    #[test]
    fn test_error_display_connection() {
        let err = ChatError::connection("Cannot connect to localhost:5432");
        assert_eq!(
            err.to_string(),
            "Connection error: Cannot connect to localhost:5432"
        );
        assert_eq!(err.category(), "Connection Error");
    }

    #[test]
    fn test_error_display_agent() {
        let err = ChatError::agent("Rate limited. Please wait.");
        assert_eq!(err.to_string(), "Agent error: Rate limited. Please wait.");
        assert_eq!(err.category(), "Agent Error");
    }

    #[test]
    fn test_error_display_internal() {
        let err = ChatError::internal("unexpected state");
        assert_eq!(err.to_string(), "Internal error: unexpected state");
        assert_eq!(err.category(), "Internal Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChatError>();
    }
}
