//! Database abstraction layer.
//!
//! Provides a trait-based interface over the three supported backends
//! (bundled SQLite file, PostgreSQL, MySQL) so the agent tools and the
//! session can stay backend-agnostic.

mod mock;
mod mysql;
mod postgres;
mod sqlite;
mod types;

pub use mock::{FailingHandle, MockHandle};
pub use mysql::MySqlHandle;
pub use postgres::PostgresHandle;
pub use sqlite::SqliteHandle;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::{ChatError, Result};
use crate::profile::ConnectionProfile;

/// Query timeout in seconds.
pub(crate) const QUERY_TIMEOUT_SECS: u64 = 30;

/// Maximum rows returned from a query. Keeps tool output bounded.
pub(crate) const MAX_ROWS: usize = 200;

/// Trait defining the interface for live database handles.
///
/// All operations are async and return Results with ChatError. A handle is
/// bound to exactly one resolved connection profile.
#[async_trait]
pub trait DatabaseHandle: Send + Sync {
    /// Lists the user tables in the database.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Returns a textual schema description for one table.
    async fn table_schema(&self, table: &str) -> Result<String>;

    /// Executes a SQL query and returns the (possibly truncated) results.
    async fn run_query(&self, sql: &str) -> Result<QueryResult>;

    /// Closes the underlying connection pool.
    async fn close(&self);
}

/// Creates a database handle for the given profile.
///
/// This is the central factory: any failure (auth rejected, host
/// unreachable, database absent, missing file) surfaces as a
/// `ChatError::Connection` carrying the underlying cause. There is no
/// fallback between backends and no retry.
pub async fn connect(profile: &ConnectionProfile) -> Result<Arc<dyn DatabaseHandle>> {
    info!(backend = profile.kind().as_str(), "opening database connection");

    match profile {
        ConnectionProfile::Local { path } => {
            let handle = SqliteHandle::open(path).await?;
            Ok(Arc::new(handle))
        }
        ConnectionProfile::Postgres(_) => {
            let url = profile
                .connection_url()
                .ok_or_else(|| ChatError::internal("postgres profile without URL"))?;
            let handle = PostgresHandle::connect(&url).await?;
            Ok(Arc::new(handle))
        }
        ConnectionProfile::MySql(_) => {
            let url = profile
                .connection_url()
                .ok_or_else(|| ChatError::internal("mysql profile without URL"))?;
            let handle = MySqlHandle::connect(&url).await?;
            Ok(Arc::new(handle))
        }
    }
}

/// Maps a sqlx connection error to a user-facing message.
pub(crate) fn map_connection_error(error: &sqlx::Error, target: &str) -> ChatError {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ChatError::connection(format!(
            "Cannot connect to {target}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("access denied")
        || error_str.contains("authentication failed")
    {
        ChatError::connection("Authentication failed. Check your credentials.")
    } else if error_str.contains("does not exist") || error_str.contains("unknown database") {
        ChatError::connection("Database does not exist.")
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ChatError::connection(format!(
            "Connection to {target} timed out. The server may be unreachable."
        ))
    } else {
        ChatError::connection(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlx_config_err(msg: &str) -> sqlx::Error {
        sqlx::Error::Configuration(msg.into())
    }

    #[test]
    fn test_map_connection_refused() {
        let err = map_connection_error(&sqlx_config_err("Connection refused (os error 111)"), "db.example.com");
        assert!(err.to_string().contains("Cannot connect to db.example.com"));
    }

    #[test]
    fn test_map_auth_failure() {
        let err = map_connection_error(
            &sqlx_config_err("FATAL: password authentication failed for user \"reader\""),
            "db.example.com",
        );
        assert!(err.to_string().contains("Authentication failed"));
    }

    #[test]
    fn test_map_missing_database() {
        let err = map_connection_error(
            &sqlx_config_err("FATAL: database \"students\" does not exist"),
            "db.example.com",
        );
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_map_unknown_error_passes_cause_through() {
        let err = map_connection_error(&sqlx_config_err("something odd"), "db.example.com");
        assert!(err.to_string().contains("something odd"));
    }
}
