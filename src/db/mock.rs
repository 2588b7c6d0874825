//! Mock database handles for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{ColumnInfo, DatabaseHandle, QueryResult, Value};
use crate::error::{ChatError, Result};

/// A mock handle that returns predefined results and records queries.
pub struct MockHandle {
    tables: Vec<String>,
    queries: Mutex<Vec<String>>,
}

impl MockHandle {
    /// Creates a new mock handle with a single `student` table.
    pub fn new() -> Self {
        Self {
            tables: vec!["student".to_string()],
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock handle reporting the given tables.
    pub fn with_tables(tables: Vec<String>) -> Self {
        Self {
            tables,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Returns the queries executed through this handle, in order.
    pub fn executed_queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock poisoned").clone()
    }
}

impl Default for MockHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseHandle for MockHandle {
    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.clone())
    }

    async fn table_schema(&self, table: &str) -> Result<String> {
        if self.tables.iter().any(|t| t == table) {
            Ok(format!("Table {table}:\n  name text not null\n  marks integer\n"))
        } else {
            Err(ChatError::query(format!("No such table: {table}")))
        }
    }

    async fn run_query(&self, sql: &str) -> Result<QueryResult> {
        self.queries
            .lock()
            .expect("queries lock poisoned")
            .push(sql.to_string());

        if sql.trim_start().to_uppercase().starts_with("SELECT") {
            Ok(QueryResult::with_data(
                vec![ColumnInfo::new("result", "text")],
                vec![vec![Value::String(format!("Mock result for: {sql}"))]],
            ))
        } else {
            Err(ChatError::query("attempt to write a readonly database"))
        }
    }

    async fn close(&self) {}
}

/// A handle whose every operation fails, for error-path tests.
pub struct FailingHandle {
    message: String,
}

impl FailingHandle {
    /// Creates a failing handle with the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseHandle for FailingHandle {
    async fn list_tables(&self) -> Result<Vec<String>> {
        Err(ChatError::query(self.message.clone()))
    }

    async fn table_schema(&self, _table: &str) -> Result<String> {
        Err(ChatError::query(self.message.clone()))
    }

    async fn run_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(ChatError::query(self.message.clone()))
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_select() {
        let handle = MockHandle::new();
        let result = handle.run_query("SELECT 1").await.unwrap();
        assert_eq!(result.row_count, 1);
        assert_eq!(handle.executed_queries(), vec!["SELECT 1"]);
    }

    #[tokio::test]
    async fn test_mock_rejects_writes() {
        let handle = MockHandle::new();
        assert!(handle.run_query("INSERT INTO t VALUES (1)").await.is_err());
    }

    #[tokio::test]
    async fn test_failing_handle() {
        let handle = FailingHandle::new("boom");
        assert!(handle.list_tables().await.is_err());
        assert!(handle.run_query("SELECT 1").await.is_err());
    }
}
