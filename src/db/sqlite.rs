//! SQLite handle for the bundled local database.
//!
//! The file is opened strictly read-only; any write statement issued
//! through this handle fails at the database level.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo};
use tracing::{debug, warn};

use super::{ColumnInfo, DatabaseHandle, QueryResult, Row, Value, MAX_ROWS, QUERY_TIMEOUT_SECS};
use crate::error::{ChatError, Result};

/// Read-only SQLite database handle.
#[derive(Debug)]
pub struct SqliteHandle {
    pool: SqlitePool,
}

impl SqliteHandle {
    /// Opens the database file at `path` in read-only mode.
    ///
    /// A missing file is a connection error; the file is never created.
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ChatError::connection(format!(
                "Database file not found: {}",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| super::map_connection_error(&e, &path.display().to_string()))?;

        debug!("opened sqlite database at {}", path.display());
        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseHandle for SqliteHandle {
    async fn list_tables(&self) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT name FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::query(format!("Failed to list tables: {e}")))
    }

    async fn table_schema(&self, table: &str) -> Result<String> {
        let sql: Option<Option<String>> = sqlx::query_scalar(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
        )
        .bind(table)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::query(format!("Failed to fetch schema for {table}: {e}")))?;

        sql.flatten()
            .ok_or_else(|| ChatError::query(format!("No such table: {table}")))
    }

    async fn run_query(&self, sql: &str) -> Result<QueryResult> {
        let result = tokio::time::timeout(
            Duration::from_secs(QUERY_TIMEOUT_SECS),
            sqlx::query(sql).fetch_all(&self.pool),
        )
        .await
        .map_err(|_| {
            ChatError::query(format!("Query timed out after {QUERY_TIMEOUT_SECS} seconds"))
        })?
        .map_err(|e| ChatError::query(e.to_string()))?;

        let columns: Vec<ColumnInfo> = result
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let total_rows = result.len();
        let was_truncated = total_rows > MAX_ROWS;
        if was_truncated {
            warn!(total_rows, "query result truncated to {MAX_ROWS} rows");
        }

        let rows: Vec<Row> = result.iter().take(MAX_ROWS).map(convert_row).collect();
        let row_count = rows.len();

        Ok(QueryResult {
            columns,
            rows,
            row_count,
            was_truncated,
        })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a SqliteRow to our Value type.
fn convert_value(row: &SqliteRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOLEAN" | "BOOL" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "INTEGER" | "INT" | "INT4" | "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" | "FLOAT" | "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
