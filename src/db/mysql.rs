//! MySQL database handle.
//!
//! Implements the `DatabaseHandle` trait for MySQL using sqlx.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo};
use tracing::{debug, warn};

use super::postgres::format_schema;
use super::{ColumnInfo, DatabaseHandle, QueryResult, Row, Value, MAX_ROWS, QUERY_TIMEOUT_SECS};
use crate::error::{ChatError, Result};

/// MySQL database handle.
#[derive(Debug)]
pub struct MySqlHandle {
    pool: MySqlPool,
}

impl MySqlHandle {
    /// Establishes a connection pool from a percent-encoded connection URL.
    ///
    /// A single attempt, same policy as the postgres handle.
    pub async fn connect(url: &str) -> Result<Self> {
        let target = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "database".to_string());

        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .map_err(|e| super::map_connection_error(&e, &target))?;

        debug!(host = %target, "connected to mysql");
        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseHandle for MySqlHandle {
    async fn list_tables(&self) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::query(format!("Failed to list tables: {e}")))
    }

    async fn table_schema(&self, table: &str) -> Result<String> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT column_name, data_type, is_nullable
            FROM information_schema.columns
            WHERE table_schema = DATABASE() AND table_name = ?
            ORDER BY ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::query(format!("Failed to fetch schema for {table}: {e}")))?;

        if rows.is_empty() {
            return Err(ChatError::query(format!("No such table: {table}")));
        }

        Ok(format_schema(table, &rows))
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

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a MySqlRow to our Value type.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOLEAN" | "BOOL" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "FLOAT" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "VARBINARY" | "BINARY" => row
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
