//! PostgreSQL database handle.
//!
//! Implements the `DatabaseHandle` trait for PostgreSQL using sqlx.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo};
use tracing::{debug, warn};

use super::{ColumnInfo, DatabaseHandle, QueryResult, Row, Value, MAX_ROWS, QUERY_TIMEOUT_SECS};
use crate::error::{ChatError, Result};

/// PostgreSQL database handle.
#[derive(Debug)]
pub struct PostgresHandle {
    pool: PgPool,
}

impl PostgresHandle {
    /// Establishes a connection pool from a percent-encoded connection URL.
    ///
    /// A single attempt: auth failures, unreachable hosts, and absent
    /// databases are surfaced as `ChatError::Connection` with the cause.
    pub async fn connect(url: &str) -> Result<Self> {
        let target = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "database".to_string());

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .map_err(|e| super::map_connection_error(&e, &target))?;

        debug!(host = %target, "connected to postgres");
        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseHandle for PostgresHandle {
    async fn list_tables(&self) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
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
            SELECT column_name::text, data_type::text, is_nullable::text
            FROM information_schema.columns
            WHERE table_schema = 'public' AND table_name = $1
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

/// Formats column rows as a one-line-per-column schema description.
pub(crate) fn format_schema(table: &str, columns: &[(String, String, String)]) -> String {
    let mut out = format!("Table {table}:\n");
    for (name, data_type, is_nullable) in columns {
        let null = if is_nullable == "YES" { "" } else { " not null" };
        out.push_str(&format!("  {name} {data_type}{null}\n"));
    }
    out
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "FLOAT8" | "DOUBLE PRECISION" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BYTEA" => row
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_schema() {
        let columns = vec![
            ("name".to_string(), "text".to_string(), "NO".to_string()),
            ("marks".to_string(), "integer".to_string(), "YES".to_string()),
        ];
        let schema = format_schema("student", &columns);
        assert_eq!(schema, "Table student:\n  name text not null\n  marks integer\n");
    }
}
