//! PostgreSQL-backed storage for production use.
//!
//! One row per record in `webhook_logs`, with headers, body, and query
//! each in a JSONB column and a server-assigned creation timestamp. The
//! identifier is the primary key: two webhooks landing in the same
//! millisecond collide, and the unique constraint makes that a loud
//! `WriteFailed` rather than a silent overwrite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::{
    error::{Result, StoreError},
    models::{Record, RecordId},
    store::LogStore,
};

/// PostgreSQL-backed `LogStore` implementation.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the schema if it does not exist yet. Safe to run on every
    /// startup.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if the DDL cannot be executed.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS webhook_logs (
                identifier TEXT PRIMARY KEY,
                headers JSONB NOT NULL,
                body JSONB NOT NULL,
                query JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::write)?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_webhook_logs_created_at
            ON webhook_logs (created_at DESC)
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::write)?;

        Ok(())
    }
}

#[async_trait]
impl LogStore for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn save(&self, record: &Record) -> Result<RecordId> {
        let headers = serde_json::to_value(&record.headers).map_err(StoreError::write)?;
        let query = serde_json::to_value(&record.query).map_err(StoreError::write)?;

        sqlx::query(
            r"
            INSERT INTO webhook_logs (identifier, headers, body, query, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(record.id.as_str())
        .bind(headers)
        .bind(&record.body)
        .bind(query)
        .bind(record.received_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::WriteFailed(format!("identifier '{}' already exists", record.id))
            },
            _ => StoreError::write(e),
        })?;

        debug!(identifier = %record.id, "webhook record inserted");
        Ok(record.id.clone())
    }

    async fn list(&self) -> Result<Vec<RecordId>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r"
            SELECT identifier FROM webhook_logs
            ORDER BY created_at DESC, identifier DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::read)?;

        Ok(ids.into_iter().map(RecordId::new).collect())
    }

    async fn get(&self, id: &RecordId) -> Result<Record> {
        let row = sqlx::query(
            r"
            SELECT headers, body, query, created_at
            FROM webhook_logs
            WHERE identifier = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::read)?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let headers: serde_json::Value = row.try_get("headers").map_err(StoreError::read)?;
        let body: serde_json::Value = row.try_get("body").map_err(StoreError::read)?;
        let query: serde_json::Value = row.try_get("query").map_err(StoreError::read)?;
        let received_at: DateTime<Utc> = row.try_get("created_at").map_err(StoreError::read)?;

        let headers = serde_json::from_value(normalize_column(headers))
            .map_err(|e| StoreError::ReadFailed(format!("headers column for '{id}': {e}")))?;
        let query = serde_json::from_value(normalize_column(query))
            .map_err(|e| StoreError::ReadFailed(format!("query column for '{id}': {e}")))?;

        Ok(Record { id: id.clone(), received_at, headers, body: normalize_column(body), query })
    }
}

/// Normalizes a structured column to its parsed form.
///
/// Depending on how a row was written, a JSONB column can come back as an
/// already-parsed value or as a JSON string with the real document inside
/// it. Both forms must behave identically, so a string that parses as a
/// JSON container is decoded once; anything else is returned unchanged.
fn normalize_column(value: serde_json::Value) -> serde_json::Value {
    if let serde_json::Value::String(s) = &value {
        let trimmed = s.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(parsed) = serde_json::from_str(s) {
                return parsed;
            }
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn normalize_decodes_stringified_objects() {
        let raw = json!(r#"{"a": 1, "b": [true, null]}"#);
        assert_eq!(normalize_column(raw), json!({"a": 1, "b": [true, null]}));
    }

    #[test]
    fn normalize_keeps_parsed_values_unchanged() {
        let parsed = json!({"a": 1});
        assert_eq!(normalize_column(parsed.clone()), parsed);
    }

    #[test]
    fn normalize_keeps_plain_strings_unchanged() {
        let plain = json!("not json at all");
        assert_eq!(normalize_column(plain.clone()), plain);
    }
}
