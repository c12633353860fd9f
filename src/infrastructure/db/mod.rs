//! Database collaborator.
//!
//! The pipeline consumes the database through the narrow [`Database`]
//! trait: `None` signals execution failure, an empty Vec a statement with
//! no result rows. [`PgDatabase`] implements it over a sqlx Postgres pool.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, Pool, Postgres, Row as SqlxRow};
use tracing::error;

use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::DbConfig;

pub type Row = HashMap<String, serde_json::Value>;

#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a statement and return its rows, or `None` on failure.
    async fn execute(&self, query: &str) -> Option<Vec<Row>>;
}

pub struct PgDatabase {
    pool: Pool<Postgres>,
    query_timeout: Duration,
}

impl PgDatabase {
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .connect(&config.connection_string())
            .await
            .map_err(|e| AppError::DatabaseError(format!("Connection failed: {}", e)))?;

        Ok(Self {
            pool,
            query_timeout: Duration::from_secs(30),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Row>> {
        let rows = tokio::time::timeout(self.query_timeout, sqlx::query(query).fetch_all(&self.pool))
            .await
            .map_err(|_| {
                AppError::DatabaseError(format!(
                    "Query timed out after {} seconds",
                    self.query_timeout.as_secs()
                ))
            })?
            .map_err(|e| AppError::DatabaseError(format!("Query execution failed: {}", e)))?;

        Ok(rows.iter().map(row_to_json).collect())
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn execute(&self, query: &str) -> Option<Vec<Row>> {
        match self.fetch(query).await {
            Ok(rows) => Some(rows),
            Err(err) => {
                error!(error = %err, "Query execution failed");
                None
            }
        }
    }
}

fn row_to_json(row: &PgRow) -> Row {
    let mut map = HashMap::new();
    for (i, column) in row.columns().iter().enumerate() {
        map.insert(column.name().to_string(), extract_column_value(row, i));
    }
    map
}

/// Extract a column value as JSON, trying types in order of likelihood.
fn extract_column_value(row: &PgRow, index: usize) -> serde_json::Value {
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v
            .map(serde_json::Value::String)
            .unwrap_or(serde_json::Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<String>>, _>(index) {
        return v
            .map(|items| {
                serde_json::Value::Array(
                    items.into_iter().map(serde_json::Value::String).collect(),
                )
            })
            .unwrap_or(serde_json::Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v
            .map(|n| serde_json::Value::Number(n.into()))
            .unwrap_or(serde_json::Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(index) {
        return v
            .map(|n| serde_json::Value::Number(n.into()))
            .unwrap_or(serde_json::Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v
            .map(serde_json::Value::Bool)
            .unwrap_or(serde_json::Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index) {
        return v
            .map(|dt| serde_json::Value::String(dt.to_rfc3339()))
            .unwrap_or(serde_json::Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(index) {
        return v
            .map(|d| serde_json::Value::String(d.to_string()))
            .unwrap_or(serde_json::Value::Null);
    }

    serde_json::Value::Null
}
