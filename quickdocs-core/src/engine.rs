//! Database execution engine.
//!
//! Runs translated queries against SQLite using sqlx and returns rows as
//! JSON-valued maps, keyed by column name. The engine binds the translation's
//! parameters positionally; SQL text and user input never mix.

use std::collections::HashMap;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool, TypeInfo};

use crate::error::{QuickdocsError, QuickdocsResult};
use crate::translator::Translation;

/// One result row, as returned to callers and serialized to responses.
pub type ResultRow = HashMap<String, serde_json::Value>;

/// A handle to the QuickDocs database.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open a database pool from a connection URL.
    ///
    /// Accepts `sqlite://path/to/quickdocs.db` or `sqlite::memory:`; the
    /// database file is created if missing.
    pub async fn connect(url: &str) -> QuickdocsResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| QuickdocsError::Connection(e.to_string()))?
            .create_if_missing(true);

        // An in-memory SQLite database exists per connection; a second
        // pooled connection would see a different, empty database.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| QuickdocsError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute a translation and fetch all rows.
    pub async fn fetch_all(&self, translation: &Translation) -> QuickdocsResult<Vec<ResultRow>> {
        tracing::debug!(sql = %translation.sql, params = translation.params.len(), "executing query");

        let mut query = sqlx::query(&translation.sql);
        for param in &translation.params {
            query = query.bind(param.as_str());
        }

        let rows: Vec<SqliteRow> = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| QuickdocsError::Execution(e.to_string()))?;

        Ok(rows.iter().map(row_to_map).collect())
    }
}

/// Convert a SQLite row to a map of JSON values.
fn row_to_map(row: &SqliteRow) -> ResultRow {
    let mut map = HashMap::new();

    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name().to_string();

        let value: serde_json::Value = match column.type_info().name() {
            "BOOLEAN" => row
                .try_get::<bool, _>(i)
                .map(serde_json::Value::Bool)
                .unwrap_or(serde_json::Value::Null),
            "INTEGER" | "INT4" | "INT8" => row
                .try_get::<i64, _>(i)
                .map(|v| serde_json::Value::Number(v.into()))
                .unwrap_or(serde_json::Value::Null),
            "REAL" => row
                .try_get::<f64, _>(i)
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            // TEXT, DATETIME, and expression columns whose declared type is
            // unknown; fall through the decoders until one fits.
            _ => decode_dynamic(row, i),
        };

        map.insert(name, value);
    }

    map
}

fn decode_dynamic(row: &SqliteRow, i: usize) -> serde_json::Value {
    if let Ok(v) = row.try_get::<String, _>(i) {
        return serde_json::Value::String(v);
    }
    if let Ok(v) = row.try_get::<i64, _>(i) {
        return serde_json::Value::Number(v.into());
    }
    if let Ok(v) = row.try_get::<f64, _>(i) {
        if let Some(n) = serde_json::Number::from_f64(v) {
            return serde_json::Value::Number(n);
        }
    }
    serde_json::Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ensure_schema, seed_if_empty};
    use crate::translator::translate;

    async fn seeded_db() -> Db {
        let db = Db::connect("sqlite::memory:").await.unwrap();
        ensure_schema(db.pool()).await.unwrap();
        assert!(seed_if_empty(db.pool()).await.unwrap());
        db
    }

    #[tokio::test]
    async fn test_fixed_query_end_to_end() {
        let db = seeded_db().await;
        let t = translate("show all customers").unwrap();
        let rows = db.fetch_all(&t).await.unwrap();
        assert!(!rows.is_empty());
        let first = &rows[0];
        assert!(first.contains_key("name"));
        assert!(first.contains_key("email"));
    }

    #[tokio::test]
    async fn test_templated_query_binds_name() {
        let db = seeded_db().await;
        let t = translate("how many documents has Jane Doe submitted?").unwrap();
        let rows = db.fetch_all(&t).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("customer_name"),
            Some(&serde_json::Value::String("Jane Doe".to_string()))
        );
        // COUNT comes back as a number even though the column is computed.
        assert!(rows[0].get("documents_submitted").unwrap().is_number());
    }

    #[tokio::test]
    async fn test_every_catalog_entry_runs_against_schema() {
        let db = seeded_db().await;
        let questions = [
            "show all customers",
            "list all pending processes",
            "how many documents has Jane Doe submitted?",
            "which process has the most documents?",
            "customers in Onboarding",
            "show completed processes",
            "show all processes",
            "list document types",
            "recent documents",
        ];
        for question in questions {
            let t = translate(question).unwrap_or_else(|| panic!("no rule for {question:?}"));
            db.fetch_all(&t)
                .await
                .unwrap_or_else(|e| panic!("{question:?} failed: {e}"));
        }
    }

    #[tokio::test]
    async fn test_execution_error_is_reported() {
        let db = seeded_db().await;
        let bad = Translation {
            sql: "SELECT * FROM nowhere".to_string(),
            params: Vec::new(),
        };
        let err = db.fetch_all(&bad).await.unwrap_err();
        assert!(matches!(err, QuickdocsError::Execution(_)));
    }
}
