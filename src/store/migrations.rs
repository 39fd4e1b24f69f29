//! Schema versions for the key-value table.
//!
//! `_schema_versions` records every applied step; only steps newer than the
//! highest recorded one run.

use libsql::Connection;
use tracing::info;

use crate::error::StorageError;

struct SchemaStep {
    version: i64,
    label: &'static str,
    ddl: &'static str,
}

const SCHEMA: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        label: "kv_store",
        ddl: "CREATE TABLE IF NOT EXISTS kv_store (
                  key TEXT PRIMARY KEY,
                  value TEXT NOT NULL,
                  updated_at TEXT NOT NULL DEFAULT (datetime('now'))
              );",
    },
    SchemaStep {
        version: 2,
        label: "kv_store_updated_index",
        ddl: "CREATE INDEX IF NOT EXISTS idx_kv_store_updated ON kv_store(updated_at);",
    },
];

fn failed(context: &str, e: impl std::fmt::Display) -> StorageError {
    StorageError::Migration(format!("{context}: {e}"))
}

/// Bring the schema up to date. Safe to call on every open.
pub async fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _schema_versions (
             version INTEGER PRIMARY KEY,
             label TEXT NOT NULL,
             applied_at TEXT NOT NULL DEFAULT (datetime('now'))
         )",
        (),
    )
    .await
    .map_err(|e| failed("creating _schema_versions", e))?;

    let applied = schema_version(conn).await?;
    for step in SCHEMA.iter().filter(|s| s.version > applied) {
        info!(version = step.version, label = step.label, "Upgrading progress schema");
        conn.execute_batch(step.ddl)
            .await
            .map_err(|e| failed(&format!("schema step V{} ({})", step.version, step.label), e))?;
        conn.execute(
            "INSERT OR IGNORE INTO _schema_versions (version, label) VALUES (?1, ?2)",
            libsql::params![step.version, step.label],
        )
        .await
        .map_err(|e| failed(&format!("recording V{}", step.version), e))?;
    }
    Ok(())
}

/// Highest applied schema version; 0 on a fresh database.
async fn schema_version(conn: &Connection) -> Result<i64, StorageError> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _schema_versions", ())
        .await
        .map_err(|e| failed("reading schema version", e))?;
    match rows.next().await.map_err(|e| failed("reading schema version", e))? {
        Some(row) => row.get::<i64>(0).map_err(|e| failed("decoding schema version", e)),
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fresh_conn() -> Connection {
        libsql::Builder::new_local(":memory:")
            .build()
            .await
            .unwrap()
            .connect()
            .unwrap()
    }

    #[tokio::test]
    async fn creates_kv_table() {
        let conn = fresh_conn().await;
        run_migrations(&conn).await.unwrap();

        let mut rows = conn
            .query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'", ())
            .await
            .unwrap();
        assert!(rows.next().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rerun_is_a_noop() {
        let conn = fresh_conn().await;
        run_migrations(&conn).await.unwrap();
        conn.execute("INSERT INTO kv_store (key, value) VALUES ('k', 'v')", ())
            .await
            .unwrap();
        run_migrations(&conn).await.unwrap();

        assert_eq!(schema_version(&conn).await.unwrap(), 2);
        let mut rows = conn.query("SELECT value FROM kv_store WHERE key = 'k'", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "v");
    }

    #[tokio::test]
    async fn records_each_step() {
        let conn = fresh_conn().await;
        run_migrations(&conn).await.unwrap();

        let mut rows = conn
            .query("SELECT label FROM _schema_versions ORDER BY version", ())
            .await
            .unwrap();
        let mut labels = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            labels.push(row.get::<String>(0).unwrap());
        }
        assert_eq!(labels, vec!["kv_store", "kv_store_updated_index"]);
    }
}
