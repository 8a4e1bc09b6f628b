//! Embedded SQLite adapter.
//!
//! Uses `rusqlite` for the engine and `tokio-rusqlite` to run every call on the
//! connection's dedicated thread. That thread serializes access, so concurrent
//! callers share one session and writers queue behind SQLite's own lock.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::params_from_iter;
use tokio_rusqlite::Connection;

use userbase_core::storage::{
    AdapterKind, Expect, ExecutionResult, MutationOutcome, Result, Row, RowSet, Statement,
    StorageEngine, StorageError, Value,
};

use super::conversions::{row_to_map, to_sql_value};
use super::error::{map_prepare_error, map_tokio_rusqlite_error};

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Whether `sql` is an INSERT or REPLACE, the only statements that set a row id.
///
/// `last_insert_rowid()` keeps the value of the last successful insert on the
/// session, so anything else would report a stale id.
fn inserts_rows(sql: &str) -> bool {
    let head: String = sql
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    head.eq_ignore_ascii_case("insert") || head.eq_ignore_ascii_case("replace")
}

/// Row id of the statement that just ran, if it inserted anything.
fn inserted_row_id(conn: &rusqlite::Connection, sql: &str, changes: u64) -> Option<i64> {
    (changes > 0 && inserts_rows(sql)).then(|| conn.last_insert_rowid())
}

/// SQLite-based adapter over a single file-backed (or in-memory) session.
pub struct SqliteAdapter {
    conn: Connection,
    location: String,
}

impl SqliteAdapter {
    /// Opens the database file, creating it and its directory if needed.
    ///
    /// Write-ahead logging and foreign-key enforcement are enabled before the
    /// adapter is handed out.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                StorageError::connection(format!(
                    "Cannot create database directory {}: {e}",
                    dir.display()
                ))
            })?;
        }

        let conn = Connection::open(&path)
            .await
            .map_err(map_tokio_rusqlite_error)?;

        Self::configure(conn, path.display().to_string()).await
    }

    /// Opens a private in-memory database.
    ///
    /// Useful for testing - data is lost when the adapter is dropped.
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(map_tokio_rusqlite_error)?;

        Self::configure(conn, ":memory:".to_string()).await
    }

    /// Apply session-wide pragmas.
    async fn configure(conn: Connection, location: String) -> Result<Self> {
        let journal_mode = conn
            .call(|conn| {
                let mode: String = conn
                    .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                    .map_err(wrap_err)?;
                conn.pragma_update(None, "foreign_keys", "ON")
                    .map_err(wrap_err)?;
                Ok(mode)
            })
            .await
            .map_err(map_tokio_rusqlite_error)?;

        tracing::debug!(%location, %journal_mode, "Opened SQLite database");

        Ok(Self { conn, location })
    }

    /// Where the database lives (`:memory:` for in-memory stores).
    pub fn location(&self) -> &str {
        &self.location
    }
}

#[async_trait]
impl StorageEngine for SqliteAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Embedded
    }

    async fn parse(&self, sql: &str) -> Result<Statement> {
        let statement = Statement::new(sql)?;
        let text = statement.sql().to_string();

        self.conn
            .call(move |conn| {
                conn.prepare_cached(&text).map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_prepare_error)?;

        Ok(statement)
    }

    async fn execute(
        &self,
        statement: &Statement,
        params: &[Value],
        expect: Expect,
    ) -> Result<ExecutionResult> {
        let sql = statement.sql().to_string();
        let values: Vec<rusqlite::types::Value> = params.iter().map(to_sql_value).collect();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare_cached(&sql).map_err(wrap_err)?;
                let columns: Vec<String> = stmt
                    .column_names()
                    .into_iter()
                    .map(String::from)
                    .collect();

                match expect {
                    Expect::First => {
                        let mut rows = stmt.query(params_from_iter(values)).map_err(wrap_err)?;
                        let row = match rows.next().map_err(wrap_err)? {
                            Some(row) => Some(row_to_map(&columns, row).map_err(wrap_err)?),
                            None => None,
                        };
                        Ok(ExecutionResult::Row(row))
                    }
                    Expect::All => {
                        let rows = stmt
                            .query_map(params_from_iter(values), |row| row_to_map(&columns, row))
                            .map_err(wrap_err)?;

                        let mut results: Vec<Row> = Vec::new();
                        for row_result in rows {
                            results.push(row_result.map_err(wrap_err)?);
                        }
                        Ok(ExecutionResult::Rows(RowSet { results }))
                    }
                    Expect::Run if columns.is_empty() => {
                        let changes =
                            stmt.execute(params_from_iter(values)).map_err(wrap_err)? as u64;
                        Ok(ExecutionResult::Mutation(MutationOutcome::completed(
                            inserted_row_id(conn, &sql, changes),
                            changes,
                        )))
                    }
                    Expect::Run => {
                        // `execute` refuses statements that yield rows; step through them instead.
                        {
                            let mut rows = stmt.query(params_from_iter(values)).map_err(wrap_err)?;
                            while rows.next().map_err(wrap_err)?.is_some() {}
                        }
                        let changes = if stmt.readonly() { 0 } else { conn.changes() as u64 };
                        Ok(ExecutionResult::Mutation(MutationOutcome::completed(
                            inserted_row_id(conn, &sql, changes),
                            changes,
                        )))
                    }
                }
            })
            .await
            .map_err(|e| {
                let err = map_tokio_rusqlite_error(e);
                tracing::debug!(error = %err, "SQLite statement failed");
                err
            })
    }
}
