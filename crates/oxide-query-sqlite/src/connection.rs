//! A blocking [`Connection`] over a single `sqlx` SQLite connection.

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use oxide_query::builder::SqlValue;
use oxide_query::{Connection, ExecuteResult, Statement};
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteRow};
use sqlx::{Column, ConnectOptions, Row, Sqlite, TypeInfo, ValueRef};
use tokio::runtime::Runtime;
use tracing::{debug, trace};

use crate::config::ConnectionConfig;
use crate::error::{Result, SqliteError};

type Query<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// A SQLite database connection.
///
/// Drives `sqlx` on a private current-thread runtime, so every method blocks.
/// Do not call it from inside another tokio runtime.
pub struct SqliteConnection {
    runtime: Runtime,
    conn: Mutex<sqlx::SqliteConnection>,
}

impl SqliteConnection {
    /// Opens a connection with the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid URL or a database that can't be opened.
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(config.foreign_keys)
            .busy_timeout(config.busy_timeout());
        let conn = runtime.block_on(options.connect())?;
        debug!(url = %config.url, "Opened SQLite connection");
        Ok(Self {
            runtime,
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime or database can't be started.
    pub fn in_memory() -> Result<Self> {
        Self::open(&ConnectionConfig::default())
    }

    fn lock(&self) -> Result<MutexGuard<'_, sqlx::SqliteConnection>> {
        self.conn.lock().map_err(|_| SqliteError::Poisoned)
    }

    fn describe(&self, sql: &str) -> Result<Vec<String>> {
        let statement = {
            let mut conn = self.lock()?;
            self.runtime
                .block_on(sqlx::Executor::prepare(&mut *conn, sql))?
        };
        Ok(sqlx::Statement::columns(&statement)
            .iter()
            .map(|column| String::from(column.name()))
            .collect())
    }

    fn fetch(&self, sql: &str, bindings: &[SqlValue]) -> Result<VecDeque<Vec<SqlValue>>> {
        let rows = {
            let mut conn = self.lock()?;
            self.runtime
                .block_on(bind_all(sqlx::query(sql), bindings).fetch_all(&mut *conn))?
        };
        rows.iter().map(decode_row).collect()
    }
}

impl Connection for SqliteConnection {
    fn prepare(
        &self,
        sql: &str,
        bindings: &[SqlValue],
    ) -> oxide_query::Result<Box<dyn Statement + '_>> {
        let columns = self.describe(sql)?;
        trace!(sql = %sql, columns = ?columns, "Prepared statement");
        Ok(Box::new(SqliteStatement {
            conn: self,
            sql: String::from(sql),
            bindings: bindings.to_vec(),
            columns,
            rows: None,
        }))
    }

    fn execute(&self, sql: &str, bindings: &[SqlValue]) -> oxide_query::Result<ExecuteResult> {
        let result = {
            let mut conn = self.lock()?;
            self.runtime
                .block_on(bind_all(sqlx::query(sql), bindings).execute(&mut *conn))
                .map_err(SqliteError::from)?
        };
        Ok(ExecuteResult {
            last_insert_rowid: result.last_insert_rowid(),
            changes: result.rows_affected(),
        })
    }
}

/// A described statement.
///
/// The first [`Statement::step`] runs the query and buffers every result row,
/// so memory grows with the result size; bound large reads with `LIMIT`.
/// The connection lock is released between steps, and each step hands out
/// one buffered row.
struct SqliteStatement<'c> {
    conn: &'c SqliteConnection,
    sql: String,
    bindings: Vec<SqlValue>,
    columns: Vec<String>,
    rows: Option<VecDeque<Vec<SqlValue>>>,
}

impl Statement for SqliteStatement<'_> {
    fn column_names(&self) -> oxide_query::Result<Vec<String>> {
        Ok(self.columns.clone())
    }

    fn step(&mut self) -> oxide_query::Result<Option<Vec<SqlValue>>> {
        if self.rows.is_none() {
            self.rows = Some(self.conn.fetch(&self.sql, &self.bindings)?);
        }
        Ok(self.rows.as_mut().and_then(VecDeque::pop_front))
    }
}

fn bind_all<'q>(query: Query<'q>, bindings: &[SqlValue]) -> Query<'q> {
    bindings.iter().cloned().fold(query, bind_param)
}

/// Binds a SqlValue parameter to a query.
fn bind_param(query: Query<'_>, value: SqlValue) -> Query<'_> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Int(n) => query.bind(n),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}

/// Reads every column by its storage class.
fn decode_row(row: &SqliteRow) -> Result<Vec<SqlValue>> {
    (0..row.len())
        .map(|index| -> Result<SqlValue> {
            let raw = row.try_get_raw(index)?;
            if raw.is_null() {
                return Ok(SqlValue::Null);
            }
            let value = match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get_unchecked(index)?),
                "REAL" => SqlValue::Float(row.try_get_unchecked(index)?),
                "BLOB" => SqlValue::Blob(row.try_get_unchecked(index)?),
                _ => SqlValue::Text(row.try_get_unchecked(index)?),
            };
            Ok(value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_round_trip() {
        let conn = SqliteConnection::in_memory().unwrap();
        conn.execute("CREATE TABLE t (a INTEGER, b TEXT, c REAL, d BLOB)", &[])
            .unwrap();
        let result = conn
            .execute(
                "INSERT INTO t (a, b, c, d) VALUES (?, ?, ?, ?)",
                &[
                    SqlValue::Int(7),
                    SqlValue::Text(String::from("seven")),
                    SqlValue::Float(7.5),
                    SqlValue::Blob(vec![0xCA, 0xFE]),
                ],
            )
            .unwrap();
        assert_eq!(result.last_insert_rowid, 1);
        assert_eq!(result.changes, 1);

        let mut statement = conn.prepare("SELECT a, b, c, d FROM t", &[]).unwrap();
        assert_eq!(statement.column_names().unwrap(), vec!["a", "b", "c", "d"]);
        assert_eq!(
            statement.step().unwrap(),
            Some(vec![
                SqlValue::Int(7),
                SqlValue::Text(String::from("seven")),
                SqlValue::Float(7.5),
                SqlValue::Blob(vec![0xCA, 0xFE]),
            ])
        );
        assert_eq!(statement.step().unwrap(), None);
    }

    #[test]
    fn test_null_binding_and_decoding() {
        let conn = SqliteConnection::in_memory().unwrap();
        let mut statement = conn.prepare("SELECT ?", &[SqlValue::Null]).unwrap();
        assert_eq!(statement.scalar().unwrap(), SqlValue::Null);
    }

    #[test]
    fn test_prepare_does_not_fetch() {
        let conn = SqliteConnection::in_memory().unwrap();
        conn.execute("CREATE TABLE t (a INTEGER)", &[]).unwrap();
        let statement = conn.prepare("SELECT * FROM t", &[]).unwrap();
        assert_eq!(statement.column_names().unwrap(), vec!["a"]);

        // The lock is free while a statement is pending.
        conn.execute("INSERT INTO t (a) VALUES (1)", &[]).unwrap();
        let mut statement = statement;
        assert_eq!(statement.step().unwrap(), Some(vec![SqlValue::Int(1)]));
    }

    #[test]
    fn test_rows_buffered_on_first_step() {
        let conn = SqliteConnection::in_memory().unwrap();
        conn.execute("CREATE TABLE t (a INTEGER)", &[]).unwrap();
        conn.execute("INSERT INTO t (a) VALUES (1), (2)", &[]).unwrap();

        let mut statement = conn.prepare("SELECT a FROM t ORDER BY a", &[]).unwrap();
        assert_eq!(statement.step().unwrap(), Some(vec![SqlValue::Int(1)]));

        // Writes between steps go through and don't change the buffered rows.
        conn.execute("INSERT INTO t (a) VALUES (0)", &[]).unwrap();
        assert_eq!(statement.step().unwrap(), Some(vec![SqlValue::Int(2)]));
        assert_eq!(statement.step().unwrap(), None);
        assert_eq!(statement.step().unwrap(), None);
    }

    #[test]
    fn test_malformed_sql_is_a_connection_error() {
        let conn = SqliteConnection::in_memory().unwrap();
        let err = conn.prepare("SELEC nonsense", &[]).map(|_| ()).unwrap_err();
        assert!(matches!(err, oxide_query::Error::Connection(_)));
    }
}
