//! Execution against a database connection.
//!
//! The core never talks to a database directly. A driver implements
//! [`Connection`] and [`Statement`]; [`ConnectionExt`] then runs compiled
//! statements and decodes rows through it.

mod columns;
mod row;

use std::sync::Arc;

use tracing::debug;

use crate::builder::{
    Delete, Exists, Expressible, Insert, LimitClause, ScalarQuery, SqlType, SqlValue, Table,
    Update, Value,
};
use crate::error::Result;

pub use columns::{resolve_columns, ColumnMap};
pub use row::Row;

/// A prepared statement with its parameters bound.
pub trait Statement {
    /// Returns the names of the result columns, unquoted.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot describe the statement.
    fn column_names(&self) -> Result<Vec<String>>;

    /// Advances to the next row, returning its values.
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails.
    fn step(&mut self) -> Result<Option<Vec<SqlValue>>>;

    /// Returns the first column of the first row, `Null` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails.
    fn scalar(&mut self) -> Result<SqlValue> {
        Ok(self
            .step()?
            .and_then(|values| values.into_iter().next())
            .unwrap_or(SqlValue::Null))
    }
}

/// Outcome of a statement run for its side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteResult {
    /// Rowid of the most recent successful INSERT on the connection.
    pub last_insert_rowid: i64,
    /// Rows changed by this statement.
    pub changes: u64,
}

/// A database connection able to prepare and execute SQL.
pub trait Connection {
    /// Prepares `sql` with positional `bindings`.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed SQL or a failed connection.
    fn prepare(&self, sql: &str, bindings: &[SqlValue]) -> Result<Box<dyn Statement + '_>>;

    /// Runs `sql` with positional `bindings` for its side effects.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed SQL, constraint violations or a failed
    /// connection.
    fn execute(&self, sql: &str, bindings: &[SqlValue]) -> Result<ExecuteResult>;
}

/// A statement run for its side effects, with a typed result.
pub trait Execute: Expressible {
    /// What running the statement yields.
    type Output;

    /// Extracts the output from the execution result.
    fn output(result: &ExecuteResult) -> Self::Output;
}

impl Execute for Insert {
    type Output = i64;

    fn output(result: &ExecuteResult) -> i64 {
        result.last_insert_rowid
    }
}

impl Execute for Update {
    type Output = u64;

    fn output(result: &ExecuteResult) -> u64 {
        result.changes
    }
}

impl Execute for Delete {
    type Output = u64;

    fn output(result: &ExecuteResult) -> u64 {
        result.changes
    }
}

/// Forward-only iterator over decoded rows.
pub struct Rows<'c> {
    statement: Box<dyn Statement + 'c>,
    columns: Arc<ColumnMap>,
}

impl Rows<'_> {
    /// Returns the column map shared by every row.
    #[must_use]
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }
}

impl Iterator for Rows<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.statement.step() {
            Ok(Some(values)) => Some(Ok(Row::new(Arc::clone(&self.columns), values))),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Typed execution helpers, available on every [`Connection`].
///
/// ```rust,ignore
/// let users = Table::new("users");
/// let id = col::<i64>("id");
/// let email = col::<String>("email");
///
/// let rowid = conn.run(&users.insert(&[email.set("alice@example.com")]))?;
/// for row in conn.prepare_rows(&users.filter(id.eq(rowid)))? {
///     println!("{}", row?.get(&email)?);
/// }
/// ```
pub trait ConnectionExt: Connection {
    /// Prepares a SELECT and resolves its column names.
    ///
    /// # Errors
    ///
    /// Returns connection errors and [`QueryError::NoSuchTable`](crate::QueryError::NoSuchTable)
    /// from wildcard resolution.
    fn prepare_rows(&self, query: &Table) -> Result<Rows<'_>> {
        let (sql, bindings) = query.build();
        debug!(sql = %sql, "Preparing query");
        let statement = self.prepare(&sql, &bindings)?;
        let columns = resolve_columns(self, query)?;
        Ok(Rows {
            statement,
            columns: Arc::new(columns),
        })
    }

    /// Returns the first row of `query`, keeping its offset.
    ///
    /// # Errors
    ///
    /// See [`ConnectionExt::prepare_rows`].
    fn pluck(&self, query: &Table) -> Result<Option<Row>> {
        let offset = query.clauses().limit().and_then(LimitClause::offset);
        let first = offset.map_or_else(|| query.limit(1), |offset| query.limit_offset(1, offset));
        self.prepare_rows(&first)?.next().transpose()
    }

    /// Runs a single-column query and decodes its first value.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnexpectedNullValue`](crate::QueryError::UnexpectedNullValue)
    /// when `T` is not optional and the result is NULL, and connection errors.
    fn scalar<T: SqlType>(&self, query: &ScalarQuery<T>) -> Result<T> {
        let (sql, bindings) = query.build();
        debug!(sql = %sql, "Executing scalar query");
        let value = self.prepare(&sql, &bindings)?.scalar()?;
        let decoded = <T::Value as Value>::from_sql_value(&value);
        let name = query
            .query()
            .clauses()
            .select()
            .columns()
            .first()
            .map_or(sql.as_str(), |column| column.template());
        Ok(T::from_optional(decoded, name)?)
    }

    /// Runs `SELECT EXISTS(...)`.
    ///
    /// # Errors
    ///
    /// Returns connection errors.
    fn exists(&self, query: &Exists) -> Result<bool> {
        let (sql, bindings) = query.build();
        debug!(sql = %sql, "Executing exists query");
        let value = self.prepare(&sql, &bindings)?.scalar()?;
        Ok(bool::from_sql_value(&value).unwrap_or(false))
    }

    /// Runs an INSERT (returning the rowid), UPDATE or DELETE (returning the
    /// number of changed rows).
    ///
    /// # Errors
    ///
    /// Returns connection errors.
    fn run<S: Execute>(&self, statement: &S) -> Result<S::Output> {
        let (sql, bindings) = statement.build();
        debug!(sql = %sql, "Executing SQL");
        let result = self.execute(&sql, &bindings)?;
        Ok(S::output(&result))
    }
}

impl<C: Connection + ?Sized> ConnectionExt for C {}
