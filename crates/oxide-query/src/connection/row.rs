//! Decoded result rows.

use std::sync::Arc;

use super::columns::ColumnMap;
use crate::builder::{quote, Expression, SqlType, SqlValue, Value};
use crate::error::QueryError;

/// One result row: raw values addressed through the statement's column map.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<ColumnMap>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row over a shared column map.
    #[must_use]
    pub const fn new(columns: Arc<ColumnMap>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Reads a column, failing on NULL for non-optional tags.
    ///
    /// ```rust
    /// use std::sync::Arc;
    ///
    /// use oxide_query::builder::{col, SqlValue};
    /// use oxide_query::{ColumnMap, QueryError, Row};
    ///
    /// let columns: ColumnMap = [("\"email\"", 0), ("\"age\"", 1)].into_iter().collect();
    /// let row = Row::new(
    ///     Arc::new(columns),
    ///     vec![SqlValue::Text(String::from("alice@example.com")), SqlValue::Null],
    /// );
    ///
    /// assert_eq!(row.get(&col::<String>("email")).unwrap(), "alice@example.com");
    /// assert_eq!(row.get(&col::<Option<i64>>("age")).unwrap(), None);
    /// assert!(matches!(
    ///     row.get(&col::<i64>("age")),
    ///     Err(QueryError::UnexpectedNullValue { .. })
    /// ));
    /// ```
    ///
    /// # Errors
    ///
    /// See [`Row::get_optional`]; additionally
    /// [`QueryError::UnexpectedNullValue`] when `T` is not optional and the
    /// value is NULL or of another storage class.
    pub fn get<T: SqlType>(&self, column: &Expression<T>) -> Result<T, QueryError> {
        let value = self.get_optional(column)?;
        T::from_optional(value, column.template())
    }

    /// Reads a column as an optional value.
    ///
    /// The column's template is looked up exactly first. Failing that, a
    /// single name ending with `.<template>` is used, so `"id"` finds
    /// `"users"."id"` when no other table contributes an `id`.
    ///
    /// # Errors
    ///
    /// [`QueryError::NoSuchColumn`] when nothing matches and
    /// [`QueryError::AmbiguousColumn`] when several qualified names do.
    pub fn get_optional<T: SqlType>(
        &self,
        column: &Expression<T>,
    ) -> Result<Option<T::Value>, QueryError> {
        let index = self.index_of(column.template())?;
        Ok(self
            .values
            .get(index)
            .and_then(<T::Value as Value>::from_sql_value))
    }

    /// Reads a column known to be present and well-typed.
    ///
    /// # Panics
    ///
    /// Panics on any error [`Row::get`] would return.
    #[must_use]
    pub fn value<T: SqlType>(&self, column: &Expression<T>) -> T {
        match self.get(column) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns `true` if the column `name` (unquoted) is present and not NULL.
    #[must_use]
    pub fn has_value(&self, name: &str) -> bool {
        self.columns
            .get(&quote(name))
            .and_then(|index| self.values.get(index))
            .is_some_and(|value| !value.is_null())
    }

    /// Returns the raw value at `index`.
    #[must_use]
    pub fn raw(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Returns every raw value, in column order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Returns the column map shared by the statement's rows.
    #[must_use]
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Returns the number of values.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a row without values.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn index_of(&self, template: &str) -> Result<usize, QueryError> {
        if let Some(index) = self.columns.get(template) {
            return Ok(index);
        }

        let similar = self.columns.similar(template);
        match similar.as_slice() {
            [] => Err(QueryError::NoSuchColumn {
                name: String::from(template),
                columns: self.columns.names(),
            }),
            [name] => self.columns.get(name).ok_or_else(|| QueryError::NoSuchColumn {
                name: String::from(template),
                columns: self.columns.names(),
            }),
            _ => Err(QueryError::AmbiguousColumn {
                name: String::from(template),
                similar,
            }),
        }
    }
}
