//! INSERT statements.
//!
//! ```rust
//! use oxide_query::builder::{col, Expressible, OnConflict, Table};
//!
//! let users = Table::new("users");
//! let email = col::<String>("email");
//! let age = col::<Option<i64>>("age");
//!
//! let (sql, params) = users
//!     .insert_or(OnConflict::Replace, &[email.set("alice@example.com"), age.set(30)])
//!     .build();
//!
//! assert_eq!(sql, "INSERT OR REPLACE INTO \"users\" (\"email\", \"age\") VALUES (?, ?)");
//! assert_eq!(params.len(), 2);
//! ```

use super::expr::{join, wrap, Expressible, Expression, Operand};
use super::query::Table;
use super::value::SqlType;

/// Conflict resolution for `INSERT OR <resolution>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    /// `OR REPLACE`.
    Replace,
    /// `OR ROLLBACK`.
    Rollback,
    /// `OR ABORT`.
    Abort,
    /// `OR FAIL`.
    Fail,
    /// `OR IGNORE`.
    Ignore,
}

impl OnConflict {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "REPLACE",
            Self::Rollback => "ROLLBACK",
            Self::Abort => "ABORT",
            Self::Fail => "FAIL",
            Self::Ignore => "IGNORE",
        }
    }
}

/// A column assignment, used by INSERT and UPDATE.
#[derive(Debug, Clone)]
pub struct Setter {
    column: Expression,
    value: Expression,
}

impl Setter {
    /// Returns the assigned column.
    #[must_use]
    pub const fn column(&self) -> &Expression {
        &self.column
    }

    /// Returns the assigned value.
    #[must_use]
    pub const fn value(&self) -> &Expression {
        &self.value
    }

    pub(crate) fn assignment(&self) -> Expression {
        join(" = ", [self.column.clone(), self.value.clone()])
    }
}

impl<T: SqlType> Expression<T> {
    /// Assigns `value` to this column.
    #[must_use]
    pub fn set(&self, value: impl Operand<T>) -> Setter {
        Setter {
            column: self.clone().untyped(),
            value: value.into_operand(),
        }
    }
}

/// A compiled INSERT statement. Running it yields the last inserted rowid.
#[derive(Debug, Clone)]
pub struct Insert {
    expression: Expression,
}

impl Expressible for Insert {
    fn expression(&self) -> Expression {
        self.expression.clone()
    }
}

impl Table {
    /// `INSERT INTO t (cols) VALUES (vals)`, columns in setter order.
    ///
    /// With no setters, `INSERT INTO t DEFAULT VALUES`.
    #[must_use]
    pub fn insert(&self, values: &[Setter]) -> Insert {
        self.compile_insert(None, values)
    }

    /// `INSERT OR <resolution> INTO ...`.
    #[must_use]
    pub fn insert_or(&self, on_conflict: OnConflict, values: &[Setter]) -> Insert {
        self.compile_insert(Some(on_conflict), values)
    }

    /// `INSERT INTO t DEFAULT VALUES`.
    #[must_use]
    pub fn insert_default(&self) -> Insert {
        self.compile_insert(None, &[])
    }

    fn compile_insert(&self, on_conflict: Option<OnConflict>, values: &[Setter]) -> Insert {
        let mut clauses = vec![Expression::literal("INSERT")];
        if let Some(on_conflict) = on_conflict {
            clauses.push(Expression::literal(format!("OR {}", on_conflict.as_str())));
        }
        clauses.push(Expression::literal("INTO"));
        clauses.push(self.table_name(false));

        if values.is_empty() {
            clauses.push(Expression::literal("DEFAULT VALUES"));
        } else {
            let columns = join(", ", values.iter().map(|setter| setter.column.clone()));
            let bound = join(", ", values.iter().map(|setter| setter.value.clone()));
            clauses.push(wrap("", columns));
            clauses.push(Expression::literal("VALUES"));
            clauses.push(wrap("", bound));
            clauses.extend(self.where_clause_sql());
        }

        Insert {
            expression: join(" ", clauses),
        }
    }
}
