//! Single-value SELECT statements.

use std::fmt;
use std::marker::PhantomData;

use super::expr::{join, wrap, Expressible, Expression};
use super::query::Table;
use super::value::SqlType;

/// A query selecting exactly one typed column, e.g. `SELECT max("age") ...`.
///
/// Produced by [`Table::select_scalar`] and [`Table::count`].
pub struct ScalarQuery<T> {
    query: Table,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for ScalarQuery<T> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ScalarQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScalarQuery").field(&self.query).finish()
    }
}

impl<T: SqlType> ScalarQuery<T> {
    pub(crate) const fn new(query: Table) -> Self {
        Self {
            query,
            _type: PhantomData,
        }
    }

    /// Returns the underlying query.
    #[must_use]
    pub const fn query(&self) -> &Table {
        &self.query
    }
}

impl<T> Expressible for ScalarQuery<T> {
    fn expression(&self) -> Expression {
        self.query.expression()
    }
}

/// `SELECT EXISTS(<query>)`, evaluating to a boolean.
#[derive(Debug, Clone)]
pub struct Exists {
    expression: Expression<bool>,
}

impl Exists {
    pub(crate) fn new(query: &Table) -> Self {
        Self {
            expression: join(
                " ",
                [
                    Expression::literal("SELECT"),
                    wrap("EXISTS", query.expression()),
                ],
            )
            .retag(),
        }
    }
}

impl Expressible for Exists {
    fn expression(&self) -> Expression {
        self.expression.clone().untyped()
    }
}
