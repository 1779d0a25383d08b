//! Aggregate functions and named function calls.

use super::expr::{quote, wrap, Expressible, Expression};
use super::value::{Numeric, SqlType};

impl<T: SqlType> Expression<T> {
    /// `DISTINCT expr`, for use inside an aggregate.
    #[must_use]
    pub fn distinct(&self) -> Self {
        Self::new(format!("DISTINCT {}", self.template()), self.bindings().to_vec())
    }

    /// `count(expr)`.
    #[must_use]
    pub fn count(&self) -> Expression<i64> {
        wrap("count", self.clone().untyped())
    }

    /// `max(expr)`, NULL over an empty set.
    #[must_use]
    pub fn max(&self) -> Expression<T::Optional> {
        wrap("max", self.clone().untyped())
    }

    /// `min(expr)`, NULL over an empty set.
    #[must_use]
    pub fn min(&self) -> Expression<T::Optional> {
        wrap("min", self.clone().untyped())
    }
}

impl<T> Expression<T>
where
    T: SqlType,
    T::Value: Numeric,
{
    /// `avg(expr)`, always REAL, NULL over an empty set.
    #[must_use]
    pub fn average(&self) -> Expression<Option<f64>> {
        wrap("avg", self.clone().untyped())
    }

    /// `sum(expr)`, NULL over an empty set.
    #[must_use]
    pub fn sum(&self) -> Expression<T::Optional> {
        wrap("sum", self.clone().untyped())
    }

    /// `total(expr)`, `0.0` over an empty set.
    #[must_use]
    pub fn total(&self) -> Expression<f64> {
        wrap("total", self.clone().untyped())
    }
}

/// `count(*)`.
#[must_use]
pub fn count_all() -> Expression<i64> {
    Expression::literal("count(*)")
}

/// Calls a function registered on the connection: `"name"(args...)`.
///
/// ```rust
/// use oxide_query::builder::{call, col};
///
/// let reversed = call::<String>("reverse", &[&col::<String>("name")]);
/// assert_eq!(reversed.template(), "\"reverse\"(\"name\")");
/// ```
#[must_use]
pub fn call<T>(name: &str, arguments: &[&dyn Expressible]) -> Expression<T> {
    wrap(&quote(name), super::expr::comma_list(arguments))
}
