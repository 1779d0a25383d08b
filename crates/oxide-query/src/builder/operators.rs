//! Comparison, logic, range and arithmetic operators.
//!
//! Binary operators render as parenthesized infix (`("a" + ?)`), unary ones
//! as a prefix wrapped around the operand (`NOT (..)`, `-(..)`, `~(..)`).
//! Comparing against `NULL` renders `IS NULL` / `IS NOT NULL`.

use std::ops::{
    Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Range, RangeFrom, RangeInclusive, RangeTo,
    RangeToInclusive, Rem, Shl, Shr, Sub,
};

use super::expr::{infix, join, wrap, Expression, Operand};
use super::value::{Integer, Invertible, Numeric, SqlType, SqlValue, Value};

impl<T: SqlType> Expression<T> {
    fn compare(&self, op: &str, rhs: Expression) -> Expression<T::Predicate> {
        infix(op, self.clone().untyped(), rhs, true)
    }

    /// `(lhs = rhs)`, or `(lhs IS NULL)` when `rhs` is `None`.
    #[must_use]
    pub fn eq(&self, rhs: impl Operand<T>) -> Expression<T::Predicate> {
        let rhs = rhs.into_operand();
        if rhs.is_null_literal() {
            self.compare("IS", rhs)
        } else {
            self.compare("=", rhs)
        }
    }

    /// `(lhs != rhs)`, or `(lhs IS NOT NULL)` when `rhs` is `None`.
    #[must_use]
    pub fn not_eq(&self, rhs: impl Operand<T>) -> Expression<T::Predicate> {
        let rhs = rhs.into_operand();
        if rhs.is_null_literal() {
            self.compare("IS NOT", rhs)
        } else {
            self.compare("!=", rhs)
        }
    }

    /// `(lhs IS NULL)`.
    #[must_use]
    pub fn is_null(&self) -> Expression<T::Predicate> {
        self.compare("IS", Expression::literal("NULL"))
    }

    /// `(lhs IS NOT NULL)`.
    #[must_use]
    pub fn is_not_null(&self) -> Expression<T::Predicate> {
        self.compare("IS NOT", Expression::literal("NULL"))
    }

    /// `(lhs < rhs)`.
    #[must_use]
    pub fn lt(&self, rhs: impl Operand<T>) -> Expression<T::Predicate> {
        self.compare("<", rhs.into_operand())
    }

    /// `(lhs <= rhs)`.
    #[must_use]
    pub fn lt_eq(&self, rhs: impl Operand<T>) -> Expression<T::Predicate> {
        self.compare("<=", rhs.into_operand())
    }

    /// `(lhs > rhs)`.
    #[must_use]
    pub fn gt(&self, rhs: impl Operand<T>) -> Expression<T::Predicate> {
        self.compare(">", rhs.into_operand())
    }

    /// `(lhs >= rhs)`.
    #[must_use]
    pub fn gt_eq(&self, rhs: impl Operand<T>) -> Expression<T::Predicate> {
        self.compare(">=", rhs.into_operand())
    }

    /// `(lhs IN (?, ?, ...))`.
    #[must_use]
    pub fn in_list<I>(&self, values: I) -> Expression<T::Predicate>
    where
        I: IntoIterator<Item = T::Value>,
    {
        self.membership("IN", values)
    }

    /// `(lhs NOT IN (?, ?, ...))`.
    #[must_use]
    pub fn not_in_list<I>(&self, values: I) -> Expression<T::Predicate>
    where
        I: IntoIterator<Item = T::Value>,
    {
        self.membership("NOT IN", values)
    }

    fn membership<I>(&self, op: &str, values: I) -> Expression<T::Predicate>
    where
        I: IntoIterator<Item = T::Value>,
    {
        let list = join(
            ", ",
            values
                .into_iter()
                .map(|value| Expression::bound(value.to_sql_value())),
        );
        self.compare(op, wrap("", list))
    }

    /// `lhs BETWEEN ? AND ?`.
    #[must_use]
    pub fn between(&self, low: T::Value, high: T::Value) -> Expression<T::Predicate> {
        self.in_range(low..=high)
    }

    /// Range membership, see [`SqlRange`].
    #[must_use]
    pub fn in_range<R: SqlRange<T::Value>>(&self, range: R) -> Expression<T::Predicate> {
        range.contains_expr(self.clone().untyped()).retag()
    }
}

impl<T> Expression<T>
where
    T: SqlType<Value = String>,
{
    /// `(lhs LIKE pattern)`.
    #[must_use]
    pub fn like(&self, pattern: &str) -> Expression<T::Predicate> {
        self.compare("LIKE", Expression::bound(SqlValue::Text(String::from(pattern))))
    }

    /// `(lhs || rhs)`.
    #[must_use]
    pub fn concat(&self, rhs: impl Operand<T>) -> Self {
        infix("||", self.clone().untyped(), rhs.into_operand(), true)
    }
}

impl<T> Expression<T>
where
    T: SqlType<Value = bool>,
{
    /// `(lhs AND rhs)`.
    #[must_use]
    pub fn and(&self, rhs: impl Operand<T>) -> Self {
        infix("AND", self.clone().untyped(), rhs.into_operand(), true)
    }

    /// `(lhs OR rhs)`.
    #[must_use]
    pub fn or(&self, rhs: impl Operand<T>) -> Self {
        infix("OR", self.clone().untyped(), rhs.into_operand(), true)
    }
}

/// A Rust range usable as a SQL membership test.
///
/// | range | SQL |
/// |---|---|
/// | `a..=b` | `expr BETWEEN ? AND ?` |
/// | `a..b` | `expr >= ? AND expr < ?` |
/// | `..=b` | `expr <= ?` |
/// | `..b` | `expr < ?` |
/// | `a..` | `expr >= ?` |
pub trait SqlRange<V> {
    /// Renders the membership test for `expression`.
    fn contains_expr(self, expression: Expression) -> Expression;
}

fn bound_comparison<V: Value>(expression: &Expression, op: &str, bound: V) -> Expression {
    let mut bindings = expression.bindings().to_vec();
    bindings.push(bound.to_sql_value());
    Expression::new(format!("{} {op} ?", expression.template()), bindings)
}

impl<V: Value> SqlRange<V> for RangeInclusive<V> {
    fn contains_expr(self, expression: Expression) -> Expression {
        let (low, high) = self.into_inner();
        let mut bindings = expression.bindings().to_vec();
        bindings.push(low.to_sql_value());
        bindings.push(high.to_sql_value());
        Expression::new(
            format!("{} BETWEEN ? AND ?", expression.template()),
            bindings,
        )
    }
}

impl<V: Value> SqlRange<V> for Range<V> {
    fn contains_expr(self, expression: Expression) -> Expression {
        join(
            " AND ",
            [
                bound_comparison(&expression, ">=", self.start),
                bound_comparison(&expression, "<", self.end),
            ],
        )
    }
}

impl<V: Value> SqlRange<V> for RangeToInclusive<V> {
    fn contains_expr(self, expression: Expression) -> Expression {
        bound_comparison(&expression, "<=", self.end)
    }
}

impl<V: Value> SqlRange<V> for RangeTo<V> {
    fn contains_expr(self, expression: Expression) -> Expression {
        bound_comparison(&expression, "<", self.end)
    }
}

impl<V: Value> SqlRange<V> for RangeFrom<V> {
    fn contains_expr(self, expression: Expression) -> Expression {
        bound_comparison(&expression, ">=", self.start)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:literal, $bound:ident) => {
        impl<T, R> $trait<R> for Expression<T>
        where
            T: SqlType,
            T::Value: $bound,
            R: Operand<T>,
        {
            type Output = Expression<T>;

            fn $method(self, rhs: R) -> Expression<T> {
                infix($op, self.untyped(), rhs.into_operand(), true)
            }
        }

        impl<T, R> $trait<R> for &Expression<T>
        where
            T: SqlType,
            T::Value: $bound,
            R: Operand<T>,
        {
            type Output = Expression<T>;

            fn $method(self, rhs: R) -> Expression<T> {
                infix($op, self.clone().untyped(), rhs.into_operand(), true)
            }
        }
    };
}

impl_binary_op!(Add, add, "+", Numeric);
impl_binary_op!(Sub, sub, "-", Numeric);
impl_binary_op!(Mul, mul, "*", Numeric);
impl_binary_op!(Div, div, "/", Numeric);
impl_binary_op!(Rem, rem, "%", Integer);
impl_binary_op!(Shl, shl, "<<", Integer);
impl_binary_op!(Shr, shr, ">>", Integer);
impl_binary_op!(BitAnd, bitand, "&", Integer);
impl_binary_op!(BitOr, bitor, "|", Integer);

impl<T, R> BitXor<R> for Expression<T>
where
    T: SqlType,
    T::Value: Integer + Invertible,
    R: Operand<T>,
{
    type Output = Self;

    fn bitxor(self, rhs: R) -> Self {
        let rhs: Self = rhs.into_operand().retag();
        let both = &self & &rhs;
        let either = self | rhs;
        !both & either
    }
}

impl<T> Neg for Expression<T>
where
    T: SqlType,
    T::Value: Numeric,
{
    type Output = Self;

    fn neg(self) -> Self {
        wrap("-", self.untyped())
    }
}

impl<T> Not for Expression<T>
where
    T: SqlType,
    T::Value: Invertible,
{
    type Output = Self;

    fn not(self) -> Self {
        wrap(<T::Value as Invertible>::PREFIX, self.untyped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::expr::col;

    #[test]
    fn test_eq_wraps_and_binds() {
        let expr = col::<i64>("id").eq(1);
        assert_eq!(expr.template(), "(\"id\" = ?)");
        assert_eq!(expr.bindings(), &[SqlValue::Int(1)]);
    }

    #[test]
    fn test_eq_none_is_null() {
        let email = col::<Option<String>>("email");
        let expr = email.eq(None::<String>);
        assert_eq!(expr.template(), "(\"email\" IS NULL)");
        assert!(expr.bindings().is_empty());

        let expr = email.not_eq(None::<String>);
        assert_eq!(expr.template(), "(\"email\" IS NOT NULL)");
        assert!(expr.bindings().is_empty());
    }

    #[test]
    fn test_eq_some_binds_value() {
        let expr = col::<Option<String>>("email").eq(Some(String::from("a@b.c")));
        assert_eq!(expr.template(), "(\"email\" = ?)");
        assert_eq!(expr.bindings(), &[SqlValue::Text(String::from("a@b.c"))]);
    }

    #[test]
    fn test_comparisons() {
        let age = col::<i64>("age");
        assert_eq!(age.lt(3).template(), "(\"age\" < ?)");
        assert_eq!(age.lt_eq(3).template(), "(\"age\" <= ?)");
        assert_eq!(age.gt(3).template(), "(\"age\" > ?)");
        assert_eq!(age.gt_eq(3).template(), "(\"age\" >= ?)");
        assert_eq!(age.not_eq(3).template(), "(\"age\" != ?)");
    }

    #[test]
    fn test_compare_columns() {
        let expr = col::<i64>("a").eq(&col::<Option<i64>>("b"));
        assert_eq!(expr.template(), "(\"a\" = \"b\")");
        assert!(expr.bindings().is_empty());
    }

    #[test]
    fn test_and_or() {
        let a = col::<bool>("a");
        let b = col::<bool>("b");
        assert_eq!(a.and(&b).template(), "(\"a\" AND \"b\")");
        assert_eq!(a.or(true).template(), "(\"a\" OR ?)");
        assert_eq!((!a).template(), "NOT (\"a\")");
    }

    #[test]
    fn test_arithmetic() {
        let n = col::<i64>("n");
        let expr = &n + 1;
        assert_eq!(expr.template(), "(\"n\" + ?)");
        assert_eq!(expr.bindings(), &[SqlValue::Int(1)]);
        assert_eq!((&n * &n).template(), "(\"n\" * \"n\")");
        assert_eq!((-n.clone()).template(), "-(\"n\")");
        assert_eq!((&n % 2).template(), "(\"n\" % ?)");
        assert_eq!((&n << 2).template(), "(\"n\" << ?)");
        assert_eq!((!n).template(), "~(\"n\")");
    }

    #[test]
    fn test_float_arithmetic() {
        let price = col::<f64>("price");
        let expr = price / 2.0;
        assert_eq!(expr.template(), "(\"price\" / ?)");
        assert_eq!(expr.bindings(), &[SqlValue::Float(2.0)]);
    }

    #[test]
    fn test_bitxor_is_derived() {
        let expr = col::<i64>("a") ^ 5;
        assert_eq!(
            expr.template(),
            "(~((\"a\" & ?)) & (\"a\" | ?))"
        );
        assert_eq!(expr.bindings(), &[SqlValue::Int(5), SqlValue::Int(5)]);
    }

    #[test]
    fn test_concat() {
        let expr = col::<String>("first").concat(" ");
        assert_eq!(expr.template(), "(\"first\" || ?)");
    }

    #[test]
    fn test_like_and_in() {
        let name = col::<String>("name");
        assert_eq!(name.like("A%").template(), "(\"name\" LIKE ?)");

        let expr = col::<i64>("id").in_list([1, 2, 3]);
        assert_eq!(expr.template(), "(\"id\" IN (?, ?, ?))");
        assert_eq!(expr.bindings().len(), 3);

        let expr = col::<i64>("id").not_in_list(vec![4]);
        assert_eq!(expr.template(), "(\"id\" NOT IN (?))");
    }

    #[test]
    fn test_closed_range() {
        let expr = col::<i64>("age").in_range(18..=65);
        assert_eq!(expr.template(), "\"age\" BETWEEN ? AND ?");
        assert_eq!(expr.bindings(), &[SqlValue::Int(18), SqlValue::Int(65)]);
    }

    #[test]
    fn test_half_open_range_repeats_bindings() {
        let shifted = col::<i64>("age") + 1;
        let expr = shifted.in_range(18..65);
        assert_eq!(expr.template(), "(\"age\" + ?) >= ? AND (\"age\" + ?) < ?");
        assert_eq!(
            expr.bindings(),
            &[
                SqlValue::Int(1),
                SqlValue::Int(18),
                SqlValue::Int(1),
                SqlValue::Int(65)
            ]
        );
    }

    #[test]
    fn test_single_bound_ranges() {
        let age = col::<Option<i64>>("age");
        assert_eq!(age.in_range(..=9).template(), "\"age\" <= ?");
        assert_eq!(age.in_range(..9).template(), "\"age\" < ?");
        assert_eq!(age.in_range(9..).template(), "\"age\" >= ?");
    }

    #[test]
    fn test_between() {
        let expr = col::<f64>("score").between(1.0, 2.0);
        assert_eq!(expr.template(), "\"score\" BETWEEN ? AND ?");
    }
}
