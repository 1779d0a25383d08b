//! Typed SQL expressions.
//!
//! An [`Expression`] is a SQL template with `?` placeholders and the ordered
//! list of values bound to them. Every composition keeps the number of
//! placeholders equal to the number of bindings.

use std::fmt;
use std::marker::PhantomData;

use super::value::{SqlType, SqlValue, Value};

/// A SQL fragment plus its positional bindings, tagged with its SQL type.
///
/// The tag `T` exists only at compile time: `Expression<i64>` and
/// `Expression<Option<String>>` share the same runtime representation.
/// Untyped fragments (column lists, clauses, ordering terms) use the default
/// tag `()`.
pub struct Expression<T = ()> {
    template: String,
    bindings: Vec<SqlValue>,
    _type: PhantomData<fn() -> T>,
}

// Manual impls avoid `T: Clone` / `T: Debug` bounds on the tag.
impl<T> Clone for Expression<T> {
    fn clone(&self) -> Self {
        Self {
            template: self.template.clone(),
            bindings: self.bindings.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("template", &self.template)
            .field("bindings", &self.bindings)
            .finish()
    }
}

impl<T> Expression<T> {
    /// Creates an expression from a template and its bindings.
    #[must_use]
    pub fn new(template: impl Into<String>, bindings: Vec<SqlValue>) -> Self {
        Self {
            template: template.into(),
            bindings,
            _type: PhantomData,
        }
    }

    /// Creates an expression from raw SQL with no bindings.
    ///
    /// **Warning**: Only use this for SQL fragments that don't contain user input.
    #[must_use]
    pub fn literal(sql: impl Into<String>) -> Self {
        Self::new(sql, vec![])
    }

    /// A placeholder bound to `value`.
    #[must_use]
    pub fn bound(value: SqlValue) -> Self {
        Self::new(SqlValue::placeholder(), vec![value])
    }

    /// Creates a quoted identifier, e.g. a column name.
    #[must_use]
    pub fn identifier(name: &str) -> Self {
        Self::literal(quote(name))
    }

    /// Returns the SQL template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the bindings, in placeholder order.
    #[must_use]
    pub fn bindings(&self) -> &[SqlValue] {
        &self.bindings
    }

    /// Consumes the expression and returns the SQL and parameters.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        (self.template, self.bindings)
    }

    /// Drops the type tag.
    #[must_use]
    pub fn untyped(self) -> Expression {
        self.retag()
    }

    /// An ascending ordering term: `expr ASC`.
    #[must_use]
    pub fn asc(&self) -> Expression {
        join(" ", [self.clone().untyped(), Expression::literal("ASC")])
    }

    /// A descending ordering term: `expr DESC`.
    #[must_use]
    pub fn desc(&self) -> Expression {
        join(" ", [self.clone().untyped(), Expression::literal("DESC")])
    }

    pub(crate) fn retag<U>(self) -> Expression<U> {
        Expression {
            template: self.template,
            bindings: self.bindings,
            _type: PhantomData,
        }
    }

    pub(crate) fn is_null_literal(&self) -> bool {
        self.bindings.is_empty() && self.template == "NULL"
    }
}

impl<T: SqlType> Expression<T> {
    /// A bound value: `?` with one binding.
    #[must_use]
    pub fn value(value: T::Value) -> Self {
        Self::bound(value.to_sql_value())
    }

    /// The SQL `NULL` literal, contributing no bindings.
    #[must_use]
    pub fn null() -> Expression<T::Optional> {
        Expression::literal("NULL")
    }

    /// Re-tags the expression as nullable.
    #[must_use]
    pub fn nullable(self) -> Expression<T::Optional> {
        self.retag()
    }

    /// `CAST(expr AS <declared type of U>)`, preserving bindings.
    #[must_use]
    pub fn cast<U: SqlType>(self) -> Expression<U> {
        Expression::new(
            format!("CAST({} AS {})", self.template, U::Value::DECLARED_TYPE),
            self.bindings,
        )
    }
}

/// Creates a typed column reference.
///
/// ```rust
/// use oxide_query::builder::col;
///
/// let email = col::<String>("email");
/// assert_eq!(email.template(), "\"email\"");
/// ```
#[must_use]
pub fn col<T>(name: &str) -> Expression<T> {
    Expression::identifier(name)
}

/// The unqualified wildcard `*`.
#[must_use]
pub fn star() -> Expression {
    Expression::literal("*")
}

/// The implicit `ROWID` column.
#[must_use]
pub fn rowid() -> Expression<i64> {
    Expression::literal("ROWID")
}

/// Anything that compiles to an untyped [`Expression`].
pub trait Expressible {
    /// Returns the compiled expression.
    fn expression(&self) -> Expression;

    /// Builds the SQL and parameters.
    fn build(&self) -> (String, Vec<SqlValue>) {
        self.expression().build()
    }

    /// Renders the SQL with every binding inlined as an escaped literal.
    ///
    /// Intended for diagnostics and statements that cannot be bound.
    /// **Warning**: Prefer the parameterized form for execution.
    fn as_sql(&self) -> String {
        let expression = self.expression();
        let mut bindings = expression.bindings.iter();
        let mut sql = String::with_capacity(expression.template.len());
        for ch in expression.template.chars() {
            match (ch, bindings.len()) {
                ('?', n) if n > 0 => {
                    if let Some(binding) = bindings.next() {
                        sql.push_str(&binding.to_sql_inline());
                    }
                }
                _ => sql.push(ch),
            }
        }
        sql
    }
}

impl<T> Expressible for Expression<T> {
    fn expression(&self) -> Expression {
        self.clone().untyped()
    }
}

/// A right-hand operand compatible with an expression tagged `T`.
///
/// Implemented by expressions over the same value type (nullable or not) and
/// by plain Rust values, so both `age.gt(18)` and `age.gt(&other_age)`
/// compile. `None` becomes the SQL `NULL` literal.
pub trait Operand<T> {
    /// Converts the operand into an expression.
    fn into_operand(self) -> Expression;
}

impl<T, U> Operand<T> for Expression<U>
where
    T: SqlType,
    U: SqlType<Value = T::Value>,
{
    fn into_operand(self) -> Expression {
        self.untyped()
    }
}

impl<T, U> Operand<T> for &Expression<U>
where
    T: SqlType,
    U: SqlType<Value = T::Value>,
{
    fn into_operand(self) -> Expression {
        self.clone().untyped()
    }
}

macro_rules! impl_value_operand {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Operand<$ty> for $ty {
                fn into_operand(self) -> Expression {
                    Expression::bound(self.to_sql_value())
                }
            }

            impl Operand<Option<$ty>> for $ty {
                fn into_operand(self) -> Expression {
                    Expression::bound(self.to_sql_value())
                }
            }

            impl Operand<Option<$ty>> for Option<$ty> {
                fn into_operand(self) -> Expression {
                    match self {
                        Some(value) => Expression::bound(value.to_sql_value()),
                        None => Expression::literal("NULL"),
                    }
                }
            }
        )+
    };
}

impl_value_operand!(i64, i32, f64, bool, String, Vec<u8>, chrono::NaiveDateTime);

// Unsuffixed integer literals default to i32; let them stand in for i64.
impl Operand<i64> for i32 {
    fn into_operand(self) -> Expression {
        Expression::bound(SqlValue::Int(i64::from(self)))
    }
}

impl Operand<Option<i64>> for i32 {
    fn into_operand(self) -> Expression {
        Expression::bound(SqlValue::Int(i64::from(self)))
    }
}

impl Operand<String> for &str {
    fn into_operand(self) -> Expression {
        Expression::bound(SqlValue::Text(String::from(self)))
    }
}

impl Operand<Option<String>> for &str {
    fn into_operand(self) -> Expression {
        Expression::bound(SqlValue::Text(String::from(self)))
    }
}

/// Quotes an identifier with `"`, doubling any embedded quote.
#[must_use]
pub fn quote(identifier: &str) -> String {
    quote_with(identifier, '"')
}

/// Quotes `text` with `mark`, doubling any embedded `mark`.
#[must_use]
pub fn quote_with(text: &str, mark: char) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(mark);
    for ch in text.chars() {
        if ch == mark {
            quoted.push(mark);
        }
        quoted.push(ch);
    }
    quoted.push(mark);
    quoted
}

/// Concatenates templates with `separator`, bindings in order.
pub fn join<I>(separator: &str, expressions: I) -> Expression
where
    I: IntoIterator<Item = Expression>,
{
    let mut templates = Vec::new();
    let mut bindings = Vec::new();
    for expression in expressions {
        templates.push(expression.template);
        bindings.extend(expression.bindings);
    }
    Expression::new(templates.join(separator), bindings)
}

/// `lhs op rhs`, parenthesized when `wrap` is set.
#[must_use]
pub fn infix<T>(op: &str, lhs: Expression, rhs: Expression, wrap: bool) -> Expression<T> {
    let expression = join(&format!(" {op} "), [lhs, rhs]);
    if wrap {
        self::wrap("", expression)
    } else {
        expression.retag()
    }
}

/// `prefix(expr)`: function calls, `NOT (..)`, `-(..)` and `~(..)`.
#[must_use]
pub fn wrap<T>(prefix: &str, expression: Expression) -> Expression<T> {
    Expression::new(
        format!("{prefix}({})", expression.template),
        expression.bindings,
    )
}

/// Joins a list of expressibles with `", "`.
pub fn comma_list(items: &[&dyn Expressible]) -> Expression {
    join(", ", items.iter().map(|item| item.expression()))
}
