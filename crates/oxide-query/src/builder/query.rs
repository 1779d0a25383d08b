//! Table queries and SELECT compilation.
//!
//! A [`Table`] is an immutable query value. Every builder method borrows the
//! query and returns a new one with exactly one clause replaced or appended,
//! so a base query can be shared and refined freely:
//!
//! ```rust
//! use oxide_query::builder::{col, Expressible, Table};
//!
//! let users = Table::new("users");
//! let id = col::<i64>("id");
//! let email = col::<String>("email");
//!
//! let query = users.select(&[&id, &email]).filter(id.eq(1));
//! let (sql, params) = query.build();
//!
//! assert_eq!(sql, "SELECT \"id\", \"email\" FROM \"users\" WHERE (\"id\" = ?)");
//! assert_eq!(params.len(), 1);
//! assert_eq!(users.build().0, "SELECT * FROM \"users\"");
//! ```

use super::expr::{infix, join, quote, star, Expressible, Expression};
use super::functions::count_all;
use super::select::{Exists, ScalarQuery};
use super::value::SqlType;

/// The kind of a JOIN clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `CROSS JOIN`.
    Cross,
    /// `INNER JOIN`.
    Inner,
    /// `LEFT OUTER JOIN`.
    LeftOuter,
}

impl JoinKind {
    /// Returns the SQL keyword(s) preceding `JOIN`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cross => "CROSS",
            Self::Inner => "INNER",
            Self::LeftOuter => "LEFT OUTER",
        }
    }
}

/// The `SELECT` column list.
#[derive(Debug, Clone)]
pub struct SelectClause {
    pub(crate) distinct: bool,
    pub(crate) columns: Vec<Expression>,
}

impl SelectClause {
    /// Returns `true` for `SELECT DISTINCT`.
    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Returns the selected column expressions.
    #[must_use]
    pub fn columns(&self) -> &[Expression] {
        &self.columns
    }

    fn all() -> Self {
        Self {
            distinct: false,
            columns: vec![star()],
        }
    }
}

/// The table a query reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromClause {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) schema: Option<String>,
}

impl FromClause {
    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the alias, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns the schema (attached database), if any.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }
}

/// One JOIN entry.
#[derive(Debug, Clone)]
pub struct JoinClause {
    pub(crate) kind: JoinKind,
    pub(crate) query: Table,
    pub(crate) condition: Expression,
}

impl JoinClause {
    /// Returns the join kind.
    #[must_use]
    pub const fn kind(&self) -> JoinKind {
        self.kind
    }

    /// Returns the joined query.
    #[must_use]
    pub const fn query(&self) -> &Table {
        &self.query
    }

    /// Returns the ON condition, including the target's own filter.
    #[must_use]
    pub const fn condition(&self) -> &Expression {
        &self.condition
    }
}

/// `GROUP BY` with an optional `HAVING`.
#[derive(Debug, Clone)]
pub struct GroupClause {
    pub(crate) by: Vec<Expression>,
    pub(crate) having: Option<Expression>,
}

/// `LIMIT` with an optional `OFFSET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitClause {
    pub(crate) length: u64,
    pub(crate) offset: Option<u64>,
}

impl LimitClause {
    /// Returns the row limit.
    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }

    /// Returns the offset, if any.
    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }
}

/// The accumulated pieces of a statement.
#[derive(Debug, Clone)]
pub struct ClauseSet {
    pub(crate) select: SelectClause,
    pub(crate) from: FromClause,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) filters: Option<Expression>,
    pub(crate) group: Option<GroupClause>,
    pub(crate) order: Vec<Expression>,
    pub(crate) limit: Option<LimitClause>,
    pub(crate) union: Vec<Table>,
}

impl ClauseSet {
    fn new(name: &str, schema: Option<&str>) -> Self {
        Self {
            select: SelectClause::all(),
            from: FromClause {
                name: String::from(name),
                alias: None,
                schema: schema.map(String::from),
            },
            joins: vec![],
            filters: None,
            group: None,
            order: vec![],
            limit: None,
            union: vec![],
        }
    }

    /// Returns the select clause.
    #[must_use]
    pub const fn select(&self) -> &SelectClause {
        &self.select
    }

    /// Returns the FROM clause.
    #[must_use]
    pub const fn from(&self) -> &FromClause {
        &self.from
    }

    /// Returns the joins, in order.
    #[must_use]
    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    /// Returns the combined WHERE predicate.
    #[must_use]
    pub const fn filters(&self) -> Option<&Expression> {
        self.filters.as_ref()
    }

    /// Returns the limit clause.
    #[must_use]
    pub const fn limit(&self) -> Option<&LimitClause> {
        self.limit.as_ref()
    }

    /// Returns the ordering terms.
    #[must_use]
    pub fn order(&self) -> &[Expression] {
        &self.order
    }

    /// Returns the unioned queries.
    #[must_use]
    pub fn union(&self) -> &[Table] {
        &self.union
    }
}

/// A query over one table.
#[derive(Debug, Clone)]
pub struct Table {
    clauses: ClauseSet,
}

impl Table {
    /// Creates a query over `name`, selecting `*`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            clauses: ClauseSet::new(name, None),
        }
    }

    /// Creates a query over `schema.name`.
    #[must_use]
    pub fn with_schema(name: &str, schema: &str) -> Self {
        Self {
            clauses: ClauseSet::new(name, Some(schema)),
        }
    }

    /// Returns the accumulated clauses.
    #[must_use]
    pub const fn clauses(&self) -> &ClauseSet {
        &self.clauses
    }

    fn with(&self, update: impl FnOnce(&mut ClauseSet)) -> Self {
        let mut query = self.clone();
        update(&mut query.clauses);
        query
    }

    // SELECT

    /// Replaces the selected columns.
    #[must_use]
    pub fn select(&self, columns: &[&dyn Expressible]) -> Self {
        self.select_columns(false, columns)
    }

    /// Replaces the selected columns with `SELECT DISTINCT`.
    #[must_use]
    pub fn select_distinct(&self, columns: &[&dyn Expressible]) -> Self {
        self.select_columns(true, columns)
    }

    fn select_columns(&self, distinct: bool, columns: &[&dyn Expressible]) -> Self {
        let columns = columns.iter().map(|column| column.expression()).collect();
        self.with(|clauses| clauses.select = SelectClause { distinct, columns })
    }

    /// Selects a single typed column, e.g. an aggregate.
    #[must_use]
    pub fn select_scalar<T: SqlType>(&self, column: &Expression<T>) -> ScalarQuery<T> {
        ScalarQuery::new(self.select(&[column]))
    }

    /// Selects a single typed column with `SELECT DISTINCT`.
    #[must_use]
    pub fn select_distinct_scalar<T: SqlType>(&self, column: &Expression<T>) -> ScalarQuery<T> {
        ScalarQuery::new(self.select_distinct(&[column]))
    }

    /// `SELECT count(*)` over this query.
    #[must_use]
    pub fn count(&self) -> ScalarQuery<i64> {
        self.select_scalar(&count_all())
    }

    // JOIN

    /// Appends an `INNER JOIN`.
    #[must_use]
    pub fn join<P>(&self, target: &Self, on: Expression<P>) -> Self
    where
        P: SqlType<Value = bool>,
    {
        self.join_with(JoinKind::Inner, target, on)
    }

    /// Appends a join of the given kind.
    ///
    /// A filter on `target` is conjoined into the ON condition.
    #[must_use]
    pub fn join_with<P>(&self, kind: JoinKind, target: &Self, on: Expression<P>) -> Self
    where
        P: SqlType<Value = bool>,
    {
        let condition = match &target.clauses.filters {
            Some(filter) => infix("AND", on.untyped(), filter.clone(), true),
            None => on.untyped(),
        };
        self.with(|clauses| {
            clauses.joins.push(JoinClause {
                kind,
                query: target.clone(),
                condition,
            });
        })
    }

    // WHERE

    /// Adds a predicate, conjoined with any existing one.
    #[must_use]
    pub fn filter<P>(&self, predicate: Expression<P>) -> Self
    where
        P: SqlType<Value = bool>,
    {
        let predicate = predicate.untyped();
        self.with(|clauses| {
            clauses.filters = Some(match clauses.filters.take() {
                Some(existing) => infix("AND", existing, predicate, true),
                None => predicate,
            });
        })
    }

    /// Alias for [`Table::filter`].
    #[must_use]
    pub fn where_clause<P>(&self, predicate: Expression<P>) -> Self
    where
        P: SqlType<Value = bool>,
    {
        self.filter(predicate)
    }

    // GROUP BY

    /// Replaces the `GROUP BY` clause.
    #[must_use]
    pub fn group(&self, by: &[&dyn Expressible]) -> Self {
        self.set_group(by, None)
    }

    /// Replaces the `GROUP BY` clause, with a `HAVING` predicate.
    #[must_use]
    pub fn group_having<P>(&self, by: &[&dyn Expressible], having: Expression<P>) -> Self
    where
        P: SqlType<Value = bool>,
    {
        self.set_group(by, Some(having.untyped()))
    }

    fn set_group(&self, by: &[&dyn Expressible], having: Option<Expression>) -> Self {
        let by = by.iter().map(|column| column.expression()).collect();
        self.with(|clauses| clauses.group = Some(GroupClause { by, having }))
    }

    // ORDER BY

    /// Replaces the `ORDER BY` clause.
    #[must_use]
    pub fn order(&self, by: &[&dyn Expressible]) -> Self {
        let order = by.iter().map(|term| term.expression()).collect();
        self.with(|clauses| clauses.order = order)
    }

    // LIMIT/OFFSET

    /// Sets `LIMIT`, clearing any previous `OFFSET`.
    #[must_use]
    pub fn limit(&self, length: u64) -> Self {
        self.set_limit(Some(LimitClause {
            length,
            offset: None,
        }))
    }

    /// Sets `LIMIT` and `OFFSET`.
    #[must_use]
    pub fn limit_offset(&self, length: u64, offset: u64) -> Self {
        self.set_limit(Some(LimitClause {
            length,
            offset: Some(offset),
        }))
    }

    /// Removes the `LIMIT`/`OFFSET` clause.
    #[must_use]
    pub fn without_limit(&self) -> Self {
        self.set_limit(None)
    }

    fn set_limit(&self, limit: Option<LimitClause>) -> Self {
        self.with(|clauses| clauses.limit = limit)
    }

    // UNION

    /// Appends a `UNION` with another query.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.with(|clauses| clauses.union.push(other.clone()))
    }

    /// Renames the table reference: `"name" AS "alias"` in FROM/JOIN and
    /// `"alias"` everywhere else.
    #[must_use]
    pub fn alias(&self, name: &str) -> Self {
        self.with(|clauses| clauses.from.alias = Some(String::from(name)))
    }

    /// `SELECT EXISTS(...)` over this query.
    #[must_use]
    pub fn exists(&self) -> Exists {
        Exists::new(self)
    }

    /// Prefixes a column with this query's table name or alias.
    #[must_use]
    pub fn namespace<T>(&self, column: &Expression<T>) -> Expression<T> {
        join(".", [self.table_name(false), column.clone().untyped()]).retag()
    }

    /// This query's `*`, e.g. `"users".*`.
    #[must_use]
    pub fn star(&self) -> Expression {
        self.namespace(&star())
    }

    // Compilation

    /// Renders the table reference.
    ///
    /// With `aliased`, an aliased table renders `"name" AS "alias"`.
    /// Otherwise the alias (or the name) is used alone. Names, but not
    /// aliases, are qualified with the schema.
    pub(crate) fn table_name(&self, aliased: bool) -> Expression {
        let from = &self.clauses.from;
        match (&from.alias, aliased) {
            (Some(alias), true) => join(
                " ",
                [
                    self.qualified_name(),
                    Expression::literal("AS"),
                    Expression::identifier(alias),
                ],
            ),
            (Some(alias), false) => Expression::identifier(alias),
            (None, _) => self.qualified_name(),
        }
    }

    fn qualified_name(&self) -> Expression {
        let from = &self.clauses.from;
        from.schema.as_ref().map_or_else(
            || Expression::identifier(&from.name),
            |schema| Expression::literal(format!("{}.{}", quote(schema), quote(&from.name))),
        )
    }

    /// The same table, unaliased, selecting what this query selects.
    pub(crate) fn probe(&self) -> Self {
        let from = &self.clauses.from;
        let mut clauses = ClauseSet::new(&from.name, from.schema.as_deref());
        clauses.select = self.clauses.select.clone();
        Self { clauses }
    }

    /// The same query selecting `*`.
    pub(crate) fn select_all(&self) -> Self {
        self.with(|clauses| clauses.select = SelectClause::all())
    }

    fn select_clause(&self) -> Expression {
        let keyword = if self.clauses.select.distinct {
            "SELECT DISTINCT"
        } else {
            "SELECT"
        };
        join(
            " ",
            [
                Expression::literal(keyword),
                join(", ", self.clauses.select.columns.iter().cloned()),
                Expression::literal("FROM"),
                self.table_name(true),
            ],
        )
    }

    fn join_clause(&self) -> Option<Expression> {
        if self.clauses.joins.is_empty() {
            return None;
        }
        Some(join(
            " ",
            self.clauses.joins.iter().map(|entry| {
                join(
                    " ",
                    [
                        Expression::literal(format!("{} JOIN", entry.kind.as_str())),
                        entry.query.table_name(true),
                        Expression::literal("ON"),
                        entry.condition.clone(),
                    ],
                )
            }),
        ))
    }

    pub(crate) fn where_clause_sql(&self) -> Option<Expression> {
        self.clauses
            .filters
            .as_ref()
            .map(|filters| join(" ", [Expression::literal("WHERE"), filters.clone()]))
    }

    fn group_clause(&self) -> Option<Expression> {
        let group = self.clauses.group.as_ref()?;
        let mut parts = vec![
            Expression::literal("GROUP BY"),
            join(", ", group.by.iter().cloned()),
        ];
        if let Some(having) = &group.having {
            parts.push(Expression::literal("HAVING"));
            parts.push(having.clone());
        }
        Some(join(" ", parts))
    }

    pub(crate) fn order_clause(&self) -> Option<Expression> {
        if self.clauses.order.is_empty() {
            return None;
        }
        Some(join(
            " ",
            [
                Expression::literal("ORDER BY"),
                join(", ", self.clauses.order.iter().cloned()),
            ],
        ))
    }

    pub(crate) fn limit_clause(&self) -> Option<Expression> {
        let limit = self.clauses.limit?;
        let sql = limit.offset.map_or_else(
            || format!("LIMIT {}", limit.length),
            |offset| format!("LIMIT {} OFFSET {offset}", limit.length),
        );
        Some(Expression::literal(sql))
    }

    fn union_clause(&self) -> Option<Expression> {
        if self.clauses.union.is_empty() {
            return None;
        }
        Some(join(
            " ",
            self.clauses
                .union
                .iter()
                .map(|query| join(" ", [Expression::literal("UNION"), query.expression()])),
        ))
    }

    fn compile_select(&self) -> Expression {
        let clauses = [
            Some(self.select_clause()),
            self.join_clause(),
            self.where_clause_sql(),
            self.group_clause(),
            self.union_clause(),
            self.order_clause(),
            self.limit_clause(),
        ];
        join(" ", clauses.into_iter().flatten())
    }
}

impl Expressible for Table {
    fn expression(&self) -> Expression {
        self.compile_select()
    }
}
