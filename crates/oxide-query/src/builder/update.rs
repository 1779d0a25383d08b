//! UPDATE statements, and INSERT from a subquery.

use super::expr::{join, Expressible, Expression};
use super::insert::Setter;
use super::query::Table;

/// A compiled statement whose result is the number of changed rows.
#[derive(Debug, Clone)]
pub struct Update {
    expression: Expression,
}

impl Expressible for Update {
    fn expression(&self) -> Expression {
        self.expression.clone()
    }
}

impl Table {
    /// `UPDATE t SET a = ?, ... [WHERE] [ORDER BY] [LIMIT]`.
    ///
    /// The WHERE, ORDER BY and LIMIT clauses come from this query.
    #[must_use]
    pub fn update(&self, values: &[Setter]) -> Update {
        let clauses = [
            Some(Expression::literal("UPDATE")),
            Some(self.table_name(false)),
            Some(Expression::literal("SET")),
            Some(join(", ", values.iter().map(Setter::assignment))),
            self.where_clause_sql(),
            self.order_clause(),
            self.limit_clause(),
        ];
        Update {
            expression: join(" ", clauses.into_iter().flatten()),
        }
    }

    /// `INSERT INTO t <query>`.
    #[must_use]
    pub fn insert_query(&self, query: &Self) -> Update {
        Update {
            expression: join(
                " ",
                [
                    Expression::literal("INSERT INTO"),
                    self.table_name(false),
                    query.expression(),
                ],
            ),
        }
    }
}
