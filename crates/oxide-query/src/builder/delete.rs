//! DELETE statements.

use super::expr::{join, Expressible, Expression};
use super::query::Table;

/// A compiled DELETE statement. Running it yields the number of deleted rows.
#[derive(Debug, Clone)]
pub struct Delete {
    expression: Expression,
}

impl Expressible for Delete {
    fn expression(&self) -> Expression {
        self.expression.clone()
    }
}

impl Table {
    /// `DELETE FROM t [WHERE] [ORDER BY] [LIMIT]`.
    ///
    /// **Warning**: Without a filter this deletes every row.
    #[must_use]
    pub fn delete(&self) -> Delete {
        let clauses = [
            Some(Expression::literal("DELETE FROM")),
            Some(self.table_name(false)),
            self.where_clause_sql(),
            self.order_clause(),
            self.limit_clause(),
        ];
        Delete {
            expression: join(" ", clauses.into_iter().flatten()),
        }
    }
}
