//! Typed SQL Builder
//!
//! Expressions carry their SQL type as a compile-time tag, so comparing an
//! integer column against text or summing a text column does not compile.
//! Queries are immutable values: every builder call returns a new query.
//!
//! # Example
//!
//! ```rust
//! use oxide_query::builder::{col, Expressible, Table};
//!
//! let users = Table::new("users");
//! let id = col::<i64>("id");
//! let email = col::<String>("email");
//! let name = col::<Option<String>>("name");
//!
//! let query = users
//!     .select(&[&id, &email])
//!     .filter(name.eq(None::<String>))
//!     .order(&[&email.desc()])
//!     .limit(10);
//!
//! assert_eq!(
//!     query.as_sql(),
//!     "SELECT \"id\", \"email\" FROM \"users\" WHERE (\"name\" IS NULL) ORDER BY \"email\" DESC LIMIT 10"
//! );
//! ```

mod delete;
mod expr;
mod functions;
mod insert;
mod operators;
mod query;
mod select;
mod update;
pub mod value;

pub use delete::Delete;
pub use expr::{
    col, infix, join, quote, quote_with, rowid, star, wrap, Expressible, Expression, Operand,
};
pub use functions::{call, count_all};
pub use insert::{Insert, OnConflict, Setter};
pub use operators::SqlRange;
pub use query::{
    ClauseSet, FromClause, GroupClause, JoinClause, JoinKind, LimitClause, SelectClause, Table,
};
pub use select::{Exists, ScalarQuery};
pub use update::Update;
pub use value::{SqlType, SqlValue, Value};
