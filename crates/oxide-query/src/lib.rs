//! # oxide-query
//!
//! Typed SQL expressions, queries and row decoding.
//!
//! This crate provides:
//! - `Expression<T>`: a SQL fragment with positional bindings, tagged with
//!   its SQL type at compile time
//! - Operators and aggregate functions over typed expressions
//! - `Table`: an immutable, chainable SELECT builder that also compiles
//!   INSERT, UPDATE, DELETE and EXISTS statements
//! - `Connection`/`Statement`: the seam a database driver implements
//! - `ConnectionExt`: executes compiled statements and decodes `Row`s by
//!   column, expanding `*` against the live schema
//!
//! ## Quick Start
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
//!     .filter(id.gt(10).and(name.eq(None::<String>)));
//!
//! let (sql, params) = query.build();
//! assert_eq!(
//!     sql,
//!     "SELECT \"id\", \"email\" FROM \"users\" WHERE ((\"id\" > ?) AND (\"name\" IS NULL))"
//! );
//! assert_eq!(params.len(), 1);
//! ```
//!
//! ## Running Queries
//!
//! ```ignore
//! use oxide_query::ConnectionExt;
//!
//! let rowid = conn.run(&users.insert(&[email.set("alice@example.com")]))?;
//! let alice = conn.pluck(&users.filter(id.eq(rowid)))?;
//! let total = conn.scalar(&users.count())?;
//! ```

pub mod builder;
pub mod connection;
pub mod error;

pub use builder::{col, Expressible, Expression, Table};
pub use connection::{
    resolve_columns, ColumnMap, Connection, ConnectionExt, Execute, ExecuteResult, Row, Rows,
    Statement,
};
pub use error::{Error, QueryError, Result};
