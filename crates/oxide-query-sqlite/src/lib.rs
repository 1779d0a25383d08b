//! # oxide-query-sqlite
//!
//! SQLite connection for `oxide-query`, backed by `sqlx`.
//!
//! ```rust
//! use oxide_query::builder::{col, Table};
//! use oxide_query::{Connection, ConnectionExt};
//! use oxide_query_sqlite::SqliteConnection;
//!
//! let conn = SqliteConnection::in_memory()?;
//! conn.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL)", &[])?;
//!
//! let users = Table::new("users");
//! let email = col::<String>("email");
//!
//! let rowid = conn.run(&users.insert(&[email.set("alice@example.com")]))?;
//! assert_eq!(rowid, 1);
//! assert_eq!(conn.scalar(&users.count())?, 1);
//! # Ok::<(), oxide_query::Error>(())
//! ```

pub mod config;
pub mod connection;
pub mod error;

pub use config::ConnectionConfig;
pub use connection::SqliteConnection;
pub use error::{Result, SqliteError};
