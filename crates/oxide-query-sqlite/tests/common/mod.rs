#![allow(dead_code)]

use oxide_query::Connection;
use oxide_query_sqlite::SqliteConnection;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        name TEXT,
        age INTEGER,
        admin INTEGER NOT NULL DEFAULT 0,
        joined TEXT
    )"#,
    r#"CREATE TABLE posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users (id),
        title TEXT NOT NULL,
        views INTEGER NOT NULL DEFAULT 0
    )"#,
];

/// Opens an in-memory database with the `users` and `posts` tables.
pub fn blog() -> SqliteConnection {
    let conn = SqliteConnection::in_memory().expect("Failed to open in-memory SQLite database");
    for sql in SCHEMA {
        conn.execute(sql, &[]).expect("Failed to create schema");
    }
    conn
}
