#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use oxide_query::builder::SqlValue;
use oxide_query::{Connection, Error, ExecuteResult, Result, Statement};

/// An in-memory connection answering prepared SQL from a script.
#[derive(Default)]
pub struct ScriptedConnection {
    responses: HashMap<String, (Vec<String>, Vec<Vec<SqlValue>>)>,
    execute_result: ExecuteResult,
    prepared: RefCell<Vec<(String, Vec<SqlValue>)>>,
    executed: RefCell<Vec<(String, Vec<SqlValue>)>>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `sql` with the given columns and rows.
    pub fn respond(mut self, sql: &str, columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
        let columns = columns.iter().map(|c| String::from(*c)).collect();
        self.responses.insert(String::from(sql), (columns, rows));
        self
    }

    /// Answers the wildcard probe `SELECT * FROM "<table>"` with `columns`.
    pub fn table(self, table: &str, columns: &[&str]) -> Self {
        let sql = format!("SELECT * FROM \"{table}\"");
        self.respond(&sql, columns, vec![])
    }

    pub fn with_execute_result(mut self, last_insert_rowid: i64, changes: u64) -> Self {
        self.execute_result = ExecuteResult {
            last_insert_rowid,
            changes,
        };
        self
    }

    pub fn prepared(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.prepared.borrow().clone()
    }

    pub fn prepared_sql(&self) -> Vec<String> {
        self.prepared.borrow().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn executed(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.executed.borrow().clone()
    }
}

struct ScriptedStatement {
    columns: Vec<String>,
    rows: VecDeque<Vec<SqlValue>>,
}

impl Statement for ScriptedStatement {
    fn column_names(&self) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }

    fn step(&mut self) -> Result<Option<Vec<SqlValue>>> {
        Ok(self.rows.pop_front())
    }
}

impl Connection for ScriptedConnection {
    fn prepare(&self, sql: &str, bindings: &[SqlValue]) -> Result<Box<dyn Statement + '_>> {
        self.prepared
            .borrow_mut()
            .push((String::from(sql), bindings.to_vec()));
        let (columns, rows) = self.responses.get(sql).ok_or_else(|| {
            Error::connection(std::io::Error::other(format!("no such table in script: {sql}")))
        })?;
        Ok(Box::new(ScriptedStatement {
            columns: columns.clone(),
            rows: rows.iter().cloned().collect(),
        }))
    }

    fn execute(&self, sql: &str, bindings: &[SqlValue]) -> Result<ExecuteResult> {
        self.executed
            .borrow_mut()
            .push((String::from(sql), bindings.to_vec()));
        Ok(self.execute_result)
    }
}

pub fn text(value: &str) -> SqlValue {
    SqlValue::Text(String::from(value))
}
