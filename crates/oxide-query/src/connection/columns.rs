//! Column-name resolution for prepared SELECT statements.
//!
//! A row is positional; [`ColumnMap`] maps each selected column's template
//! (e.g. `"email"` or `"users"."email"`) to its index. Wildcards are expanded
//! by asking the connection which columns each source table reports.

use std::collections::HashMap;

use tracing::trace;

use super::Connection;
use crate::builder::{quote, Expressible, Table};
use crate::error::{QueryError, Result};

/// Maps quoted, possibly qualified column names to row indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: HashMap<String, usize>,
}

impl ColumnMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` at `index`, replacing any earlier entry.
    pub fn insert(&mut self, name: impl Into<String>, index: usize) {
        self.indices.insert(name.into(), index);
    }

    /// Returns the index registered for exactly `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    /// Returns every name ending with `.<name>`, sorted.
    #[must_use]
    pub fn similar(&self, name: &str) -> Vec<String> {
        let suffix = format!(".{name}");
        let mut similar: Vec<String> = self
            .indices
            .keys()
            .filter(|key| key.ends_with(&suffix))
            .cloned()
            .collect();
        similar.sort();
        similar
    }

    /// Returns every registered name, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indices.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if no name is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates over `(name, index)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.indices.iter().map(|(name, index)| (name.as_str(), *index))
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Self {
            indices: iter
                .into_iter()
                .map(|(name, index)| (name.into(), index))
                .collect(),
        }
    }
}

/// Builds the column map for `query`.
///
/// Each selected column is registered at the next index under its full
/// template. A `*` is replaced by the columns its source reports:
/// a namespaced `"t".*` expands only the base query or join target rendered
/// as `"t"`, a bare `*` expands the base query followed by every join target
/// (qualified with the source's name when the query has joins).
///
/// # Errors
///
/// Returns [`QueryError::NoSuchTable`] when a namespaced wildcard names no
/// source, and propagates connection errors from the probe statements.
pub fn resolve_columns<C>(connection: &C, query: &Table) -> Result<ColumnMap>
where
    C: Connection + ?Sized,
{
    let clauses = query.clauses();
    let mut columns = ColumnMap::new();
    let mut index = 0;

    for column in clauses.select().columns() {
        let template = column.template();
        let (namespace, name) = match template.rsplit_once('.') {
            Some((namespace, name)) => (Some(namespace), name),
            None => (None, template),
        };

        if name != "*" {
            columns.insert(template, index);
            index += 1;
            continue;
        }

        let sources: Vec<Table> = std::iter::once(query.select_all())
            .chain(clauses.joins().iter().map(|entry| entry.query().clone()))
            .collect();

        if let Some(namespace) = namespace {
            let source = sources
                .iter()
                .find(|source| source.table_name(false).template() == namespace)
                .ok_or_else(|| QueryError::NoSuchTable {
                    name: String::from(namespace),
                })?;
            expand(connection, source, true, &mut columns, &mut index)?;
        } else {
            let qualify = !clauses.joins().is_empty();
            for source in &sources {
                expand(connection, source, qualify, &mut columns, &mut index)?;
            }
        }
    }

    Ok(columns)
}

fn expand<C>(
    connection: &C,
    source: &Table,
    qualify: bool,
    columns: &mut ColumnMap,
    index: &mut usize,
) -> Result<()>
where
    C: Connection + ?Sized,
{
    let (sql, bindings) = source.probe().build();
    let names = connection.prepare(&sql, &bindings)?.column_names()?;
    let namespace = source.table_name(false);
    trace!(sql = %sql, columns = names.len(), "Expanding wildcard");

    for name in names {
        let quoted = quote(&name);
        if qualify {
            columns.insert(format!("{}.{quoted}", namespace.template()), *index);
        } else {
            columns.insert(quoted, *index);
        }
        *index += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similar_is_sorted_suffix_match() {
        let columns: ColumnMap = [
            ("\"users\".\"id\"", 0),
            ("\"managers\".\"id\"", 1),
            ("\"users\".\"valid\"", 2),
            ("\"id\"", 3),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            columns.similar("\"id\""),
            vec![
                String::from("\"managers\".\"id\""),
                String::from("\"users\".\"id\"")
            ]
        );
        assert_eq!(columns.get("\"id\""), Some(3));
        assert_eq!(columns.len(), 4);
    }

    #[test]
    fn test_names_sorted() {
        let columns: ColumnMap = [("\"b\"", 0), ("\"a\"", 1)].into_iter().collect();
        assert_eq!(
            columns.names(),
            vec![String::from("\"a\""), String::from("\"b\"")]
        );
    }
}
