//! Table definitions.

use std::collections::BTreeMap;

use crate::error::Error;
use crate::relation::Relation;

/// A set of known tables and their columns.
///
/// The catalog stands in for a database schema. Every call to
/// [`table`](Catalog::table) returns a fresh relation, so asking for the same
/// table twice gives two distinct occurrences of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tables: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Catalog {
        Catalog::default()
    }

    /// Adds or replaces a table definition.
    pub fn with_table<S, I, C>(mut self, name: S, columns: I) -> Catalog
    where
        S: Into<String>,
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.tables
            .insert(name.into(), columns.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the column names of a table.
    pub fn columns(&self, name: &str) -> Option<&[String]> {
        self.tables.get(name).map(Vec::as_slice)
    }

    /// Creates a new occurrence of a table.
    pub fn table(&self, name: &str) -> Result<Relation, Error> {
        match self.tables.get(name) {
            Some(columns) => Ok(Relation::table(name, columns.iter().cloned())),
            None => Err(Error::UnknownTable(name.to_string())),
        }
    }
}
