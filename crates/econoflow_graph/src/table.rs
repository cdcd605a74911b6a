// SPDX-License-Identifier: MIT OR Apache-2.0
//! Column-oriented tabular values flowing through `Table` sockets.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single named column: all-numeric or all-text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    /// Numeric data
    Number(Vec<f64>),
    /// Text data
    Text(Vec<String>),
}

impl Column {
    /// Number of rows in the column
    pub fn len(&self) -> usize {
        match self {
            Self::Number(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    /// Whether the column has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the column holds numeric data
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Numeric rows, if this is a numeric column
    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            Self::Number(values) => Some(values),
            Self::Text(_) => None,
        }
    }
}

/// An ordered collection of named columns.
///
/// Column order is preserved; derived columns are inserted at the front the
/// way the editor displays them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: IndexMap<String, Column>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column append
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Self {
        self.columns.insert(name.into(), column);
        self
    }

    /// Append a column, replacing any column with the same name
    pub fn insert(&mut self, name: impl Into<String>, column: Column) {
        self.columns.insert(name.into(), column);
    }

    /// Insert a column at the front, replacing any column with the same name
    pub fn insert_front(&mut self, name: impl Into<String>, column: Column) {
        let name = name.into();
        self.columns.shift_remove(&name);
        self.columns.insert(name.clone(), column);
        let last = self.columns.len() - 1;
        self.columns.move_index(last, 0);
    }

    /// Remove a column by name
    pub fn remove(&mut self, name: &str) -> Option<Column> {
        self.columns.shift_remove(name)
    }

    /// A copy of the table without the named column
    pub fn without_column(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.remove(name);
        copy
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Numeric rows of a column, if present and numeric
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).and_then(Column::as_numbers)
    }

    /// Whether the named column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in display order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows (length of the longest column)
    pub fn row_count(&self) -> usize {
        self.columns.values().map(Column::len).max().unwrap_or(0)
    }

    /// Whether the table has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
