use std::collections::HashSet;
use std::fmt;

use crate::errors::TableError;

/// Rows of string values sharing one fixed, ordered set of column names.
///
/// Every row holds exactly one value per column. Tables are never mutated in
/// place by the operations built on top of them; each one returns a new table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }

        for (row, values) in rows.iter().enumerate() {
            if values.len() != columns.len() {
                return Err(TableError::ShapeMismatch {
                    row,
                    expected: columns.len(),
                    found: values.len(),
                });
            }
        }

        Ok(Self { columns, rows })
    }

    /// A table with a header but no rows.
    pub fn with_columns(columns: Vec<String>) -> Result<Self, TableError> {
        Self::new(columns, Vec::new())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|values| values[idx].as_str())
    }

    pub fn column_values(&self, name: &str) -> Result<Vec<&str>, TableError> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|values| values[idx].as_str()).collect())
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.columns, self.rows)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    FieldCount { expected: usize, found: usize },
    InvalidTimestamp { column: String, value: String },
    InvalidUtf8,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::FieldCount { expected, found } => {
                write!(f, "incomplete row with {found} columns, expected {expected}")
            }
            MalformedReason::InvalidTimestamp { column, value } => {
                write!(f, "column '{column}' holds unparseable timestamp '{value}'")
            }
            MalformedReason::InvalidUtf8 => f.write_str("row is not valid UTF-8"),
        }
    }
}

/// A source line that was skipped during loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    /// 1-based line in the source on which the record starts.
    pub line: u64,
    /// Number of fields the record actually had.
    pub found: usize,
    pub reason: MalformedReason,
}

impl fmt::Display for MalformedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedTable {
    pub table: Table,
    pub malformed: Vec<MalformedRow>,
}

impl LoadedTable {
    pub fn malformed_count(&self) -> usize {
        self.malformed.len()
    }
}
