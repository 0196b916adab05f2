use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input: {0}")]
    Read(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{policy} requires column '{column}' but the header does not contain it")]
    MissingColumn {
        policy: &'static str,
        column: String,
    },

    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("column '{0}' does not exist")]
    MissingColumn(String),

    #[error("row {row} has {found} values but the table has {expected} columns")]
    ShapeMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),
}
