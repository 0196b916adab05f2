use summitprep_parser::{Table, TableError};
use tracing::warn;

const MISSING_MARKERS: &[&str] = &["nan", "null", "na", "n/a"];

/// True for empty cells and the usual textual null markers.
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || MISSING_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// Number of rows with at least one missing value.
pub fn count_incomplete_rows(table: &Table) -> usize {
    table
        .rows()
        .iter()
        .filter(|values| values.iter().any(|value| is_missing(value)))
        .count()
}

pub fn count_missing_by_column(table: &Table) -> Vec<(String, usize)> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let missing = table
                .rows()
                .iter()
                .filter(|values| is_missing(&values[idx]))
                .count();
            (name.clone(), missing)
        })
        .collect()
}

/// Returns a copy of `table` without `column`.
pub fn drop_column(table: &Table, column: &str) -> Result<Table, TableError> {
    drop_columns(table, &[column])
}

/// Returns a copy of `table` without any of `columns`. Fails on the first
/// name the table does not have, before building anything.
pub fn drop_columns<S: AsRef<str>>(table: &Table, columns: &[S]) -> Result<Table, TableError> {
    let mut dropped = Vec::with_capacity(columns.len());
    for column in columns {
        let column = column.as_ref();
        match table.column_index(column) {
            Some(idx) => dropped.push(idx),
            None => {
                warn!(column, "column does not exist; nothing dropped");
                return Err(TableError::MissingColumn(column.to_string()));
            }
        }
    }

    let keep: Vec<usize> = (0..table.width())
        .filter(|idx| !dropped.contains(idx))
        .collect();
    let names = keep.iter().map(|&idx| table.columns()[idx].clone()).collect();
    let rows = table
        .rows()
        .iter()
        .map(|values| keep.iter().map(|&idx| values[idx].clone()).collect())
        .collect();

    Table::new(names, rows)
}
