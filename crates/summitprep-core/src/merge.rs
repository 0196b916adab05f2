use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;
use summitprep_parser::{format_timestamp, parse_timestamp, Table, TableError};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => f.write_str("first"),
            Side::Second => f.write_str("second"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptySide {
    First,
    Second,
    Both,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("{side} table has no column '{column}'")]
    MissingColumn { side: Side, column: String },

    #[error("{side} table row {row} has unparseable timestamp '{value}' in column '{column}'")]
    InvalidTimestamp {
        side: Side,
        row: usize,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Row accounting for a single merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub kept_first: usize,
    pub kept_second: usize,
    pub dropped_overlap: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Merged {
    Table { table: Table, stats: MergeStats },
    /// At least one input had no rows; nothing was produced.
    EmptyInput(EmptySide),
}

impl Merged {
    pub fn table(&self) -> Option<&Table> {
        match self {
            Merged::Table { table, .. } => Some(table),
            Merged::EmptyInput(_) => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Merged::Table { table, .. } => Some(table),
            Merged::EmptyInput(_) => None,
        }
    }

    pub fn is_empty_input(&self) -> bool {
        matches!(self, Merged::EmptyInput(_))
    }
}

/// Combines two time-indexed tables into one series sorted by
/// `timestamp_column`.
///
/// Every row of `first` is kept. Rows of `second` whose timestamp also
/// appears in `first` are dropped; the rest are appended and the result is
/// stable-sorted, so rows sharing a timestamp keep their relative order.
/// Duplicates inside a single table are left alone.
///
/// The output columns are `first`'s columns followed by any of `second`'s
/// that `first` lacks, padded with empty values. The timestamp column is
/// rewritten in the form produced by [`format_timestamp`].
pub fn merge(first: &Table, second: &Table, timestamp_column: &str) -> Result<Merged, MergeError> {
    if let Some(side) = empty_side(first, second) {
        warn!(?side, "one of the tables is empty; nothing to merge");
        return Ok(Merged::EmptyInput(side));
    }

    let first_keys = parse_keys(first, timestamp_column, Side::First)?;
    let second_keys = parse_keys(second, timestamp_column, Side::Second)?;
    let seen: HashSet<NaiveDateTime> = first_keys.iter().copied().collect();

    let columns = union_columns(first.columns(), second.columns());
    let first_map = column_map(&columns, first);
    let second_map = column_map(&columns, second);

    let mut stats = MergeStats {
        kept_first: first.len(),
        ..MergeStats::default()
    };
    let mut keyed: Vec<(NaiveDateTime, Vec<String>)> =
        Vec::with_capacity(first.len() + second.len());

    for (values, key) in first.rows().iter().zip(first_keys) {
        keyed.push((key, project(values, &first_map)));
    }
    for (values, key) in second.rows().iter().zip(second_keys) {
        if seen.contains(&key) {
            stats.dropped_overlap += 1;
            continue;
        }
        stats.kept_second += 1;
        keyed.push((key, project(values, &second_map)));
    }

    let key_idx = first.require_column(timestamp_column)?;
    let table = sorted_table(columns, keyed, key_idx)?;

    debug!(
        kept_first = stats.kept_first,
        kept_second = stats.kept_second,
        dropped_overlap = stats.dropped_overlap,
        "merged tables"
    );

    Ok(Merged::Table { table, stats })
}

/// Stable-sorts a single table by its timestamp column and normalizes the
/// column's text.
pub fn sort_by_timestamp(table: &Table, timestamp_column: &str) -> Result<Table, MergeError> {
    let keys = parse_keys(table, timestamp_column, Side::First)?;
    let key_idx = table.require_column(timestamp_column)?;
    let keyed = keys.into_iter().zip(table.rows().iter().cloned()).collect();
    sorted_table(table.columns().to_vec(), keyed, key_idx)
}

fn empty_side(first: &Table, second: &Table) -> Option<EmptySide> {
    match (first.is_empty(), second.is_empty()) {
        (true, true) => Some(EmptySide::Both),
        (true, false) => Some(EmptySide::First),
        (false, true) => Some(EmptySide::Second),
        (false, false) => None,
    }
}

pub(crate) fn parse_keys(
    table: &Table,
    column: &str,
    side: Side,
) -> Result<Vec<NaiveDateTime>, MergeError> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| MergeError::MissingColumn {
            side,
            column: column.to_string(),
        })?;

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(row, values)| {
            parse_timestamp(&values[idx]).ok_or_else(|| MergeError::InvalidTimestamp {
                side,
                row,
                column: column.to_string(),
                value: values[idx].clone(),
            })
        })
        .collect()
}

pub(crate) fn sorted_table(
    columns: Vec<String>,
    mut keyed: Vec<(NaiveDateTime, Vec<String>)>,
    key_idx: usize,
) -> Result<Table, MergeError> {
    // sort_by_key is stable
    keyed.sort_by_key(|(key, _)| *key);
    let rows = keyed
        .into_iter()
        .map(|(key, mut values)| {
            values[key_idx] = format_timestamp(key);
            values
        })
        .collect();
    Ok(Table::new(columns, rows)?)
}

fn union_columns(first: &[String], second: &[String]) -> Vec<String> {
    let mut columns = first.to_vec();
    for name in second {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }
    columns
}

fn column_map(columns: &[String], table: &Table) -> Vec<Option<usize>> {
    columns.iter().map(|name| table.column_index(name)).collect()
}

fn project(values: &[String], map: &[Option<usize>]) -> Vec<String> {
    map.iter()
        .map(|idx| idx.map(|i| values[i].clone()).unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
        .expect("valid table")
    }

    #[test]
    fn second_table_gains_union_columns() {
        let a = table(&["t", "x"], &[&["2022-01-01 00:00", "1"]]);
        let b = table(&["y", "t"], &[&["7", "2022-01-01 00:01"]]);

        let merged = merge(&a, &b, "t").unwrap().into_table().unwrap();
        assert_eq!(merged.columns(), ["t", "x", "y"]);
        assert_eq!(merged.row(0).unwrap(), ["2022-01-01 00:00:00", "1", ""]);
        assert_eq!(merged.row(1).unwrap(), ["2022-01-01 00:01:00", "", "7"]);
    }

    #[test]
    fn overlap_is_detected_across_timestamp_spellings() {
        let a = table(&["t", "v"], &[&["2022-01-01T00:01:00", "a"]]);
        let b = table(&["t", "v"], &[&["01/01/2022 00:01", "b"]]);

        let Merged::Table { table, stats } = merge(&a, &b, "t").unwrap() else {
            panic!("expected a merged table");
        };
        assert_eq!(table.len(), 1);
        assert_eq!(stats.dropped_overlap, 1);
        assert_eq!(table.get(0, "v"), Some("a"));
    }

    #[test]
    fn invalid_timestamp_names_side_and_row() {
        let a = table(&["t"], &[&["2022-01-01"]]);
        let b = table(&["t"], &[&["2022-01-02"], &["soon"]]);

        let err = merge(&a, &b, "t").unwrap_err();
        assert_eq!(
            err,
            MergeError::InvalidTimestamp {
                side: Side::Second,
                row: 1,
                column: "t".into(),
                value: "soon".into(),
            }
        );
    }
}
