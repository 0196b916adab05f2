use std::collections::HashMap;

use chrono::NaiveDateTime;
use summitprep_parser::Table;

use crate::fold::NamedTable;
use crate::merge::{parse_keys, sort_by_timestamp, sorted_table, MergeError, Side};

/// Aligns two sensor tables side by side on a shared timestamp column.
///
/// The output holds the key, then `left`'s other columns, then `right`'s.
/// Names present on both sides get `_x` (left) and `_y` (right) suffixes.
/// A timestamp found on both sides yields one row per matching pair;
/// unmatched rows are padded with empty values. Rows are stable-sorted by
/// timestamp.
pub fn outer_join(left: &Table, right: &Table, timestamp_column: &str) -> Result<Table, MergeError> {
    if is_blank(left) && is_blank(right) {
        return Ok(Table::default());
    }
    if is_blank(left) {
        return sort_by_timestamp(right, timestamp_column);
    }
    if is_blank(right) {
        return sort_by_timestamp(left, timestamp_column);
    }

    let left_keys = parse_keys(left, timestamp_column, Side::First)?;
    let right_keys = parse_keys(right, timestamp_column, Side::Second)?;

    let left_cols = value_columns(left, timestamp_column);
    let right_cols = value_columns(right, timestamp_column);

    let mut columns = Vec::with_capacity(1 + left_cols.len() + right_cols.len());
    columns.push(timestamp_column.to_string());
    for &idx in &left_cols {
        columns.push(suffixed(left, right, idx, "_x"));
    }
    for &idx in &right_cols {
        columns.push(suffixed(right, left, idx, "_y"));
    }

    let mut right_index: HashMap<NaiveDateTime, Vec<usize>> = HashMap::new();
    for (row, key) in right_keys.iter().enumerate() {
        right_index.entry(*key).or_default().push(row);
    }

    let combine = |l: Option<usize>, r: Option<usize>| -> Vec<String> {
        let mut values = Vec::with_capacity(columns.len());
        values.push(String::new());
        for &idx in &left_cols {
            values.push(l.map(|row| left.rows()[row][idx].clone()).unwrap_or_default());
        }
        for &idx in &right_cols {
            values.push(r.map(|row| right.rows()[row][idx].clone()).unwrap_or_default());
        }
        values
    };

    let mut matched = vec![false; right.len()];
    let mut keyed = Vec::with_capacity(left.len().max(right.len()));

    for (l, key) in left_keys.iter().enumerate() {
        match right_index.get(key) {
            Some(partners) => {
                for &r in partners {
                    matched[r] = true;
                    keyed.push((*key, combine(Some(l), Some(r))));
                }
            }
            None => keyed.push((*key, combine(Some(l), None))),
        }
    }
    for (r, key) in right_keys.iter().enumerate() {
        if !matched[r] {
            keyed.push((*key, combine(None, Some(r))));
        }
    }

    sorted_table(columns, keyed, 0)
}

/// Outer-joins every table in order, left to right.
pub fn outer_join_all(tables: &[NamedTable], timestamp_column: &str) -> Result<Table, MergeError> {
    let mut acc = Table::default();
    for source in tables {
        acc = outer_join(&acc, &source.table, timestamp_column)?;
    }
    Ok(acc)
}

// A table without a header, as loaded from an empty file.
fn is_blank(table: &Table) -> bool {
    table.is_empty() && table.width() == 0
}

fn value_columns(table: &Table, timestamp_column: &str) -> Vec<usize> {
    table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| name.as_str() != timestamp_column)
        .map(|(idx, _)| idx)
        .collect()
}

fn suffixed(table: &Table, other: &Table, idx: usize, suffix: &str) -> String {
    let name = &table.columns()[idx];
    if other.has_column(name) {
        format!("{name}{suffix}")
    } else {
        name.clone()
    }
}
