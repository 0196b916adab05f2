use polars::prelude::*;
use summitprep_parser::{parse_timestamp, Table, TableError};
use thiserror::Error;

use crate::quality::is_missing;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("row {row} has unparseable timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },
}

/// Converts a cleaned table into a DataFrame for downstream analysis.
///
/// The timestamp column becomes `Datetime(Microseconds)`. A column whose
/// present values all parse as numbers becomes `Float64`; anything else stays
/// a string column. Missing values are null either way.
pub fn to_dataframe(table: &Table, timestamp_column: &str) -> Result<DataFrame, FrameError> {
    let ts_idx = table.require_column(timestamp_column)?;
    let mut columns: Vec<Column> = Vec::with_capacity(table.width());

    for (idx, name) in table.columns().iter().enumerate() {
        if idx == ts_idx {
            let micros = table
                .rows()
                .iter()
                .enumerate()
                .map(|(row, values)| {
                    parse_timestamp(&values[idx])
                        .map(|ts| ts.and_utc().timestamp_micros())
                        .ok_or_else(|| FrameError::InvalidTimestamp {
                            row,
                            value: values[idx].clone(),
                        })
                })
                .collect::<Result<Vec<i64>, _>>()?;
            let series = Series::new(name.as_str().into(), micros)
                .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
            columns.push(series.into());
            continue;
        }

        let raw: Vec<Option<&str>> = table
            .rows()
            .iter()
            .map(|values| Some(values[idx].as_str()).filter(|v| !is_missing(v)))
            .collect();

        let series = match parse_numeric(&raw) {
            Some(numbers) => Series::new(name.as_str().into(), numbers),
            None => Series::new(name.as_str().into(), raw),
        };
        columns.push(series.into());
    }

    Ok(DataFrame::new(columns)?)
}

fn parse_numeric(values: &[Option<&str>]) -> Option<Vec<Option<f64>>> {
    values
        .iter()
        .map(|value| match value {
            Some(text) => text.trim().parse::<f64>().ok().map(Some),
            None => Some(None),
        })
        .collect()
}
