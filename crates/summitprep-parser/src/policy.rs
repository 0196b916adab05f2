use csv::StringRecord;

use crate::errors::LoadError;
use crate::model::MalformedReason;
use crate::timestamp::parse_timestamp;

/// Column names fixed by the first line of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    /// Builds a header from raw cells: whitespace and a leading BOM are
    /// stripped and repeated names get a `.1`, `.2`, ... suffix.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = Vec::new();
        for (idx, cell) in cells.into_iter().enumerate() {
            let mut name = cell.as_ref();
            if idx == 0 {
                name = name.trim_start_matches('\u{feff}');
            }
            let base = name.trim().to_string();

            let mut candidate = base.clone();
            let mut suffix = 1;
            while names.contains(&candidate) {
                candidate = format!("{base}.{suffix}");
                suffix += 1;
            }
            names.push(candidate);
        }
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

/// Decides whether a record read from a source becomes a table row.
///
/// The loader always enforces the header's column count before asking the
/// policy, so implementations only add rules on top of a well-shaped record.
pub trait RowPolicy {
    fn name(&self) -> &'static str;

    /// Rejects headers the policy can never accept rows for.
    fn validate_header(&self, _header: &Header) -> Result<(), LoadError> {
        Ok(())
    }

    fn check(&self, header: &Header, record: &StringRecord) -> Result<(), MalformedReason>;
}

/// Adds no rule beyond the field count the loader checks for every policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnCount;

impl ColumnCount {
    pub const NAME: &'static str = "column_count";
}

impl RowPolicy for ColumnCount {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, _header: &Header, _record: &StringRecord) -> Result<(), MalformedReason> {
        Ok(())
    }
}

/// Also requires a parseable timestamp in the named column.
#[derive(Debug, Clone)]
pub struct TimestampColumn {
    column: String,
}

impl TimestampColumn {
    pub const NAME: &'static str = "timestamp_column";

    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl RowPolicy for TimestampColumn {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_header(&self, header: &Header) -> Result<(), LoadError> {
        match header.index_of(&self.column) {
            Some(_) => Ok(()),
            None => Err(LoadError::MissingColumn {
                policy: Self::NAME,
                column: self.column.clone(),
            }),
        }
    }

    fn check(&self, header: &Header, record: &StringRecord) -> Result<(), MalformedReason> {
        let value = header
            .index_of(&self.column)
            .and_then(|idx| record.get(idx))
            .unwrap_or_default();
        match parse_timestamp(value) {
            Some(_) => Ok(()),
            None => Err(MalformedReason::InvalidTimestamp {
                column: self.column.clone(),
                value: value.to_string(),
            }),
        }
    }
}
