use std::fs::File;
use std::io::Read;
use std::mem;
use std::path::Path;

use csv::{ByteRecord, StringRecord};
use tracing::{debug, warn};

use crate::errors::LoadError;
use crate::model::{LoadedTable, MalformedReason, MalformedRow, Table};
use crate::policy::{ColumnCount, Header, RowPolicy};

/// Loads a comma-separated file, skipping rows whose field count differs
/// from the header.
pub fn load(path: impl AsRef<Path>) -> Result<LoadedTable, LoadError> {
    Loader::new().load_path(path)
}

/// Reads delimited text into a [`Table`], reporting rows rejected by the
/// configured [`RowPolicy`] instead of failing on them.
#[derive(Debug, Clone)]
pub struct Loader<P = ColumnCount> {
    delimiter: u8,
    policy: P,
}

impl Default for Loader<ColumnCount> {
    fn default() -> Self {
        Self {
            delimiter: b',',
            policy: ColumnCount,
        }
    }
}

impl Loader<ColumnCount> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: RowPolicy> Loader<P> {
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn policy<Q: RowPolicy>(self, policy: Q) -> Loader<Q> {
        Loader {
            delimiter: self.delimiter,
            policy,
        }
    }

    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadedTable, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let loaded = self.load_reader(file)?;
        debug!(
            path = %path.display(),
            rows = loaded.table.len(),
            malformed = loaded.malformed_count(),
            "loaded table"
        );
        Ok(loaded)
    }

    pub fn load_str(&self, content: &str) -> Result<LoadedTable, LoadError> {
        self.load_reader(content.as_bytes())
    }

    pub fn load_reader<R: Read>(&self, mut reader: R) -> Result<LoadedTable, LoadError> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        self.load_bytes(&content)
    }

    fn load_bytes(&self, content: &[u8]) -> Result<LoadedTable, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(content);

        let mut record = ByteRecord::new();
        if !reader.read_byte_record(&mut record)? {
            return Ok(LoadedTable::default());
        }
        let header = header_from_record(&record);
        self.policy.validate_header(&header)?;

        let mut rows = Vec::new();
        let mut malformed = Vec::new();

        // the reader skips lines holding only a terminator without a trace
        let (leading, _) = blank_lines(content, 0, 1);
        let mut end = reader.position().clone();

        for line in leading {
            self.reject(&mut malformed, line, 0, blank_line(&header));
        }

        loop {
            let (blanks, line) = blank_lines(content, end.byte(), end.line());
            for blank in blanks {
                self.reject(&mut malformed, blank, 0, blank_line(&header));
            }

            if !reader.read_byte_record(&mut record)? {
                break;
            }
            end = reader.position().clone();
            let found = record.len();

            let verdict = match StringRecord::from_byte_record(mem::take(&mut record)) {
                Ok(_) if found != header.len() => Err(MalformedReason::FieldCount {
                    expected: header.len(),
                    found,
                }),
                Ok(record) => self.policy.check(&header, &record).map(|_| record),
                Err(_) => Err(MalformedReason::InvalidUtf8),
            };

            match verdict {
                Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
                Err(reason) => self.reject(&mut malformed, line, found, reason),
            }
        }

        let table = Table::new(header.into_names(), rows)?;
        Ok(LoadedTable { table, malformed })
    }

    fn reject(
        &self,
        malformed: &mut Vec<MalformedRow>,
        line: u64,
        found: usize,
        reason: MalformedReason,
    ) {
        warn!(
            line,
            found,
            policy = self.policy.name(),
            "skipping row {line}: {reason}"
        );
        malformed.push(MalformedRow {
            line,
            found,
            reason,
        });
    }
}

fn blank_line(header: &Header) -> MalformedReason {
    MalformedReason::FieldCount {
        expected: header.len(),
        found: 0,
    }
}

/// Scans the terminator bytes the reader discards before its next record.
///
/// `from` is a byte offset lying on line `line`. Returns the numbers of the
/// lines that hold nothing but `\r`/`\n`, and the line the next record (if
/// any) starts on. A `\n` that closes a line begun before `from` is the tail
/// of a CRLF terminator and not a blank line.
fn blank_lines(content: &[u8], from: u64, mut line: u64) -> (Vec<u64>, u64) {
    let from = usize::try_from(from).unwrap_or(usize::MAX);
    let mut at_line_start = from
        .checked_sub(1)
        .and_then(|idx| content.get(idx))
        .map_or(true, |&byte| byte == b'\n');
    let mut blanks = Vec::new();

    let gap = content.get(from..).unwrap_or_default();
    for &byte in gap.iter().take_while(|&&byte| byte == b'\r' || byte == b'\n') {
        if byte == b'\n' {
            if at_line_start {
                blanks.push(line);
            }
            line += 1;
            at_line_start = true;
        }
    }

    (blanks, line)
}

fn header_from_record(record: &ByteRecord) -> Header {
    Header::from_cells(record.iter().map(String::from_utf8_lossy))
}
