use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use summitprep_parser::Table;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub delimiter: u8,
    /// Prefix each row with its 0-based position under an unnamed column.
    pub include_index: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            include_index: false,
        }
    }
}

pub fn write_csv(
    table: &Table,
    path: impl AsRef<Path>,
    options: &WriteOptions,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv_to(table, file, options)?;
    info!(path = %path.display(), rows = table.len(), "wrote table");
    Ok(())
}

pub fn write_csv_to<W: Write>(
    table: &Table,
    writer: W,
    options: &WriteOptions,
) -> Result<(), ExportError> {
    if table.width() == 0 {
        return Ok(());
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(writer);

    if options.include_index {
        let header = table.columns().iter().map(String::as_str);
        writer.write_record(std::iter::once("").chain(header))?;
        for (idx, values) in table.rows().iter().enumerate() {
            let index = idx.to_string();
            writer.write_record(
                std::iter::once(index.as_str()).chain(values.iter().map(String::as_str)),
            )?;
        }
    } else {
        writer.write_record(table.columns())?;
        for values in table.rows() {
            writer.write_record(values)?;
        }
    }

    writer.flush()?;
    Ok(())
}
