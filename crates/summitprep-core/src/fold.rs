use serde::{Deserialize, Serialize};
use summitprep_parser::Table;
use tracing::{debug, warn};

use crate::merge::{merge, sort_by_timestamp, MergeError, MergeStats, Merged};

/// Which source keeps its rows when two sources share a timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// Sources earlier in the list win; the running result is the first
    /// argument of every merge.
    #[default]
    EarlierWins,
    /// Sources later in the list win; each new source is merged as the first
    /// argument against the running result.
    LaterWins,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTable {
    pub name: String,
    pub table: Table,
}

impl NamedTable {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldStep {
    pub source: String,
    pub stats: MergeStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Folded {
    Table { table: Table, steps: Vec<FoldStep> },
    NoSources,
    /// The named source had no rows, so the fold stopped without output.
    EmptySource { name: String },
}

impl Folded {
    pub fn into_table(self) -> Option<Table> {
        match self {
            Folded::Table { table, .. } => Some(table),
            Folded::NoSources | Folded::EmptySource { .. } => None,
        }
    }
}

/// Left-folds `sources` with [`merge`] in list order.
pub fn merge_all(
    sources: &[NamedTable],
    timestamp_column: &str,
    precedence: Precedence,
) -> Result<Folded, MergeError> {
    let Some((head, rest)) = sources.split_first() else {
        warn!("no sources to merge");
        return Ok(Folded::NoSources);
    };

    if let Some(empty) = sources.iter().find(|source| source.table.is_empty()) {
        warn!(source = %empty.name, "source is empty; nothing to merge");
        return Ok(Folded::EmptySource {
            name: empty.name.clone(),
        });
    }

    let mut acc = sort_by_timestamp(&head.table, timestamp_column)?;
    let mut steps = Vec::with_capacity(rest.len());

    for source in rest {
        let merged = match precedence {
            Precedence::EarlierWins => merge(&acc, &source.table, timestamp_column)?,
            Precedence::LaterWins => merge(&source.table, &acc, timestamp_column)?,
        };

        match merged {
            Merged::Table { table, stats } => {
                debug!(
                    source = %source.name,
                    rows = table.len(),
                    dropped_overlap = stats.dropped_overlap,
                    "folded source"
                );
                steps.push(FoldStep {
                    source: source.name.clone(),
                    stats,
                });
                acc = table;
            }
            Merged::EmptyInput(_) => {
                return Ok(Folded::EmptySource {
                    name: source.name.clone(),
                });
            }
        }
    }

    Ok(Folded::Table { table: acc, steps })
}
