use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use summitprep_parser::{LoadError, Loader, Table, TableError, TimestampColumn};
use thiserror::Error;
use tracing::info;

use crate::align::outer_join_all;
use crate::export::{write_csv, ExportError, WriteOptions};
use crate::fold::{merge_all, Folded, NamedTable, Precedence};
use crate::merge::MergeError;
use crate::quality::{count_incomplete_rows, drop_columns};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to parse merge plan TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to load source '{source_name}': {error}")]
    Load {
        source_name: String,
        #[source]
        error: LoadError,
    },

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// One input file of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub path: PathBuf,
}

/// How a plan combines its sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    /// Stack exports of the same sensor, resolving overlaps by precedence.
    #[default]
    Fold,
    /// Align different sensors side by side on the timestamp.
    OuterJoin,
}

/// Everything a batch run needs: which files, in which order, what to drop
/// and where to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePlan {
    pub timestamp_column: String,
    #[serde(default)]
    pub mode: PlanMode,
    /// Only consulted in [`PlanMode::Fold`].
    #[serde(default)]
    pub precedence: Precedence,
    #[serde(default)]
    pub drop_columns: Vec<String>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub include_index: bool,
    /// Relative source and output paths resolve against this directory.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
}

impl MergePlan {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, PlanError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub name: String,
    pub rows: usize,
    pub malformed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    pub sources: Vec<SourceReport>,
    pub merged_rows: Option<usize>,
    pub incomplete_rows: Option<usize>,
    /// Set when a source had no rows and the run produced nothing.
    pub empty_source: Option<String>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRun {
    pub table: Option<Table>,
    pub report: PlanReport,
}

/// Loads every source, combines them in order according to the plan's
/// [`PlanMode`], drops the requested columns and writes the result when the
/// plan names an output.
pub fn run_plan(plan: &MergePlan) -> Result<PlanRun, PlanError> {
    let loader = Loader::new().policy(TimestampColumn::new(plan.timestamp_column.clone()));
    let mut report = PlanReport::default();
    let mut sources = Vec::with_capacity(plan.sources.len());

    for spec in &plan.sources {
        let path = plan.resolve(&spec.path);
        info!(source = %spec.name, path = %path.display(), "loading source");
        let loaded = loader.load_path(&path).map_err(|error| PlanError::Load {
            source_name: spec.name.clone(),
            error,
        })?;
        report.sources.push(SourceReport {
            name: spec.name.clone(),
            rows: loaded.table.len(),
            malformed: loaded.malformed_count(),
        });
        sources.push(NamedTable::new(spec.name.clone(), loaded.table));
    }

    if sources.is_empty() {
        return Ok(PlanRun {
            table: None,
            report,
        });
    }

    let merged = match plan.mode {
        PlanMode::OuterJoin => outer_join_all(&sources, &plan.timestamp_column)?,
        PlanMode::Fold => match merge_all(&sources, &plan.timestamp_column, plan.precedence)? {
            Folded::Table { table, .. } => table,
            Folded::EmptySource { name } => {
                report.empty_source = Some(name);
                return Ok(PlanRun {
                    table: None,
                    report,
                });
            }
            Folded::NoSources => {
                return Ok(PlanRun {
                    table: None,
                    report,
                });
            }
        },
    };

    let table = drop_columns(&merged, &plan.drop_columns)?;
    report.merged_rows = Some(table.len());
    report.incomplete_rows = Some(count_incomplete_rows(&table));

    if let Some(output) = &plan.output {
        let path = plan.resolve(output);
        let options = WriteOptions {
            include_index: plan.include_index,
            ..WriteOptions::default()
        };
        write_csv(&table, &path, &options)?;
        report.output = Some(path);
    }

    info!(
        rows = table.len(),
        incomplete = report.incomplete_rows.unwrap_or_default(),
        "plan finished"
    );

    Ok(PlanRun {
        table: Some(table),
        report,
    })
}
