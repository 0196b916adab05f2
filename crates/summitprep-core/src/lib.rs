pub mod align;
pub mod export;
pub mod fold;
pub mod frame;
pub mod merge;
pub mod plan;
pub mod quality;

pub use align::{outer_join, outer_join_all};
pub use export::{write_csv, write_csv_to, ExportError, WriteOptions};
pub use fold::{merge_all, FoldStep, Folded, NamedTable, Precedence};
pub use frame::{to_dataframe, FrameError};
pub use merge::{merge, sort_by_timestamp, EmptySide, MergeError, MergeStats, Merged, Side};
pub use plan::{
    run_plan, MergePlan, PlanError, PlanMode, PlanReport, PlanRun, SourceReport, SourceSpec,
};
pub use quality::{
    count_incomplete_rows, count_missing_by_column, drop_column, drop_columns, is_missing,
};
