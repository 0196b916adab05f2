pub mod errors;
pub mod loader;
pub mod model;
pub mod policy;
pub mod timestamp;

pub use errors::{LoadError, TableError};
pub use loader::{load, Loader};
pub use model::{LoadedTable, MalformedReason, MalformedRow, Table};
pub use policy::{ColumnCount, Header, RowPolicy, TimestampColumn};
pub use timestamp::{format_timestamp, parse_timestamp};
