//! Generic data-table processing.
//!
//! - [`value`]: cell values, row identity and schemaless [`Record`] rows.
//! - [`column`]: column definitions with optional render/sort/filter capabilities.
//! - [`sort`]: sort state and the header-click cycle.
//! - [`pipeline`]: search, filter, sort and pagination.
//! - [`selection`]: row selection scoped to a row set.
//! - [`state`]: owned per-view table state tying the pieces together.
//! - [`export`]: CSV export of the processed rows.

pub mod column;
pub mod export;
pub mod pipeline;
pub mod selection;
pub mod sort;
pub mod state;
pub mod value;

pub use column::{Column, ColumnSet};
pub use export::{export_csv, CsvExport};
pub use pipeline::{paginate, process, Page, TableQuery};
pub use selection::SelectionSet;
pub use sort::{SortDirection, SortState};
pub use state::{TableState, TableView};
pub use value::{CellValue, Record, RowKey, TableRow};
