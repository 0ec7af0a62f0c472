//! Table engine API.
//!
//! - [`Table`], [`Column`] - Cell storage with one header and definition per column
//! - [`ColumnDefinition`], [`ColumnType`] - Column semantics and header inference
//! - [`Command`], [`History`] - Reversible edits and undo/redo with macros
//! - [`parse_number`], [`parse_date`], [`parse_time_of_day`] - Cell value parsing
//! - [`column_statistics`], [`detect_data_type`] - Descriptive statistics
//! - [`RowFilter`] - Wildcard row filtering
//! - [`CellRef`] - A1-style cell addresses

mod cell_ref;
mod column;
mod command;
mod filter;
mod history;
mod stats;
mod table;
mod value;

pub use cell_ref::CellRef;
pub use column::{Column, ColumnDefinition, ColumnType};
pub use command::{Command, EditOp};
pub use filter::RowFilter;
pub use history::{History, HistoryError, UndoEntry};
pub use stats::{
    ColumnStatistics, DataType, Summary, column_statistics, detect_data_type, mean,
    numeric_values, population_std_dev,
};
pub use table::{CellValue, Table};
pub use value::{
    DATE_FORMATS, TimeUnit, ValueKind, classify, format_fixed, parse_date, parse_number,
    parse_time_of_day, seconds_of_day,
};
