//! Error types for welltab core.

use thiserror::Error;
use welltab_engine::engine::HistoryError;

/// Errors reported by document, storage and project operations.
///
/// Cells that fail to parse are never errors: they are left empty or skipped.
#[derive(Error, Debug)]
pub enum WellTabError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File is empty")]
    EmptyFile,

    #[error("Start row {start_row} exceeds the {line_count} lines in the file")]
    StartRowOutOfRange { start_row: usize, line_count: usize },

    #[error("Cannot determine the column structure")]
    NoColumns,

    #[error("Invalid JSON data: {0}")]
    InvalidJson(String),

    #[error("Cannot read {0} as delimited text; save it as CSV and try again")]
    NotDelimited(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("No {0} column found")]
    ColumnNotFound(&'static str),

    #[error("Column {index} is out of range (table has {count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("At least {required} rows are needed, found {actual}")]
    NotEnoughRows { required: usize, actual: usize },

    #[error("No row has a valid time value to use as the baseline")]
    NoBaseline,

    #[error("No data loaded")]
    NoData,

    #[error("Invalid filter pattern: {0}")]
    InvalidFilter(String),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("No file path set")]
    NoFilePath,

    #[error("No project is open")]
    NoProjectLoaded,

    #[error("Pressure derivative failed: {0}")]
    Derivative(String),
}

pub type Result<T> = std::result::Result<T, WellTabError>;
