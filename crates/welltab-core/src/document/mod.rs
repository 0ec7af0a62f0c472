//! The editable document and everything that changes it.
//!
//! - [`Document`] - Table, undo history and file state
//! - `io` - Load, save, export and definition presets
//! - `derived` - Elapsed time, pressure drop and pressure derivative columns
//! - `clean` - Empty/duplicate removal, fills, outliers and number formatting
//! - `validate` - Checks against column definitions
//! - `analysis` - Statistics, data types and row filtering

mod analysis;
mod clean;
mod derived;
mod io;
mod ops;
mod state;
mod validate;

pub use clean::{CleaningOptions, CleaningReport, FillMethod};
pub use derived::{DerivedColumn, TimeConversionConfig, TimeSource};
pub use state::Document;
pub use validate::ValidationReport;
