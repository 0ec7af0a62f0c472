//! UI-agnostic core of welltab: the document model, file formats, derived
//! well-test columns, cleaning, validation and project parameters.

pub mod derivative;
pub mod document;
pub mod error;
pub mod project;
pub mod storage;

pub use derivative::{DerivativeOutput, PressureDerivativeCalculator, PressureDerivativeConfig};
pub use document::{
    CleaningOptions, CleaningReport, DerivedColumn, Document, FillMethod, TimeConversionConfig,
    TimeSource, ValidationReport,
};
pub use error::{Result, WellTabError};
pub use project::ProjectContext;
pub use storage::{ExportFormat, FileFormat, ImportOptions, LoadConfig};
