//! Data cleaning. Every operation is a single undo step.

use super::Document;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use welltab_engine::engine::{
    Command, format_fixed, mean, numeric_values, parse_number, population_std_dev,
};

/// Joins cells into a row signature; unlikely to occur in logger output.
const SIGNATURE_SEPARATOR: &str = "\u{1f}";

/// How empty cells are filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMethod {
    /// `"0"`
    Zero,
    /// Mean of the numeric cells in the column.
    Average,
    /// Linear between the nearest numeric rows above and below.
    #[default]
    Interpolation,
    /// Copy the nearest non-empty cell above.
    Forward,
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FillMethod::Zero => "zero",
            FillMethod::Average => "average",
            FillMethod::Interpolation => "interpolation",
            FillMethod::Forward => "forward",
        })
    }
}

impl FromStr for FillMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero" => Ok(FillMethod::Zero),
            "average" | "mean" => Ok(FillMethod::Average),
            "interpolation" | "interpolate" | "linear" => Ok(FillMethod::Interpolation),
            "forward" | "ffill" => Ok(FillMethod::Forward),
            other => Err(format!("Unknown fill method: {}", other)),
        }
    }
}

/// Steps run by [`Document::clean`], in this order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CleaningOptions {
    pub remove_empty_rows: bool,
    pub remove_empty_columns: bool,
    pub remove_duplicates: bool,
    pub fill: Option<FillMethod>,
    /// Clear cells further than this many standard deviations from the mean.
    pub outlier_threshold: Option<f64>,
    pub standardize: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub empty_rows_removed: usize,
    pub empty_columns_removed: usize,
    pub duplicates_removed: usize,
    pub cells_filled: usize,
    pub outliers_cleared: usize,
    pub cells_standardized: usize,
}

impl CleaningReport {
    pub fn total(&self) -> usize {
        self.empty_rows_removed
            + self.empty_columns_removed
            + self.duplicates_removed
            + self.cells_filled
            + self.outliers_cleared
            + self.cells_standardized
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

impl Document {
    /// Delete rows whose cells are all blank. Returns the number removed.
    pub fn remove_empty_rows(&mut self) -> Result<usize> {
        let empty: Vec<usize> = (0..self.table.row_count())
            .filter(|&row| self.table.row_texts(row).into_iter().all(is_blank))
            .collect();
        let removed = self.delete_rows_as("Remove empty rows", &empty)?;
        tracing::debug!(removed, "Removed empty rows");
        Ok(removed)
    }

    /// Delete columns whose cells are all blank. Returns the number removed.
    pub fn remove_empty_columns(&mut self) -> Result<usize> {
        let empty: Vec<usize> = (0..self.table.column_count())
            .filter(|&col| self.table.column_texts(col).all(is_blank))
            .collect();
        let removed = self.delete_columns_as("Remove empty columns", &empty)?;
        tracing::debug!(removed, "Removed empty columns");
        Ok(removed)
    }

    /// Delete every row whose trimmed cells repeat an earlier row.
    pub fn remove_duplicate_rows(&mut self) -> Result<usize> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for row in 0..self.table.row_count() {
            let signature = self
                .table
                .row_texts(row)
                .iter()
                .map(|t| t.trim())
                .collect::<Vec<_>>()
                .join(SIGNATURE_SEPARATOR);
            if !seen.insert(signature) {
                duplicates.push(row);
            }
        }
        let removed = self.delete_rows_as("Remove duplicate rows", &duplicates)?;
        tracing::debug!(removed, "Removed duplicate rows");
        Ok(removed)
    }

    /// Fill blank cells of every column that holds at least one number.
    /// Returns the number of cells filled.
    pub fn fill_missing_values(&mut self, method: FillMethod) -> Result<usize> {
        self.transaction("Fill missing values", |doc| {
            let mut filled = 0;
            for col in 0..doc.table.column_count() {
                let known = numeric_values(&doc.table, col);
                if known.is_empty() {
                    continue;
                }
                let average = {
                    let values: Vec<f64> = known.iter().map(|&(_, v)| v).collect();
                    mean(&values)
                };
                for row in 0..doc.table.row_count() {
                    if !is_blank(doc.table.cell(row, col)) {
                        continue;
                    }
                    let value = match method {
                        FillMethod::Zero => Some("0".to_string()),
                        FillMethod::Average => Some(format_fixed(average, 3)),
                        FillMethod::Interpolation => {
                            interpolate(&known, row).map(|v| format_fixed(v, 3))
                        }
                        FillMethod::Forward => (0..row)
                            .rev()
                            .map(|r| doc.table.cell(r, col))
                            .find(|t| !is_blank(t))
                            .map(str::to_string),
                    };
                    if let Some(text) = value {
                        let cmd = Command::set_cell(&doc.table, row, col, text);
                        doc.execute(cmd);
                        filled += 1;
                    }
                }
            }
            tracing::debug!(filled, %method, "Filled missing values");
            Ok(filled)
        })
    }

    /// Clear numeric cells with `|v - mean| > threshold * std_dev`, per column
    /// with at least three numbers. Returns the number of cells cleared.
    pub fn remove_outliers(&mut self, threshold: f64) -> Result<usize> {
        self.transaction("Remove outliers", |doc| {
            let mut cleared = 0;
            for col in 0..doc.table.column_count() {
                let known = numeric_values(&doc.table, col);
                if known.len() < 3 {
                    continue;
                }
                let values: Vec<f64> = known.iter().map(|&(_, v)| v).collect();
                let mean = mean(&values);
                let limit = threshold * population_std_dev(&values, mean);
                for (row, v) in known {
                    if (v - mean).abs() > limit {
                        let cmd = Command::set_cell(&doc.table, row, col, String::new());
                        doc.execute(cmd);
                        cleared += 1;
                    }
                }
            }
            tracing::debug!(cleared, threshold, "Cleared outliers");
            Ok(cleared)
        })
    }

    /// Rewrite numbers in measured columns (pressure, temperature, flow
    /// rate, time) with the column's decimal places. Returns the number of
    /// cells changed.
    pub fn standardize_format(&mut self) -> Result<usize> {
        self.transaction("Standardize format", |doc| {
            let mut changed = 0;
            for col in 0..doc.table.column_count() {
                let definition = match doc.table.definition(col) {
                    Some(def) if def.column_type.is_measured() => def,
                    _ => continue,
                };
                let decimals = definition.decimal_places;
                let updates: Vec<(usize, String)> = doc
                    .table
                    .column_texts(col)
                    .enumerate()
                    .filter_map(|(row, text)| {
                        let formatted = format_fixed(parse_number(text)?, decimals);
                        (formatted != text).then_some((row, formatted))
                    })
                    .collect();
                for (row, text) in updates {
                    let cmd = Command::set_cell(&doc.table, row, col, text);
                    doc.execute(cmd);
                    changed += 1;
                }
            }
            Ok(changed)
        })
    }

    /// Run the selected steps as one undo step.
    pub fn clean(
        &mut self,
        options: &CleaningOptions,
        progress: &mut dyn FnMut(u8, &str),
    ) -> Result<CleaningReport> {
        let report = self.transaction("Clean data", |doc| {
            let mut report = CleaningReport::default();
            if options.remove_empty_rows {
                progress(10, "Removing empty rows");
                report.empty_rows_removed = doc.remove_empty_rows()?;
            }
            if options.remove_empty_columns {
                progress(25, "Removing empty columns");
                report.empty_columns_removed = doc.remove_empty_columns()?;
            }
            if options.remove_duplicates {
                progress(40, "Removing duplicate rows");
                report.duplicates_removed = doc.remove_duplicate_rows()?;
            }
            if let Some(method) = options.fill {
                progress(55, "Filling missing values");
                report.cells_filled = doc.fill_missing_values(method)?;
            }
            if let Some(threshold) = options.outlier_threshold {
                progress(70, "Clearing outliers");
                report.outliers_cleared = doc.remove_outliers(threshold)?;
            }
            if options.standardize {
                progress(85, "Standardizing number format");
                report.cells_standardized = doc.standardize_format()?;
            }
            Ok(report)
        })?;
        progress(100, "Cleaning finished");
        tracing::info!(?report, "Cleaned data");
        Ok(report)
    }
}

/// Linear interpolation over `known` (sorted by row) at `row`; the nearest
/// known value past either end.
fn interpolate(known: &[(usize, f64)], row: usize) -> Option<f64> {
    let next = known.partition_point(|&(r, _)| r < row);
    let before = next.checked_sub(1).and_then(|i| known.get(i));
    let after = known.get(next);
    match (before, after) {
        (Some(&(r0, v0)), Some(&(r1, v1))) => {
            let t = (row - r0) as f64 / (r1 - r0) as f64;
            Some(v0 + (v1 - v0) * t)
        }
        (Some(&(_, v)), None) | (None, Some(&(_, v))) => Some(v),
        (None, None) => None,
    }
}
