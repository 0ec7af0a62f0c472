//! Checks the table against its column definitions.

use super::Document;
use std::collections::{BTreeMap, BTreeSet};
use welltab_engine::engine::{ColumnDefinition, parse_number};

/// Outcome of [`Document::validate`].
///
/// Cell problems are listed per column header in `column_errors`; `errors`
/// holds problems with the table as a whole.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub error_rows: usize,
    pub column_errors: BTreeMap<String, Vec<String>>,
}

impl Document {
    /// Validate every cell against its column definition.
    ///
    /// Required cells must be non-blank. Cells of measured columns
    /// (pressure, temperature, flow rate, time) must be numbers within the
    /// definition's range. A required column more than half blank is an
    /// error for the whole column. Blank rows are warnings, not errors.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport {
            total_rows: self.table.row_count(),
            ..ValidationReport::default()
        };
        if !self.has_data() {
            report.errors.push("No data loaded".to_string());
            return report;
        }

        let mut bad_rows = BTreeSet::new();
        for (col, column) in self.table.columns().iter().enumerate() {
            let def = &column.definition;
            let mut messages = Vec::new();
            let mut blank = 0;
            for (row, text) in self.table.column_texts(col).enumerate() {
                match check_cell(def, text.trim()) {
                    CellCheck::Ok => {}
                    CellCheck::Blank => blank += 1,
                    CellCheck::MissingRequired => {
                        blank += 1;
                        messages.push(format!("Row {}: required value is missing", row + 1));
                        bad_rows.insert(row);
                    }
                    CellCheck::NotNumeric => {
                        messages.push(format!("Row {}: expected a number", row + 1));
                        bad_rows.insert(row);
                    }
                    CellCheck::OutOfRange(v) => {
                        messages.push(format!(
                            "Row {}: {} is outside [{}, {}]",
                            row + 1,
                            v,
                            def.min_value,
                            def.max_value
                        ));
                        bad_rows.insert(row);
                    }
                }
            }
            if def.is_required && blank * 2 > self.table.row_count() {
                let message = format!("Required column '{}' is more than 50% empty", column.header);
                report.errors.push(message.clone());
                messages.push(message);
            }
            if !messages.is_empty() {
                report
                    .column_errors
                    .entry(column.header.clone())
                    .or_default()
                    .extend(messages);
            }
        }

        for row in 0..self.table.row_count() {
            if self.table.row_texts(row).iter().all(|t| t.trim().is_empty()) {
                report.warnings.push(format!("Row {} is empty", row + 1));
            } else if bad_rows.contains(&row) {
                report.error_rows += 1;
            } else {
                report.valid_rows += 1;
            }
        }

        report.is_valid = report.errors.is_empty() && report.error_rows == 0;
        tracing::debug!(
            valid_rows = report.valid_rows,
            error_rows = report.error_rows,
            warnings = report.warnings.len(),
            "Validated table"
        );
        report
    }
}

enum CellCheck {
    Ok,
    Blank,
    MissingRequired,
    NotNumeric,
    OutOfRange(f64),
}

fn check_cell(def: &ColumnDefinition, text: &str) -> CellCheck {
    if text.is_empty() {
        return if def.is_required {
            CellCheck::MissingRequired
        } else {
            CellCheck::Blank
        };
    }
    if !def.column_type.is_measured() {
        return CellCheck::Ok;
    }
    match parse_number(text) {
        None => CellCheck::NotNumeric,
        Some(v) if !def.in_range(v) => CellCheck::OutOfRange(v),
        Some(_) => CellCheck::Ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use welltab_engine::engine::Table;

    fn doc(rows: &[[&str; 3]]) -> Document {
        let mut doc = Document::from_table(Table::from_rows(
            ["Time", "Pressure", "Remark"],
            rows.iter().map(|r| r.to_vec()),
        ));
        doc.infer_column_definitions();
        doc
    }

    #[test]
    fn test_clean_table_is_valid() {
        let report = doc(&[["0", "30", "start"], ["1", "29", ""]]).validate();
        assert!(report.is_valid);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.valid_rows, 2);
        assert!(report.column_errors.is_empty());
    }

    #[test]
    fn test_cell_errors_are_keyed_by_header() {
        let report = doc(&[["0", "abc", ""], ["1", "150", ""], ["2", "20", "x"]]).validate();
        assert!(!report.is_valid);
        assert_eq!(report.error_rows, 2);
        assert_eq!(report.valid_rows, 1);
        assert_eq!(
            report.column_errors["Pressure"],
            vec![
                "Row 1: expected a number".to_string(),
                "Row 2: 150 is outside [0, 100]".to_string()
            ]
        );
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_empty_rows_are_warnings() {
        let report = doc(&[["0", "30", ""], ["", " ", ""]]).validate();
        assert!(report.is_valid);
        assert_eq!(report.warnings, vec!["Row 2 is empty".to_string()]);
        assert_eq!(report.valid_rows, 1);
        assert_eq!(report.error_rows, 0);
    }

    #[test]
    fn test_required_column_mostly_empty() {
        let mut d = doc(&[["0", "30", ""], ["1", "", ""], ["2", "", ""]]);
        let mut def = d.column_definition(1).unwrap().clone();
        def.is_required = true;
        d.set_column_definition(1, def).unwrap();

        let report = d.validate();
        assert!(!report.is_valid);
        assert_eq!(report.error_rows, 2);
        assert_eq!(
            report.errors,
            vec!["Required column 'Pressure' is more than 50% empty".to_string()]
        );
        assert_eq!(report.column_errors["Pressure"].len(), 3);
    }

    #[test]
    fn test_no_data() {
        let report = Document::new().validate();
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec!["No data loaded".to_string()]);
    }
}
