//! Descriptive statistics over table columns.

use super::table::Table;
use super::value::{ValueKind, classify, parse_number};
use std::fmt;

/// Numeric summary of a set of values.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub minimum: f64,
    pub maximum: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (divides by N).
    pub std_dev: f64,
}

impl Summary {
    /// `None` for an empty slice.
    pub fn of(values: &[f64]) -> Option<Summary> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let mean = mean(&sorted);
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        Some(Summary {
            minimum: sorted[0],
            maximum: sorted[n - 1],
            mean,
            median,
            std_dev: population_std_dev(&sorted, mean),
        })
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Statistics for one column.
///
/// Cells are `valid` when non-empty after trimming. The column is numeric
/// when parseable cells outnumber the other non-empty cells, and only then
/// carries a [`Summary`].
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnStatistics {
    pub column_name: String,
    pub unit: String,
    pub data_count: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub summary: Option<Summary>,
}

impl ColumnStatistics {
    pub fn is_numeric(&self) -> bool {
        self.summary.is_some()
    }
}

pub fn column_statistics(table: &Table, col: usize) -> Option<ColumnStatistics> {
    let column = table.column(col)?;

    let mut numbers = Vec::new();
    let mut text_count = 0usize;
    let mut invalid_count = 0usize;
    for text in table.column_texts(col) {
        let text = text.trim();
        if text.is_empty() {
            invalid_count += 1;
        } else if let Some(v) = parse_number(text) {
            numbers.push(v);
        } else {
            text_count += 1;
        }
    }

    let summary = if numbers.len() > text_count {
        Summary::of(&numbers)
    } else {
        None
    };

    Some(ColumnStatistics {
        column_name: column.header.clone(),
        unit: column.definition.unit.clone(),
        data_count: table.row_count(),
        valid_count: numbers.len() + text_count,
        invalid_count,
        summary,
    })
}

/// Parseable values of a column with their row indices.
pub fn numeric_values(table: &Table, col: usize) -> Vec<(usize, f64)> {
    table
        .column_texts(col)
        .enumerate()
        .filter_map(|(row, text)| parse_number(text).map(|v| (row, v)))
        .collect()
}

/// Overall content type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Numeric,
    DateTime,
    Text,
    Mixed,
    Empty,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataType::Numeric => "numeric",
            DataType::DateTime => "datetime",
            DataType::Text => "text",
            DataType::Mixed => "mixed",
            DataType::Empty => "empty",
        })
    }
}

pub fn detect_data_type(table: &Table, col: usize) -> DataType {
    let mut seen: Option<ValueKind> = None;
    for text in table.column_texts(col) {
        let kind = classify(text);
        if kind == ValueKind::Empty {
            continue;
        }
        match seen {
            None => seen = Some(kind),
            Some(prev) if prev != kind => return DataType::Mixed,
            Some(_) => {}
        }
    }
    match seen {
        None | Some(ValueKind::Empty) => DataType::Empty,
        Some(ValueKind::Number) => DataType::Numeric,
        Some(ValueKind::DateTime) => DataType::DateTime,
        Some(ValueKind::Text) => DataType::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(values: &[&str]) -> Table {
        Table::from_rows(["v"], values.iter().map(|v| vec![*v]))
    }

    #[test]
    fn test_statistics_of_one_to_four() {
        let stats = column_statistics(&single(&["1", "2", "3", "4"]), 0).unwrap();
        let s = stats.summary.unwrap();
        assert_eq!(s.minimum, 1.0);
        assert_eq!(s.maximum, 4.0);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
        assert!((s.std_dev - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_odd_median_uses_middle() {
        let s = Summary::of(&[9.0, 1.0, 5.0]).unwrap();
        assert_eq!(s.median, 5.0);
    }

    #[test]
    fn test_counts_and_majority_vote() {
        let stats = column_statistics(&single(&["1", "", "x", "2", " "]), 0).unwrap();
        assert_eq!(stats.data_count, 5);
        assert_eq!(stats.valid_count, 3);
        assert_eq!(stats.invalid_count, 2);
        assert!(stats.is_numeric());

        let text = column_statistics(&single(&["a", "1", "b"]), 0).unwrap();
        assert!(!text.is_numeric());
        // ties are text
        let tie = column_statistics(&single(&["a", "1"]), 0).unwrap();
        assert!(!tie.is_numeric());
    }

    #[test]
    fn test_unknown_column() {
        assert!(column_statistics(&single(&["1"]), 3).is_none());
    }

    #[test]
    fn test_detect_data_type() {
        assert_eq!(detect_data_type(&single(&["1", "", "2.5"]), 0), DataType::Numeric);
        assert_eq!(detect_data_type(&single(&["2024-01-02", "10:00:00"]), 0), DataType::DateTime);
        assert_eq!(detect_data_type(&single(&["1", "x"]), 0), DataType::Mixed);
        assert_eq!(detect_data_type(&single(&["", " "]), 0), DataType::Empty);
        assert_eq!(detect_data_type(&single(&["open", "shut"]), 0), DataType::Text);
    }
}
