use super::Document;
use crate::error::{Result, WellTabError};
use welltab_engine::engine::{
    ColumnStatistics, DataType, RowFilter, column_statistics, detect_data_type,
};

impl Document {
    pub fn column_statistics(&self, col: usize) -> Result<ColumnStatistics> {
        column_statistics(&self.table, col).ok_or(WellTabError::ColumnOutOfRange {
            index: col,
            count: self.table.column_count(),
        })
    }

    /// Statistics for every column, in column order.
    pub fn all_statistics(&self) -> Vec<ColumnStatistics> {
        (0..self.table.column_count())
            .filter_map(|col| column_statistics(&self.table, col))
            .collect()
    }

    pub fn detect_data_type(&self, col: usize) -> Result<DataType> {
        self.check_column(col)?;
        Ok(detect_data_type(&self.table, col))
    }

    /// Rows containing a cell that matches the wildcard `pattern`.
    /// The table itself is not changed.
    pub fn filter_rows(&self, pattern: &str) -> Result<Vec<usize>> {
        let filter =
            RowFilter::wildcard(pattern).map_err(|e| WellTabError::InvalidFilter(e.to_string()))?;
        Ok(filter.visible_rows(&self.table))
    }
}
