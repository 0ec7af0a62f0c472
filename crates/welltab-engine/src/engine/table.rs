//! Dense, row-major table of text cells.

use super::column::{Column, ColumnDefinition};

/// A single cell: `None` is an unset cell, read back as `""`.
pub type CellValue = Option<String>;

/// Headers, column definitions and text cells.
///
/// Every row always holds exactly [`Table::column_count`] cells. Structural
/// edits return `false`/`None` when an index is out of range and leave the
/// table untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(columns: Vec<Column>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Convenience constructor: headers get custom definitions.
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut table = Table::with_columns(headers.into_iter().map(Column::new).collect());
        for row in rows {
            table.push_row(row.into_iter().map(Into::into).collect());
        }
        table
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, col: usize) -> Option<&Column> {
        self.columns.get(col)
    }

    pub fn column_mut(&mut self, col: usize) -> Option<&mut Column> {
        self.columns.get_mut(col)
    }

    pub fn header(&self, col: usize) -> Option<&str> {
        self.columns.get(col).map(|c| c.header.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.header.as_str())
    }

    pub fn definition(&self, col: usize) -> Option<&ColumnDefinition> {
        self.columns.get(col).map(|c| &c.definition)
    }

    /// Cell text, `""` for unset or out-of-range cells.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.cell_value(row, col).map(String::as_str).unwrap_or("")
    }

    /// Raw cell state, distinguishing unset from empty text.
    pub fn cell_value(&self, row: usize, col: usize) -> Option<&String> {
        self.rows.get(row)?.get(col)?.as_ref()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows.len() && col < self.columns.len()
    }

    /// Replace a cell and return its previous state, or `None` when out of range.
    pub fn replace_cell(&mut self, row: usize, col: usize, value: CellValue) -> Option<CellValue> {
        let slot = self.rows.get_mut(row)?.get_mut(col)?;
        Some(std::mem::replace(slot, value))
    }

    pub fn row(&self, row: usize) -> Option<&[CellValue]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Text of each cell in a row.
    pub fn row_texts(&self, row: usize) -> Vec<&str> {
        (0..self.column_count()).map(|col| self.cell(row, col)).collect()
    }

    /// Text of each cell in a column.
    pub fn column_texts(&self, col: usize) -> impl Iterator<Item = &str> {
        (0..self.row_count()).map(move |row| self.cell(row, col))
    }

    /// Append a row of text, padded or truncated to the column count.
    pub fn push_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.columns.len(), String::new());
        self.rows.push(cells.into_iter().map(Some).collect());
    }

    pub fn insert_row(&mut self, at: usize, mut cells: Vec<CellValue>) -> bool {
        if at > self.rows.len() {
            return false;
        }
        cells.resize(self.columns.len(), None);
        self.rows.insert(at, cells);
        true
    }

    pub fn remove_row(&mut self, at: usize) -> Option<Vec<CellValue>> {
        if at >= self.rows.len() {
            return None;
        }
        Some(self.rows.remove(at))
    }

    pub fn insert_column(&mut self, at: usize, column: Column, mut cells: Vec<CellValue>) -> bool {
        if at > self.columns.len() {
            return false;
        }
        cells.resize(self.rows.len(), None);
        self.columns.insert(at, column);
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.insert(at, cell);
        }
        true
    }

    pub fn remove_column(&mut self, at: usize) -> Option<(Column, Vec<CellValue>)> {
        if at >= self.columns.len() {
            return None;
        }
        let column = self.columns.remove(at);
        let cells = self.rows.iter_mut().map(|row| row.remove(at)).collect();
        Some((column, cells))
    }

    /// Index of the first column matching `pred`.
    pub fn find_column(&self, pred: impl Fn(&Column) -> bool) -> Option<usize> {
        self.columns.iter().position(pred)
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(["a", "b"], [vec!["1", "2"], vec!["3", "4"]])
    }

    #[test]
    fn test_push_row_pads_and_truncates() {
        let mut t = Table::from_rows(["a", "b", "c"], Vec::<Vec<&str>>::new());
        t.push_row(vec!["1".into()]);
        t.push_row(vec!["1".into(), "2".into(), "3".into(), "4".into()]);
        assert_eq!(t.row_texts(0), vec!["1", "", ""]);
        assert_eq!(t.row_texts(1), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_unset_cells_read_as_empty() {
        let mut t = sample();
        t.replace_cell(0, 1, None);
        assert_eq!(t.cell(0, 1), "");
        assert!(t.cell_value(0, 1).is_none());
        assert_eq!(t.cell(9, 9), "");
    }

    #[test]
    fn test_insert_and_remove_column_keeps_rows_aligned() {
        let mut t = sample();
        assert!(t.insert_column(1, Column::new("mid"), vec![Some("x".into())]));
        assert_eq!(t.headers().collect::<Vec<_>>(), vec!["a", "mid", "b"]);
        assert_eq!(t.row_texts(0), vec!["1", "x", "2"]);
        assert_eq!(t.row_texts(1), vec!["3", "", "4"]);

        let (col, cells) = t.remove_column(1).unwrap();
        assert_eq!(col.header, "mid");
        assert_eq!(cells, vec![Some("x".to_string()), None]);
        assert_eq!(t, sample());
    }

    #[test]
    fn test_out_of_range_structural_edits_are_rejected() {
        let mut t = sample();
        assert!(!t.insert_row(5, Vec::new()));
        assert!(t.remove_row(2).is_none());
        assert!(!t.insert_column(3, Column::new("z"), Vec::new()));
        assert!(t.remove_column(2).is_none());
        assert!(t.replace_cell(0, 2, Some("x".into())).is_none());
        assert_eq!(t, sample());
    }
}
