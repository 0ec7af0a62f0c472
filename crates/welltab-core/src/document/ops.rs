use super::Document;
use crate::error::{Result, WellTabError};
use welltab_engine::engine::{CellRef, Column, ColumnDefinition, Command};

impl Document {
    /// Run `cmd` through the history.
    pub(crate) fn execute(&mut self, cmd: Command) -> bool {
        let label = cmd.label();
        let applied = self.history.push(&mut self.table, cmd);
        if applied {
            self.modified = true;
        } else {
            tracing::warn!(command = %label, "Index out of range; command ignored");
        }
        applied
    }

    /// Group every edit made by `f` into one undo step. If `f` fails, the
    /// edits it made are reverted and the error is returned.
    pub fn transaction<T>(
        &mut self,
        label: &str,
        f: impl FnOnce(&mut Document) -> Result<T>,
    ) -> Result<T> {
        self.history.begin_macro(label);
        match f(self) {
            Ok(value) => {
                self.history.end_macro()?;
                Ok(value)
            }
            Err(e) => {
                self.history.abort_macro(&mut self.table)?;
                tracing::debug!(transaction = label, error = %e, "Transaction rolled back");
                Err(e)
            }
        }
    }

    /// Set a cell's text. Returns `false` when the cell is outside the table.
    pub fn set_cell(&mut self, row: usize, col: usize, text: &str) -> bool {
        let cmd = Command::set_cell(&self.table, row, col, text);
        self.execute(cmd)
    }

    pub fn set_cell_at(&mut self, cell: CellRef, text: &str) -> bool {
        self.set_cell(cell.row, cell.col, text)
    }

    /// Insert an empty row before `at` (`at == row_count` appends).
    pub fn insert_row(&mut self, at: usize) -> bool {
        self.execute(Command::insert_row(at))
    }

    /// Delete rows as one undo step, highest index first. Returns the number deleted.
    pub fn delete_rows(&mut self, rows: &[usize]) -> Result<usize> {
        self.delete_rows_as("Delete rows", rows)
    }

    pub(crate) fn delete_rows_as(&mut self, label: &str, rows: &[usize]) -> Result<usize> {
        let mut rows: Vec<usize> = rows
            .iter()
            .copied()
            .filter(|&r| r < self.table.row_count())
            .collect();
        rows.sort_unstable_by(|a, b| b.cmp(a));
        rows.dedup();
        if rows.is_empty() {
            return Ok(0);
        }
        self.transaction(label, |doc| {
            for &row in &rows {
                doc.execute(Command::delete_row(row));
            }
            Ok(rows.len())
        })
    }

    /// Insert a column before `at` (`at == column_count` appends).
    pub fn insert_column(&mut self, at: usize, column: Column) -> bool {
        self.execute(Command::insert_column(at, column))
    }

    /// Delete columns as one undo step, highest index first. Returns the number deleted.
    pub fn delete_columns(&mut self, cols: &[usize]) -> Result<usize> {
        self.delete_columns_as("Delete columns", cols)
    }

    pub(crate) fn delete_columns_as(&mut self, label: &str, cols: &[usize]) -> Result<usize> {
        let mut cols: Vec<usize> = cols
            .iter()
            .copied()
            .filter(|&c| c < self.table.column_count())
            .collect();
        cols.sort_unstable_by(|a, b| b.cmp(a));
        cols.dedup();
        if cols.is_empty() {
            return Ok(0);
        }
        self.transaction(label, |doc| {
            for &col in &cols {
                doc.execute(Command::delete_column(col));
            }
            Ok(cols.len())
        })
    }

    /// Undo the last step, returning its label.
    pub fn undo(&mut self) -> Result<String> {
        let label = self.history.undo(&mut self.table)?;
        self.modified = true;
        tracing::debug!(step = %label, "Undo");
        Ok(label)
    }

    /// Redo the last undone step, returning its label.
    pub fn redo(&mut self) -> Result<String> {
        let label = self.history.redo(&mut self.table)?;
        self.modified = true;
        tracing::debug!(step = %label, "Redo");
        Ok(label)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_labels(&self) -> Vec<String> {
        self.history.undo_labels()
    }

    pub fn column_definition(&self, col: usize) -> Option<&ColumnDefinition> {
        self.table.definition(col)
    }

    /// Replace one column's definition. Definitions are metadata and are not
    /// recorded in the undo history.
    pub fn set_column_definition(&mut self, col: usize, definition: ColumnDefinition) -> Result<()> {
        let count = self.table.column_count();
        let column = self
            .table
            .column_mut(col)
            .ok_or(WellTabError::ColumnOutOfRange { index: col, count })?;
        column.definition = definition;
        self.modified = true;
        Ok(())
    }

    /// Assign definitions by position. Extra definitions are ignored and
    /// columns beyond the list keep theirs. Returns the number assigned.
    pub fn set_column_definitions(&mut self, definitions: Vec<ColumnDefinition>) -> usize {
        let mut assigned = 0;
        for (col, definition) in definitions.into_iter().enumerate() {
            let Some(column) = self.table.column_mut(col) else {
                break;
            };
            column.definition = definition;
            assigned += 1;
        }
        if assigned > 0 {
            self.modified = true;
        }
        assigned
    }

    /// Re-derive every definition from its header.
    pub fn infer_column_definitions(&mut self) {
        let definitions = self
            .table
            .headers()
            .map(ColumnDefinition::infer)
            .collect();
        self.set_column_definitions(definitions);
    }

    pub(crate) fn check_column(&self, col: usize) -> Result<()> {
        if col < self.table.column_count() {
            Ok(())
        } else {
            Err(WellTabError::ColumnOutOfRange {
                index: col,
                count: self.table.column_count(),
            })
        }
    }
}
