//! Reversible table mutations.

use super::column::Column;
use super::table::{CellValue, Table};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOp {
    Insert,
    Delete,
}

/// One reversible mutation of a [`Table`].
///
/// Each variant holds exactly the state needed to invert itself. Old cell
/// text and delete snapshots are captured when executed, not when built, so a
/// command replayed after other edits removes and restores what is actually
/// there. Commands whose indices are out of range do nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    CellEdit {
        row: usize,
        col: usize,
        old: CellValue,
        new: CellValue,
    },
    RowEdit {
        op: EditOp,
        row: usize,
        snapshot: Vec<CellValue>,
        applied: bool,
    },
    ColumnEdit {
        op: EditOp,
        col: usize,
        column: Column,
        snapshot: Vec<CellValue>,
        applied: bool,
    },
}

impl Command {
    /// Set a cell, remembering its current value for undo.
    pub fn set_cell(table: &Table, row: usize, col: usize, text: impl Into<String>) -> Self {
        Command::CellEdit {
            row,
            col,
            old: table.cell_value(row, col).cloned(),
            new: Some(text.into()),
        }
    }

    pub fn insert_row(row: usize) -> Self {
        Command::RowEdit {
            op: EditOp::Insert,
            row,
            snapshot: Vec::new(),
            applied: false,
        }
    }

    pub fn delete_row(row: usize) -> Self {
        Command::RowEdit {
            op: EditOp::Delete,
            row,
            snapshot: Vec::new(),
            applied: false,
        }
    }

    pub fn insert_column(col: usize, column: Column) -> Self {
        Command::ColumnEdit {
            op: EditOp::Insert,
            col,
            column,
            snapshot: Vec::new(),
            applied: false,
        }
    }

    pub fn delete_column(col: usize) -> Self {
        Command::ColumnEdit {
            op: EditOp::Delete,
            col,
            column: Column::new(String::new()),
            snapshot: Vec::new(),
            applied: false,
        }
    }

    /// Short description for logs and history listings.
    pub fn label(&self) -> String {
        match self {
            Command::CellEdit { row, col, .. } => format!("edit cell ({row}, {col})"),
            Command::RowEdit { op: EditOp::Insert, row, .. } => format!("insert row {row}"),
            Command::RowEdit { op: EditOp::Delete, row, .. } => format!("delete row {row}"),
            Command::ColumnEdit { op: EditOp::Insert, column, .. } => {
                format!("insert column '{}'", column.header)
            }
            Command::ColumnEdit { op: EditOp::Delete, col, .. } => format!("delete column {col}"),
        }
    }

    /// Apply the command. Returns `false` if it was a no-op.
    pub fn redo(&mut self, table: &mut Table) -> bool {
        match self {
            Command::CellEdit { row, col, old, new } => {
                match table.replace_cell(*row, *col, new.clone()) {
                    Some(previous) => {
                        *old = previous;
                        true
                    }
                    None => false,
                }
            }
            Command::RowEdit {
                op: EditOp::Insert,
                row,
                applied,
                ..
            } => {
                let empty = vec![Some(String::new()); table.column_count()];
                *applied = table.insert_row(*row, empty);
                *applied
            }
            Command::RowEdit {
                op: EditOp::Delete,
                row,
                snapshot,
                applied,
            } => match table.remove_row(*row) {
                Some(cells) => {
                    *snapshot = cells;
                    *applied = true;
                    true
                }
                None => {
                    *applied = false;
                    false
                }
            },
            Command::ColumnEdit {
                op: EditOp::Insert,
                col,
                column,
                applied,
                ..
            } => {
                let empty = vec![Some(String::new()); table.row_count()];
                *applied = table.insert_column(*col, column.clone(), empty);
                *applied
            }
            Command::ColumnEdit {
                op: EditOp::Delete,
                col,
                column,
                snapshot,
                applied,
            } => match table.remove_column(*col) {
                Some((removed, cells)) => {
                    *column = removed;
                    *snapshot = cells;
                    *applied = true;
                    true
                }
                None => {
                    *applied = false;
                    false
                }
            },
        }
    }

    /// Revert the command. Returns `false` if it was a no-op.
    pub fn undo(&mut self, table: &mut Table) -> bool {
        match self {
            Command::CellEdit { row, col, old, .. } => {
                table.replace_cell(*row, *col, old.clone()).is_some()
            }
            Command::RowEdit {
                op: EditOp::Insert,
                row,
                applied,
                ..
            } => *applied && table.remove_row(*row).is_some(),
            Command::RowEdit {
                op: EditOp::Delete,
                row,
                snapshot,
                applied,
            } => *applied && table.insert_row(*row, snapshot.clone()),
            Command::ColumnEdit {
                op: EditOp::Insert,
                col,
                applied,
                ..
            } => *applied && table.remove_column(*col).is_some(),
            Command::ColumnEdit {
                op: EditOp::Delete,
                col,
                column,
                snapshot,
                applied,
            } => *applied && table.insert_column(*col, column.clone(), snapshot.clone()),
        }
    }
}
