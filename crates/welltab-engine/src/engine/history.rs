//! Undo/redo stacks with macro transactions.

use super::command::Command;
use super::table::Table;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("A transaction is still open")]
    TransactionOpen,

    #[error("No transaction is open")]
    NoTransaction,
}

/// An undo entry: a single command or a macro of commands.
#[derive(Clone, Debug)]
pub enum UndoEntry {
    Single(Command),
    Batch { label: String, commands: Vec<Command> },
}

impl UndoEntry {
    pub fn label(&self) -> String {
        match self {
            UndoEntry::Single(cmd) => cmd.label(),
            UndoEntry::Batch { label, .. } => label.clone(),
        }
    }

    fn undo(&mut self, table: &mut Table) {
        match self {
            UndoEntry::Single(cmd) => {
                cmd.undo(table);
            }
            UndoEntry::Batch { commands, .. } => {
                for cmd in commands.iter_mut().rev() {
                    cmd.undo(table);
                }
            }
        }
    }

    fn redo(&mut self, table: &mut Table) {
        match self {
            UndoEntry::Single(cmd) => {
                cmd.redo(table);
            }
            UndoEntry::Batch { commands, .. } => {
                for cmd in commands.iter_mut() {
                    cmd.redo(table);
                }
            }
        }
    }
}

/// Macro under construction. `marks` holds the command index at which each
/// nesting level began.
#[derive(Debug)]
struct OpenMacro {
    label: String,
    commands: Vec<Command>,
    marks: Vec<usize>,
}

/// Command history for one table.
///
/// `push` executes a command and records it. While a macro is open, pushed
/// commands are collected and committed as one entry by the outermost
/// `end_macro`. `clear` drops everything without running any undo.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
    open: Option<OpenMacro>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` undo entries, dropping the oldest.
    pub fn with_limit(limit: usize) -> Self {
        History {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Execute `cmd` against `table` and record it. Returns whether the
    /// command changed the table.
    pub fn push(&mut self, table: &mut Table, mut cmd: Command) -> bool {
        let applied = cmd.redo(table);
        match &mut self.open {
            Some(open) => open.commands.push(cmd),
            None => self.commit(UndoEntry::Single(cmd)),
        }
        applied
    }

    pub fn begin_macro(&mut self, label: impl Into<String>) {
        match &mut self.open {
            Some(open) => {
                let mark = open.commands.len();
                open.marks.push(mark);
            }
            None => {
                self.open = Some(OpenMacro {
                    label: label.into(),
                    commands: Vec::new(),
                    marks: vec![0],
                });
            }
        }
    }

    /// Close the innermost macro level. The outermost level commits the
    /// collected commands as one undo entry; an empty macro records nothing.
    pub fn end_macro(&mut self) -> Result<(), HistoryError> {
        let open = self.open.as_mut().ok_or(HistoryError::NoTransaction)?;
        open.marks.pop();
        if !open.marks.is_empty() {
            return Ok(());
        }
        if let Some(open) = self.open.take()
            && !open.commands.is_empty()
        {
            self.commit(UndoEntry::Batch {
                label: open.label,
                commands: open.commands,
            });
        }
        Ok(())
    }

    /// Revert the commands pushed since the innermost `begin_macro` and close
    /// that level.
    pub fn abort_macro(&mut self, table: &mut Table) -> Result<(), HistoryError> {
        let open = self.open.as_mut().ok_or(HistoryError::NoTransaction)?;
        let mark = open.marks.pop().unwrap_or(0);
        for mut cmd in open.commands.drain(mark..).rev() {
            cmd.undo(table);
        }
        if open.marks.is_empty() {
            self.open = None;
        }
        Ok(())
    }

    pub fn in_macro(&self) -> bool {
        self.open.is_some()
    }

    /// Undo the latest entry, returning its label.
    pub fn undo(&mut self, table: &mut Table) -> Result<String, HistoryError> {
        if self.open.is_some() {
            return Err(HistoryError::TransactionOpen);
        }
        let mut entry = self.undo_stack.pop().ok_or(HistoryError::NothingToUndo)?;
        entry.undo(table);
        let label = entry.label();
        self.redo_stack.push(entry);
        Ok(label)
    }

    /// Redo the latest undone entry, returning its label.
    pub fn redo(&mut self, table: &mut Table) -> Result<String, HistoryError> {
        if self.open.is_some() {
            return Err(HistoryError::TransactionOpen);
        }
        let mut entry = self.redo_stack.pop().ok_or(HistoryError::NothingToRedo)?;
        entry.redo(table);
        let label = entry.label();
        self.undo_stack.push(entry);
        Ok(label)
    }

    pub fn can_undo(&self) -> bool {
        self.open.is_none() && !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.open.is_none() && !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Labels of the undo entries, oldest first.
    pub fn undo_labels(&self) -> Vec<String> {
        self.undo_stack.iter().map(UndoEntry::label).collect()
    }

    /// Forget all history. No command is reverted.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open = None;
    }

    fn commit(&mut self, entry: UndoEntry) {
        self.undo_stack.push(entry);
        self.redo_stack.clear();
        if let Some(limit) = self.limit
            && self.undo_stack.len() > limit
        {
            self.undo_stack.remove(0);
        }
    }
}
