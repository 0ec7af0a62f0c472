use crate::storage::{FileFormat, ImportOptions};
use std::path::PathBuf;
use welltab_engine::engine::{History, Table};

/// UI-agnostic document: the table, its edit history and file state.
///
/// All table mutations go through [`History`], so they can be undone.
#[derive(Debug, Default)]
pub struct Document {
    pub(crate) table: Table,
    pub(crate) history: History,
    /// File the table was loaded from or last saved to
    pub file_path: Option<PathBuf>,
    /// Format of `file_path`
    pub file_format: Option<FileFormat>,
    /// Whether the table changed since it was loaded or saved
    pub modified: bool,
    /// The last import reached `options.max_display_rows`
    pub large_input: bool,
    pub options: ImportOptions,
}

impl Document {
    /// Create an empty document. Does not touch the filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ImportOptions) -> Self {
        Document {
            options,
            ..Self::default()
        }
    }

    /// Wrap an existing table with a fresh history.
    pub fn from_table(table: Table) -> Self {
        Document {
            table,
            ..Self::default()
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.table.column_count()
    }

    pub fn has_data(&self) -> bool {
        self.table.column_count() > 0
    }

    /// Replace the table wholesale, forgetting all history.
    pub(crate) fn replace_table(&mut self, table: Table) {
        self.table = table;
        self.history.clear();
        self.modified = false;
    }

    /// Drop the table, its history and file state.
    pub fn clear(&mut self) {
        self.replace_table(Table::new());
        self.file_path = None;
        self.file_format = None;
        self.large_input = false;
    }
}
