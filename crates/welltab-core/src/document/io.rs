use super::Document;
use crate::error::{Result, WellTabError};
use crate::storage::{self, ExportFormat, FileFormat, LoadConfig};
use std::path::{Path, PathBuf};
use welltab_engine::engine::ColumnDefinition;

impl Document {
    /// Load a file, replacing the current table and clearing the history.
    ///
    /// The file is parsed into a fresh table first, so on error the current
    /// document is left untouched. `format` defaults to the one implied by
    /// the extension.
    pub fn load_file(
        &mut self,
        path: &Path,
        format: Option<FileFormat>,
        config: Option<&LoadConfig>,
        progress: &mut dyn FnMut(u8, &str),
    ) -> Result<()> {
        let format = format
            .or_else(|| FileFormat::from_path(path))
            .ok_or_else(|| WellTabError::UnsupportedFormat(path.display().to_string()))?;
        let loaded = storage::load_path(path, format, config, &self.options, progress)?;

        tracing::info!(
            path = %path.display(),
            ?format,
            rows = loaded.table.row_count(),
            columns = loaded.table.column_count(),
            large_input = loaded.large_input,
            "Loaded file"
        );
        self.replace_table(loaded.table);
        self.large_input = loaded.large_input;
        self.file_path = Some(path.to_path_buf());
        self.file_format = Some(format);
        Ok(())
    }

    /// Save to the current file path in its format.
    /// Returns the path written.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(WellTabError::NoFilePath);
        };
        let format = match self.file_format {
            Some(FileFormat::Json) => ExportFormat::Json,
            Some(FileFormat::Excel) => ExportFormat::Excel,
            Some(FileFormat::Delimited) | None => ExportFormat::Csv,
        };
        let written = storage::export_path(&self.table, &path, format)?;
        self.modified = false;
        Ok(written)
    }

    /// Save under a new path, which becomes the current file.
    pub fn save_file_as(&mut self, path: &Path) -> Result<PathBuf> {
        let format = FileFormat::from_path(path)
            .ok_or_else(|| WellTabError::UnsupportedFormat(path.display().to_string()))?;
        self.file_path = Some(path.to_path_buf());
        self.file_format = Some(format);
        self.save_file()
    }

    /// Export the table without changing the current file.
    /// Returns the path written.
    pub fn export(&self, path: &Path, format: Option<ExportFormat>) -> Result<PathBuf> {
        if !self.has_data() {
            return Err(WellTabError::NoData);
        }
        let format = format
            .or_else(|| ExportFormat::from_path(path))
            .ok_or_else(|| WellTabError::UnsupportedFormat(path.display().to_string()))?;
        storage::export_path(&self.table, path, format)
    }

    /// Write the column definitions as a JSON preset.
    pub fn save_column_definitions(&self, path: &Path) -> Result<()> {
        let definitions: Vec<&ColumnDefinition> =
            self.table.columns().iter().map(|c| &c.definition).collect();
        std::fs::write(path, serde_json::to_string_pretty(&definitions)?)?;
        Ok(())
    }

    /// Apply a JSON preset written by [`Document::save_column_definitions`].
    /// Returns the number of columns updated.
    pub fn load_column_definitions(&mut self, path: &Path) -> Result<usize> {
        let text = std::fs::read_to_string(path)?;
        let definitions: Vec<ColumnDefinition> = serde_json::from_str(&text)?;
        Ok(self.set_column_definitions(definitions))
    }
}
