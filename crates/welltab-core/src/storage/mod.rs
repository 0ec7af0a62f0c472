//! File formats: delimited text, spreadsheet-as-text, JSON and HTML.

pub mod csv;
pub mod detect;
pub mod html;
pub mod json;

pub use detect::{FormatGuess, Guess, TextEncoding, detect_encoding, detect_format, detect_separator};

use crate::error::{Result, WellTabError};
use std::path::{Path, PathBuf};
use welltab_engine::engine::Table;

/// How to read a delimited file. `start_row` is 1-based.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadConfig {
    pub start_row: usize,
    pub has_header: bool,
    pub encoding: TextEncoding,
    pub separator: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig {
            start_row: 1,
            has_header: true,
            encoding: TextEncoding::Utf8,
            separator: ",".to_string(),
        }
    }
}

/// Import limits shared by all formats.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportOptions {
    /// Inputs with at least this many lines raise the large-input flag.
    pub max_display_rows: usize,
    /// Rows between progress reports while parsing.
    pub progress_interval: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            max_display_rows: 10_000,
            progress_interval: 100,
        }
    }
}

/// A freshly imported table.
#[derive(Clone, Debug)]
pub struct Loaded {
    pub table: Table,
    pub large_input: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Delimited,
    Excel,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<FileFormat> {
        match extension(path).as_deref() {
            Some("csv" | "txt" | "tsv" | "dat") => Some(FileFormat::Delimited),
            Some("xls" | "xlsx") => Some(FileFormat::Excel),
            Some("json") => Some(FileFormat::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Html,
    PrintHtml,
    Excel,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Option<ExportFormat> {
        match extension(path).as_deref() {
            Some("csv" | "txt") => Some(ExportFormat::Csv),
            Some("json") => Some(ExportFormat::Json),
            Some("html" | "htm") => Some(ExportFormat::Html),
            Some("xls" | "xlsx") => Some(ExportFormat::Excel),
            _ => None,
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Read and parse a file into a new table.
///
/// Delimited files use `config` when given and automatic header/separator
/// detection otherwise. Spreadsheet files are read as delimited text, which
/// works for the CSV/TSV exports many loggers save under an `.xls` name.
pub fn load_path(
    path: &Path,
    format: FileFormat,
    config: Option<&LoadConfig>,
    options: &ImportOptions,
    progress: &mut dyn FnMut(u8, &str),
) -> Result<Loaded> {
    let bytes = std::fs::read(path)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(WellTabError::EmptyFile);
    }

    match format {
        FileFormat::Json => {
            progress(20, "Reading JSON");
            let text = TextEncoding::Utf8.decode(&bytes);
            let table = json::parse_json(&text)?;
            progress(100, "Done");
            Ok(Loaded {
                large_input: table.row_count() >= options.max_display_rows,
                table,
            })
        }
        FileFormat::Delimited => match config {
            Some(config) => {
                let text = config.encoding.decode(&bytes);
                csv::parse_with_config(&text, config, options, progress)
            }
            None => {
                let text = detect_encoding(&bytes).value.decode(&bytes);
                csv::parse_auto(&text, options, progress)
            }
        },
        FileFormat::Excel => {
            let encoding = config.map_or_else(|| detect_encoding(&bytes).value, |c| c.encoding);
            let text = encoding.decode(&bytes);
            if !detect::looks_delimited(&text) {
                return Err(WellTabError::NotDelimited(path.display().to_string()));
            }
            csv::parse_auto(&text, options, progress)
                .map_err(|_| WellTabError::NotDelimited(path.display().to_string()))
        }
    }
}

/// Write `table` to `path`. Spreadsheet exports are written as CSV next to
/// the requested path (`name.xlsx.csv`); the path written is returned.
pub fn export_path(table: &Table, path: &Path, format: ExportFormat) -> Result<PathBuf> {
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Well test data");

    let (target, contents) = match format {
        ExportFormat::Csv => (path.to_path_buf(), csv::to_csv_string(table)),
        ExportFormat::Excel => {
            let mut target = path.as_os_str().to_owned();
            target.push(".csv");
            tracing::warn!(
                path = %path.display(),
                "Native spreadsheet output is not available; writing CSV instead"
            );
            (PathBuf::from(target), csv::to_csv_string(table))
        }
        ExportFormat::Json => (path.to_path_buf(), json::to_json_string(table)?),
        ExportFormat::Html => (path.to_path_buf(), html::render_html(table, title)),
        ExportFormat::PrintHtml => (path.to_path_buf(), html::render_print_html(table, title)),
    };

    std::fs::write(&target, contents)?;
    tracing::info!(path = %target.display(), ?format, rows = table.row_count(), "Exported table");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.CSV")), Some(FileFormat::Delimited));
        assert_eq!(FileFormat::from_path(Path::new("a.xlsx")), Some(FileFormat::Excel));
        assert_eq!(FileFormat::from_path(Path::new("a.json")), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_path(Path::new("a.pdf")), None);
        assert_eq!(ExportFormat::from_path(Path::new("r.htm")), Some(ExportFormat::Html));
    }

    #[test]
    fn test_load_excel_as_delimited_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.xls");
        std::fs::write(&path, "Time\tPressure\n0\t30\n1\t29\n").unwrap();
        let loaded =
            load_path(&path, FileFormat::Excel, None, &ImportOptions::default(), &mut |_, _| {})
                .unwrap();
        assert_eq!(loaded.table.headers().collect::<Vec<_>>(), vec!["Time", "Pressure"]);
        assert_eq!(loaded.table.row_count(), 2);
    }

    #[test]
    fn test_load_binary_excel_fails_with_hint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("real.xlsx");
        std::fs::write(&path, b"PK\x03\x04\x00\x00binary").unwrap();
        let err = load_path(&path, FileFormat::Excel, None, &ImportOptions::default(), &mut |_, _| {})
            .unwrap_err();
        assert!(matches!(err, WellTabError::NotDelimited(_)));
        assert!(err.to_string().contains("save it as CSV"));
    }

    #[test]
    fn test_load_gbk_with_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gbk.csv");
        let (bytes, _, _) = encoding_rs::GBK.encode("时间,压力\n0,30\n");
        std::fs::write(&path, &bytes).unwrap();

        let guess = detect_format(&std::fs::read(&path).unwrap());
        assert_eq!(guess.encoding.value, TextEncoding::Gbk);
        let loaded = load_path(
            &path,
            FileFormat::Delimited,
            Some(&guess.to_config()),
            &ImportOptions::default(),
            &mut |_, _| {},
        )
        .unwrap();
        assert_eq!(loaded.table.headers().collect::<Vec<_>>(), vec!["时间", "压力"]);
    }

    #[test]
    fn test_whitespace_only_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.csv");
        std::fs::write(&path, "\n  \n").unwrap();
        let err = load_path(&path, FileFormat::Delimited, None, &ImportOptions::default(), &mut |_, _| {})
            .unwrap_err();
        assert!(matches!(err, WellTabError::EmptyFile));
    }

    #[test]
    fn test_excel_export_writes_csv_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let t = Table::from_rows(["a"], [vec!["1"]]);
        let written = export_path(&t, &path, ExportFormat::Excel).unwrap();
        assert_eq!(written, dir.path().join("out.xlsx.csv"));
        assert_eq!(std::fs::read_to_string(written).unwrap(), "a\n1\n");
    }
}
