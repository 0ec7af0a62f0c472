use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use welltab_core::FillMethod;
use welltab_core::storage::{FileFormat, TextEncoding};
use welltab_engine::engine::{CellRef, TimeUnit};

/// Input format, when the extension is not enough
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FormatArg {
    /// Delimited text (.csv, .txt, .tsv)
    Delimited,
    /// Spreadsheet saved as delimited text (.xls, .xlsx)
    Excel,
    /// JSON array of objects
    Json,
}

impl From<FormatArg> for FileFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Delimited => FileFormat::Delimited,
            FormatArg::Excel => FileFormat::Excel,
            FormatArg::Json => FileFormat::Json,
        }
    }
}

/// Command-line arguments for welltab
#[derive(Parser, Debug)]
#[command(version, about = "Well-test data editor")]
pub struct Args {
    /// Data file to open (.csv, .txt, .xls, .xlsx, .json)
    pub path: PathBuf,

    /// Read the file as this format instead of guessing from the extension
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// 1-based line holding the header (or the first row with --no-header)
    #[arg(long = "start-row")]
    pub start_row: Option<usize>,

    /// The file has no header line; columns are named Column1, Column2, ...
    #[arg(long = "no-header", action)]
    pub no_header: bool,

    /// Field separator, e.g. ',' or '\t'
    #[arg(long)]
    pub separator: Option<String>,

    /// Text encoding (utf-8, gbk)
    #[arg(long)]
    pub encoding: Option<TextEncoding>,

    /// Print the detected encoding and separator, then exit
    #[arg(long, action)]
    pub detect: bool,

    /// Apply column definitions from a JSON preset
    #[arg(long = "definitions")]
    pub definitions: Option<PathBuf>,

    /// Write the column definitions to a JSON preset
    #[arg(long = "save-definitions")]
    pub save_definitions: Option<PathBuf>,

    /// Set a cell, e.g. B3=28.5 (row 1 is the first data row); repeatable
    #[arg(long = "set", value_parser = parse_assignment)]
    pub set: Vec<(CellRef, String)>,

    /// Add elapsed time computed from this time-of-day column (header or 1-based index)
    #[arg(long = "time-column")]
    pub time_column: Option<String>,

    /// Date column to combine with --time-column
    #[arg(long = "date-column", requires = "time_column")]
    pub date_column: Option<String>,

    /// Unit of the elapsed time column (s, m, h)
    #[arg(long = "time-unit")]
    pub time_unit: Option<TimeUnit>,

    /// Header of the elapsed time column (the unit is appended)
    #[arg(long = "time-name", default_value = "Time")]
    pub time_name: String,

    /// Add a pressure drop column next to the pressure column
    #[arg(long = "pressure-drop", action)]
    pub pressure_drop: bool,

    /// Remove rows and columns with no data
    #[arg(long = "remove-empty", action)]
    pub remove_empty: bool,

    /// Remove repeated rows, keeping the first
    #[arg(long = "remove-duplicates", action)]
    pub remove_duplicates: bool,

    /// Fill empty numeric cells (zero, average, interpolation, forward)
    #[arg(long)]
    pub fill: Option<Option<FillMethod>>,

    /// Clear values more than THRESHOLD standard deviations from the column mean
    #[arg(long = "outliers", value_name = "THRESHOLD")]
    pub outliers: Option<Option<f64>>,

    /// Rewrite measured columns with their configured decimal places
    #[arg(long, action)]
    pub standardize: bool,

    /// Print statistics for every column
    #[arg(long, action)]
    pub stats: bool,

    /// Check the data against the column definitions; exits with 2 when invalid
    #[arg(long, action)]
    pub validate: bool,

    /// Print the rows matching a wildcard pattern (* and ?) as CSV
    #[arg(long)]
    pub filter: Option<String>,

    /// Project parameter file to open, created with defaults when missing
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Write the result here; the format follows the extension (csv, txt, json, html, xlsx)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Settings file to use instead of the one in the config directory
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Whether any option asks for an explicit load configuration.
    pub fn has_load_overrides(&self) -> bool {
        self.start_row.is_some()
            || self.no_header
            || self.separator.is_some()
            || self.encoding.is_some()
    }
}

fn parse_assignment(s: &str) -> Result<(CellRef, String), String> {
    let (cell, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CELL=VALUE, got '{}'", s))?;
    let cell = cell.parse::<CellRef>()?;
    Ok((cell, value.to_string()))
}

/// Decode the escapes people type for separators on a shell.
pub fn unescape_separator(s: &str) -> String {
    match s {
        "\\t" | "tab" => "\t".to_string(),
        "space" => " ".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let (cell, value) = parse_assignment("B3=28.5").unwrap();
        assert_eq!(cell, CellRef::new(2, 1));
        assert_eq!(value, "28.5");
        assert_eq!(parse_assignment("A1=").unwrap().1, "");
        assert!(parse_assignment("B3").is_err());
        assert!(parse_assignment("3B=1").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "welltab",
            "data.csv",
            "--time-column",
            "Clock",
            "--time-unit",
            "m",
            "--fill",
            "--outliers",
            "2.5",
            "--set",
            "A1=1",
            "--set",
            "B2=x",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.time_column.as_deref(), Some("Clock"));
        assert_eq!(args.time_unit, Some(TimeUnit::Minutes));
        assert_eq!(args.fill, Some(None));
        assert_eq!(args.outliers, Some(Some(2.5)));
        assert_eq!(args.set.len(), 2);
        assert_eq!(args.verbose, 2);
        assert!(!args.has_load_overrides());
    }

    #[test]
    fn test_date_column_requires_time_column() {
        assert!(Args::try_parse_from(["welltab", "a.csv", "--date-column", "Date"]).is_err());
    }

    #[test]
    fn test_unescape_separator() {
        assert_eq!(unescape_separator("\\t"), "\t");
        assert_eq!(unescape_separator(";"), ";");
    }
}
