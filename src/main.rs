//! welltab - well-test data editor for the command line

mod cli;
mod config;
mod logging;

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use cli::Args;
use config::Settings;
use std::borrow::Cow;
use std::process::ExitCode;
use welltab_core::storage::{self, LoadConfig, csv::escape_field};
use welltab_core::{
    CleaningOptions, Document, ProjectContext, TimeConversionConfig, TimeSource, ValidationReport,
};
use welltab_engine::engine::{ColumnStatistics, format_fixed};

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = logging::init(args.verbose) {
        eprintln!("Warning: {:#}", e);
    }

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let settings = Settings::load(args.config.as_deref())?;

    if args.detect {
        let bytes = std::fs::read(&args.path)
            .with_context(|| format!("Failed to read {}", args.path.display()))?;
        let guess = storage::detect_format(&bytes);
        println!(
            "encoding: {} (confidence {:.2})",
            guess.encoding.value, guess.encoding.confidence
        );
        println!(
            "separator: {:?} (confidence {:.2})",
            guess.separator.value, guess.separator.confidence
        );
        return Ok(ExitCode::SUCCESS);
    }

    let mut doc = Document::with_options(settings.import_options());
    let config = load_config(args)?;
    doc.load_file(
        &args.path,
        args.format.map(Into::into),
        config.as_ref(),
        &mut |percent, message| tracing::debug!(percent, step = message, "Loading"),
    )
    .with_context(|| format!("Failed to load {}", args.path.display()))?;
    if doc.large_input {
        eprintln!(
            "Note: the file has at least {} lines; reports may be slow",
            doc.options.max_display_rows
        );
    }
    tracing::info!(rows = doc.row_count(), columns = doc.column_count(), "Document ready");

    if let Some(preset) = &args.definitions {
        let applied = doc
            .load_column_definitions(preset)
            .with_context(|| format!("Failed to read definitions from {}", preset.display()))?;
        tracing::info!(applied, "Applied column definitions");
    }

    for (cell, value) in &args.set {
        if !doc.set_cell_at(*cell, value) {
            bail!("Cell {} is outside the table", cell);
        }
    }

    if let Some(time_column) = &args.time_column {
        let column = resolve_column(&doc, time_column)?;
        let source = match &args.date_column {
            Some(date_column) => TimeSource::DateAndTime {
                date_column: resolve_column(&doc, date_column)?,
                time_column: column,
            },
            None => TimeSource::TimeOfDay { column },
        };
        let mut time_config =
            TimeConversionConfig::new(source, args.time_unit.unwrap_or(settings.time_unit));
        time_config.column_name = args.time_name.clone();
        let added = doc.convert_time_column(&time_config)?;
        println!(
            "Added '{}' at column {} ({} rows)",
            added.column_name,
            added.column_index + 1,
            added.processed_rows
        );
    }

    if args.pressure_drop {
        let added = doc.calculate_pressure_drop()?;
        println!(
            "Added '{}' at column {} ({} rows)",
            added.column_name,
            added.column_index + 1,
            added.processed_rows
        );
    }

    let cleaning = CleaningOptions {
        remove_empty_rows: args.remove_empty,
        remove_empty_columns: args.remove_empty,
        remove_duplicates: args.remove_duplicates,
        fill: args.fill.map(|method| method.unwrap_or(settings.fill_method)),
        outlier_threshold: args
            .outliers
            .map(|threshold| threshold.unwrap_or(settings.outlier_threshold)),
        standardize: args.standardize,
    };
    if cleaning != CleaningOptions::default() {
        let report = doc.clean(&cleaning, &mut |percent, message| {
            tracing::debug!(percent, step = message, "Cleaning")
        })?;
        println!(
            "Cleaned: {} empty rows, {} empty columns, {} duplicates removed; {} cells filled, {} outliers cleared, {} cells reformatted",
            report.empty_rows_removed,
            report.empty_columns_removed,
            report.duplicates_removed,
            report.cells_filled,
            report.outliers_cleared,
            report.cells_standardized
        );
    }

    if let Some(path) = &args.project {
        let project = if path.exists() {
            ProjectContext::open(path)?
        } else {
            let mut project = ProjectContext::new();
            project.save_as(path)?;
            project
        };
        print_project(&project);
    }

    if args.stats {
        for stats in doc.all_statistics() {
            println!("{}", format_statistics(&stats));
        }
    }

    if let Some(pattern) = &args.filter {
        print_rows(&doc, &doc.filter_rows(pattern)?);
    }

    if let Some(preset) = &args.save_definitions {
        doc.save_column_definitions(preset)
            .with_context(|| format!("Failed to write {}", preset.display()))?;
    }

    if let Some(output) = &args.output {
        let written = doc
            .export(output, None)
            .with_context(|| format!("Failed to export {}", output.display()))?;
        println!("Exported to {}", written.display());
    }

    if args.validate {
        let report = doc.validate();
        print_validation(&report);
        if !report.is_valid {
            return Ok(ExitCode::from(2));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Build an explicit load configuration when any load option is given.
/// Options that are not given fall back to what detection finds.
fn load_config(args: &Args) -> Result<Option<LoadConfig>> {
    if !args.has_load_overrides() {
        return Ok(None);
    }
    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let mut config = storage::detect_format(&bytes).to_config();
    if let Some(start_row) = args.start_row {
        config.start_row = start_row;
    }
    if args.no_header {
        config.has_header = false;
    }
    if let Some(separator) = &args.separator {
        config.separator = cli::unescape_separator(separator);
    }
    if let Some(encoding) = args.encoding {
        config.encoding = encoding;
    }
    Ok(Some(config))
}

/// A column given by header (case-insensitive) or 1-based position.
fn resolve_column(doc: &Document, spec: &str) -> Result<usize> {
    let table = doc.table();
    if let Some(col) = table.find_column(|c| c.header.eq_ignore_ascii_case(spec.trim())) {
        return Ok(col);
    }
    match spec.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= table.column_count() => Ok(n - 1),
        _ => bail!("No column '{}'", spec),
    }
}

fn format_statistics(stats: &ColumnStatistics) -> String {
    let name: Cow<'_, str> = if stats.unit.is_empty() {
        Cow::Borrowed(&stats.column_name)
    } else {
        Cow::Owned(format!("{} [{}]", stats.column_name, stats.unit))
    };
    match &stats.summary {
        Some(s) => format!(
            "{}: count={} valid={} empty={} min={} max={} mean={} median={} std={}",
            name,
            stats.data_count,
            stats.valid_count,
            stats.invalid_count,
            format_fixed(s.minimum, 3),
            format_fixed(s.maximum, 3),
            format_fixed(s.mean, 3),
            format_fixed(s.median, 3),
            format_fixed(s.std_dev, 3)
        ),
        None => format!(
            "{}: count={} valid={} empty={} (text)",
            name, stats.data_count, stats.valid_count, stats.invalid_count
        ),
    }
}

fn print_rows(doc: &Document, rows: &[usize]) {
    let table = doc.table();
    let header: Vec<Cow<'_, str>> = table.headers().map(escape_field).collect();
    println!("{}", header.join(","));
    for &row in rows {
        let fields: Vec<Cow<'_, str>> = table.row_texts(row).into_iter().map(escape_field).collect();
        println!("{}", fields.join(","));
    }
}

fn print_validation(report: &ValidationReport) {
    println!(
        "Validation: {} ({} rows, {} valid, {} with errors)",
        if report.is_valid { "passed" } else { "failed" },
        report.total_rows,
        report.valid_rows,
        report.error_rows
    );
    for error in &report.errors {
        println!("error: {}", error);
    }
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    for (column, errors) in &report.column_errors {
        for error in errors {
            println!("{}: {}", column, error);
        }
    }
}

fn print_project(project: &ProjectContext) {
    let r = &project.reservoir;
    let pvt = &project.pvt;
    println!(
        "Reservoir: porosity={} thickness={} m well radius={} m rate={} m³/d",
        r.porosity, r.thickness, r.well_radius, r.production_rate
    );
    println!(
        "PVT: viscosity={} mPa·s volume factor={} compressibility={} 1/MPa",
        pvt.viscosity, pvt.volume_factor, pvt.compressibility
    );
    if !project.plotting_data.is_empty() {
        println!("Plotting data: {} entries", project.plotting_data.len());
    }
}
