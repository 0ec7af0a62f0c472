//! Delimited text import/export.

use super::detect::{SEPARATOR_CANDIDATES, detect_separator};
use super::{ImportOptions, LoadConfig, Loaded};
use crate::error::{Result, WellTabError};
use std::borrow::Cow;
use std::io::Write;
use welltab_engine::engine::{Column, Table, parse_number};

/// Split one line into fields.
///
/// A double quote toggles quoting; inside quotes the separator is literal
/// text and `""` stands for one quote character. Unquoted fields are trimmed,
/// quoted content is kept as written. The separator may be several
/// characters long.
pub fn split_line(line: &str, separator: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    // byte length of `current` when the closing quote was seen
    let mut quoted_end: Option<usize> = None;
    let mut i = 0;

    while let Some(c) = line[i..].chars().next() {
        let rest = &line[i..];
        if in_quotes {
            if c == '"' {
                if rest[1..].starts_with('"') {
                    current.push('"');
                    i += 2;
                    continue;
                }
                in_quotes = false;
                quoted_end = Some(current.len());
            } else {
                current.push(c);
            }
            i += c.len_utf8();
        } else if c == '"' {
            if quoted_end.is_none() && current.trim().is_empty() {
                current.clear();
            }
            in_quotes = true;
            i += 1;
        } else if !separator.is_empty() && rest.starts_with(separator) {
            fields.push(finish_field(std::mem::take(&mut current), quoted_end.take()));
            i += separator.len();
        } else {
            current.push(c);
            i += c.len_utf8();
        }
    }
    fields.push(finish_field(current, quoted_end));
    fields
}

fn finish_field(mut field: String, quoted_end: Option<usize>) -> String {
    match quoted_end {
        Some(end) if field[end..].trim().is_empty() => {
            field.truncate(end);
            field
        }
        _ => field.trim().to_string(),
    }
}

/// Group physical lines into records. A line break inside a quoted field
/// belongs to that field, so the record runs on to the closing quote.
/// Line endings are removed.
pub fn split_records(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for line in text.split_inclusive('\n') {
        current.push_str(line);
        // doubled quotes leave the state unchanged
        if line.matches('"').count() % 2 == 1 {
            in_quotes = !in_quotes;
        }
        if !in_quotes {
            records.push(end_record(std::mem::take(&mut current)));
        }
    }
    if !current.is_empty() {
        tracing::warn!("Unterminated quoted field at end of input");
        records.push(end_record(current));
    }
    records
}

fn end_record(mut record: String) -> String {
    if record.ends_with('\n') {
        record.pop();
        if record.ends_with('\r') {
            record.pop();
        }
    }
    record
}

fn column_name(ordinal: usize) -> String {
    format!("Column{}", ordinal)
}

/// Parse decoded text with an explicit configuration.
///
/// `start_row` is 1-based. With a header, blank header cells become
/// `Column{n}`; without one, every header is synthetic and the start row is
/// data. Rows are padded or truncated to the header width.
pub fn parse_with_config(
    text: &str,
    config: &LoadConfig,
    options: &ImportOptions,
    progress: &mut dyn FnMut(u8, &str),
) -> Result<Loaded> {
    progress(20, "Analysing file format");

    let lines = split_records(text);
    if lines.is_empty() {
        return Err(WellTabError::EmptyFile);
    }
    let large_input = lines.len() >= options.max_display_rows;
    if large_input {
        tracing::info!(
            lines = lines.len(),
            cap = options.max_display_rows,
            "Large input mode enabled"
        );
    }

    let start = config.start_row.max(1) - 1;
    if start >= lines.len() {
        return Err(WellTabError::StartRowOutOfRange {
            start_row: config.start_row,
            line_count: lines.len(),
        });
    }

    let first = split_line(&lines[start], &config.separator);
    let (headers, data_start): (Vec<String>, usize) = if config.has_header {
        let headers = first
            .into_iter()
            .enumerate()
            .map(|(i, h)| if h.is_empty() { column_name(i + 1) } else { h })
            .collect();
        (headers, start + 1)
    } else {
        ((1..=first.len()).map(column_name).collect(), start)
    };
    if headers.is_empty() {
        return Err(WellTabError::NoColumns);
    }

    progress(70, "Parsing data");
    let mut table = Table::with_columns(headers.into_iter().map(Column::inferred).collect());
    let interval = options.progress_interval.max(1);
    for (n, line) in lines[data_start..].iter().enumerate() {
        table.push_row(split_line(line, &config.separator));
        if (n + 1) % interval == 0 {
            progress(70, &format!("Parsed {} rows", n + 1));
        }
    }

    progress(80, "Loading data");
    tracing::info!(
        rows = table.row_count(),
        columns = table.column_count(),
        separator = ?config.separator,
        "Parsed delimited text"
    );
    progress(100, "Done");
    Ok(Loaded { table, large_input })
}

/// Parse text without a configuration, trying the detected separator first
/// and then the remaining candidates.
pub fn parse_auto(
    text: &str,
    options: &ImportOptions,
    progress: &mut dyn FnMut(u8, &str),
) -> Result<Loaded> {
    let detected = detect_separator(text).value;
    let mut tried = Vec::with_capacity(SEPARATOR_CANDIDATES.len());
    // space-separated text is too ambiguous without a configuration
    for sep in std::iter::once(detected.as_str()).chain(SEPARATOR_CANDIDATES[..4].iter().copied()) {
        if tried.contains(&sep) {
            continue;
        }
        tried.push(sep);
        if let Some(loaded) = parse_with_separator(text, sep, options, progress)? {
            return Ok(loaded);
        }
    }
    Err(WellTabError::NotDelimited("the data".into()))
}

/// Parse with a fixed separator, guessing whether the first line is a
/// header. Blank lines are skipped. Returns `Ok(None)` when the text does
/// not look delimited by `separator`: fewer than two fields, or fewer than
/// 60% of the first five lines agreeing on the field count.
pub fn parse_with_separator(
    text: &str,
    separator: &str,
    options: &ImportOptions,
    progress: &mut dyn FnMut(u8, &str),
) -> Result<Option<Loaded>> {
    let records = split_records(text);
    let lines: Vec<&str> = records
        .iter()
        .map(|r| r.trim())
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(WellTabError::EmptyFile);
    }
    progress(70, "Parsing data format");

    let first = split_line(lines[0], separator);
    if first.len() < 2 {
        return Ok(None);
    }
    let checked = lines.len().min(5);
    let consistent = lines[..checked]
        .iter()
        .filter(|l| split_line(l, separator).len() == first.len())
        .count();
    if (consistent as f64) < checked as f64 * 0.6 {
        return Ok(None);
    }

    progress(80, "Loading data");
    let has_header = first.iter().any(|f| !f.is_empty() && parse_number(f).is_none());
    let headers: Vec<String> = if has_header {
        first
            .iter()
            .enumerate()
            .map(|(i, h)| if h.is_empty() { column_name(i + 1) } else { h.clone() })
            .collect()
    } else {
        (1..=first.len()).map(column_name).collect()
    };

    let mut table = Table::with_columns(headers.into_iter().map(Column::inferred).collect());
    let skip = usize::from(has_header);
    for line in &lines[skip..] {
        table.push_row(split_line(line, separator));
    }
    let large_input = lines.len() >= options.max_display_rows;

    progress(100, "Done");
    tracing::info!(
        rows = table.row_count(),
        columns = table.column_count(),
        separator = ?separator,
        has_header,
        "Parsed delimited text with automatic header detection"
    );
    Ok(Some(Loaded { table, large_input }))
}

/// Quote a field when it holds the separator, a quote, a line break or
/// surrounding whitespace. Embedded quotes are doubled.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    let needs_quotes = field.contains([',', '"', '\n', '\r'])
        || field.trim().len() != field.len();
    if needs_quotes {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Write the header line and every row as comma-separated UTF-8 text.
pub fn write_csv<W: Write>(out: &mut W, table: &Table) -> std::io::Result<()> {
    let header: Vec<Cow<'_, str>> = table.headers().map(escape_field).collect();
    writeln!(out, "{}", header.join(","))?;
    for row in 0..table.row_count() {
        let fields: Vec<Cow<'_, str>> = table.row_texts(row).into_iter().map(escape_field).collect();
        writeln!(out, "{}", fields.join(","))?;
    }
    Ok(())
}

pub fn to_csv_string(table: &Table) -> String {
    let mut buf = Vec::new();
    // writing to a Vec cannot fail
    let _ = write_csv(&mut buf, table);
    String::from_utf8_lossy(&buf).into_owned()
}
