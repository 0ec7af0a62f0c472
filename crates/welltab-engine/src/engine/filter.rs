//! Read-only row filtering with shell-style wildcards.

use super::table::Table;
use regex::{Regex, RegexBuilder};

/// Case-insensitive wildcard match against any cell of a row.
///
/// `*` matches any run of characters and `?` a single character. The
/// pattern is unanchored, so plain text behaves as a substring search.
#[derive(Clone, Debug)]
pub struct RowFilter {
    pattern: String,
    regex: Option<Regex>,
}

impl RowFilter {
    pub fn wildcard(pattern: &str) -> Result<Self, regex::Error> {
        let trimmed = pattern.trim();
        let regex = if trimmed.is_empty() {
            None
        } else {
            Some(
                RegexBuilder::new(&wildcard_to_regex(trimmed))
                    .case_insensitive(true)
                    .build()?,
            )
        };
        Ok(RowFilter {
            pattern: trimmed.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches_row(&self, table: &Table, row: usize) -> bool {
        match &self.regex {
            None => row < table.row_count(),
            Some(re) => (0..table.column_count()).any(|col| re.is_match(table.cell(row, col))),
        }
    }

    /// Indices of the rows that pass the filter, in table order.
    pub fn visible_rows(&self, table: &Table) -> Vec<usize> {
        (0..table.row_count())
            .filter(|&row| self.matches_row(table, row))
            .collect()
    }
}

fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    out
}
