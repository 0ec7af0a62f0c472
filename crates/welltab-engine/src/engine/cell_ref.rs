//! Spreadsheet-style cell addresses.
//!
//! `"B3"` is column 1, data row 2 (both 0-indexed). Headers are not
//! addressable: row 1 is the first data row.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

fn a1_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$").expect("valid cell address regex")
    })
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    fn parse_a1(name: &str) -> Option<CellRef> {
        let caps = a1_regex().captures(name.trim())?;

        let mut col_acc = 0usize;
        for c in caps["letters"].to_ascii_uppercase().bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;
        let row = caps["numbers"].parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellRef::new(row, col))
    }

    /// Column letters for a 0-indexed column: 0 → A, 25 → Z, 26 → AA.
    pub fn col_to_letters(col: usize) -> String {
        let mut result = Vec::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.push(b'A' + (n % 26) as u8);
            n /= 26;
        }
        result.iter().rev().map(|&b| b as char).collect()
    }
}

impl FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| format!("Invalid cell address: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::CellRef;

    #[test]
    fn test_parse_and_display() {
        let r: CellRef = "b3".parse().unwrap();
        assert_eq!(r, CellRef::new(2, 1));
        assert_eq!(r.to_string(), "B3");
        assert_eq!("AA10".parse::<CellRef>().unwrap().col, 26);
    }

    #[test]
    fn test_rejects_row_zero_and_garbage() {
        assert!("A0".parse::<CellRef>().is_err());
        assert!("3B".parse::<CellRef>().is_err());
        let huge = format!("{}1", "Z".repeat(40));
        assert!(huge.parse::<CellRef>().is_err());
    }
}
