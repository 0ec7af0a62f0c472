//! Best-effort detection of text encoding and field separator.
//!
//! Detection never fails: every function returns a guess with a confidence
//! in `[0, 1]`, and callers are free to override the result.

use super::LoadConfig;
use encoding_rs::{Encoding, GBK, UTF_8};
use std::fmt;
use std::str::FromStr;

/// Bytes inspected by [`detect_encoding`].
pub const ENCODING_SNIFF_BYTES: usize = 1024;

/// Lines inspected by [`detect_separator`].
pub const SEPARATOR_SAMPLE_LINES: usize = 10;

/// Separator candidates in tie-break order.
pub const SEPARATOR_CANDIDATES: [&str; 5] = [",", "\t", ";", "|", " "];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Gbk,
}

impl TextEncoding {
    fn encoding(self) -> &'static Encoding {
        match self {
            TextEncoding::Utf8 => UTF_8,
            TextEncoding::Gbk => GBK,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Gbk => "GBK",
        }
    }

    /// Decode bytes, replacing malformed sequences. A byte order mark wins
    /// over the chosen encoding.
    pub fn decode(self, bytes: &[u8]) -> String {
        let (text, used, had_errors) = self.encoding().decode(bytes);
        if had_errors {
            tracing::warn!(encoding = used.name(), "Malformed sequences replaced while decoding");
        }
        text.into_owned()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "gbk" | "gb2312" | "gb18030" => Ok(TextEncoding::Gbk),
            other => Err(format!("Unsupported encoding: {}", other)),
        }
    }
}

/// A detected value and how sure the detector is about it.
#[derive(Clone, Debug, PartialEq)]
pub struct Guess<T> {
    pub value: T,
    pub confidence: f32,
}

impl<T> Guess<T> {
    fn new(value: T, confidence: f32) -> Self {
        Guess { value, confidence }
    }
}

/// Guess the encoding from the first [`ENCODING_SNIFF_BYTES`] bytes.
///
/// Data with a NUL byte is treated as UTF-8/binary. Otherwise bytes that are
/// not valid UTF-8 point to GBK, the usual legacy encoding of the field
/// loggers this tool reads.
pub fn detect_encoding(bytes: &[u8]) -> Guess<TextEncoding> {
    let prefix = &bytes[..bytes.len().min(ENCODING_SNIFF_BYTES)];

    if prefix.contains(&0) {
        return Guess::new(TextEncoding::Utf8, 0.3);
    }

    match std::str::from_utf8(prefix) {
        Ok(text) if text.is_ascii() => Guess::new(TextEncoding::Utf8, 0.6),
        Ok(_) => Guess::new(TextEncoding::Utf8, 0.95),
        // cut in the middle of a multi-byte character
        Err(e) if e.error_len().is_none() => Guess::new(TextEncoding::Utf8, 0.8),
        Err(_) => {
            let (_, had_errors) = GBK.decode_without_bom_handling(prefix);
            if had_errors {
                Guess::new(TextEncoding::Gbk, 0.4)
            } else {
                Guess::new(TextEncoding::Gbk, 0.85)
            }
        }
    }
}

/// Guess the separator from the first [`SEPARATOR_SAMPLE_LINES`] lines.
///
/// The candidate with the most occurrences wins; ties go to the earlier
/// candidate, so comma wins any tie. Text without any candidate yields comma
/// with zero confidence.
pub fn detect_separator(text: &str) -> Guess<String> {
    let sample: Vec<&str> = text.lines().take(SEPARATOR_SAMPLE_LINES).collect();
    let counts: Vec<usize> = SEPARATOR_CANDIDATES
        .iter()
        .map(|sep| sample.iter().map(|line| line.matches(sep).count()).sum())
        .collect();

    let mut best = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = i;
        }
    }

    let total: usize = counts.iter().sum();
    let confidence = if total == 0 {
        0.0
    } else {
        counts[best] as f32 / total as f32
    };
    Guess::new(SEPARATOR_CANDIDATES[best].to_string(), confidence)
}

/// Detected load settings for a file.
#[derive(Clone, Debug, PartialEq)]
pub struct FormatGuess {
    pub encoding: Guess<TextEncoding>,
    pub separator: Guess<String>,
}

impl FormatGuess {
    /// The guess as a load configuration: first line is the header.
    pub fn to_config(&self) -> LoadConfig {
        LoadConfig {
            start_row: 1,
            has_header: true,
            encoding: self.encoding.value,
            separator: self.separator.value.clone(),
        }
    }
}

pub fn detect_format(bytes: &[u8]) -> FormatGuess {
    let encoding = detect_encoding(bytes);
    let text = encoding.value.decode(bytes);
    let separator = detect_separator(&text);
    tracing::debug!(
        encoding = %encoding.value,
        encoding_confidence = encoding.confidence,
        separator = ?separator.value,
        separator_confidence = separator.confidence,
        "Detected file format"
    );
    FormatGuess {
        encoding,
        separator,
    }
}

/// Cheap check used for spreadsheet files: does the first line look delimited?
pub fn looks_delimited(text: &str) -> bool {
    text.lines()
        .next()
        .is_some_and(|line| line.contains(',') || line.contains('\t') || line.contains(';'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_detected() {
        let guess = detect_separator("a,b,c\n1,2,3\n4,5,6\n");
        assert_eq!(guess.value, ",");
        assert_eq!(guess.confidence, 1.0);
    }

    #[test]
    fn test_tab_and_semicolon_detected() {
        assert_eq!(detect_separator("a\tb\n1\t2\n").value, "\t");
        assert_eq!(detect_separator("a;b;c\n1,5;2;3\n").value, ";");
    }

    #[test]
    fn test_tie_prefers_comma() {
        // one comma and one space per line
        let guess = detect_separator("a, b\n1, 2\n");
        assert_eq!(guess.value, ",");
        assert_eq!(guess.confidence, 0.5);
    }

    #[test]
    fn test_no_separator_defaults_to_comma() {
        let guess = detect_separator("single\ncolumn\n");
        assert_eq!(guess.value, ",");
        assert_eq!(guess.confidence, 0.0);
    }

    #[test]
    fn test_only_sample_lines_are_counted() {
        let mut text = String::new();
        for _ in 0..SEPARATOR_SAMPLE_LINES {
            text.push_str("a|b\n");
        }
        for _ in 0..50 {
            text.push_str("a,b,c,d\n");
        }
        assert_eq!(detect_separator(&text).value, "|");
    }

    #[test]
    fn test_encoding_utf8() {
        assert_eq!(detect_encoding(b"time,pressure\n").value, TextEncoding::Utf8);
        let guess = detect_encoding("时间,压力\n".as_bytes());
        assert_eq!(guess.value, TextEncoding::Utf8);
        assert!(guess.confidence > 0.9);
    }

    #[test]
    fn test_encoding_gbk() {
        let (bytes, _, _) = GBK.encode("时间,压力\n0,30\n");
        let guess = detect_encoding(&bytes);
        assert_eq!(guess.value, TextEncoding::Gbk);
        assert_eq!(TextEncoding::Gbk.decode(&bytes), "时间,压力\n0,30\n");
    }

    #[test]
    fn test_encoding_nul_means_binary() {
        let guess = detect_encoding(b"PK\x03\x04\x00\x00");
        assert_eq!(guess.value, TextEncoding::Utf8);
        assert!(guess.confidence < 0.5);
    }

    #[test]
    fn test_truncated_utf8_prefix_is_still_utf8() {
        let mut bytes = vec![b'a'; ENCODING_SNIFF_BYTES - 1];
        bytes.extend_from_slice("压".as_bytes());
        assert_eq!(detect_encoding(&bytes).value, TextEncoding::Utf8);
    }

    #[test]
    fn test_detect_format_builds_config() {
        let guess = detect_format(b"t;p\n0;30\n");
        let config = guess.to_config();
        assert_eq!(config.separator, ";");
        assert_eq!(config.start_row, 1);
        assert!(config.has_header);
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!("gb2312".parse::<TextEncoding>(), Ok(TextEncoding::Gbk));
        assert_eq!("UTF-8".parse::<TextEncoding>(), Ok(TextEncoding::Utf8));
        assert!("ebcdic".parse::<TextEncoding>().is_err());
    }
}
