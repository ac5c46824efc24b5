// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Minimal CSV line codec
//!
//! Fields containing a comma, a double quote, CR or LF are wrapped in double
//! quotes with inner quotes doubled. Quoted fields may span lines. Blank
//! lines between rows are skipped.

use std::borrow::Cow;
use tallyboard_core::{Result, TallyboardError};

/// Parsed CSV row with the 1-based line number it started on
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Quote a field if it needs it
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Encode one row, without the trailing newline
pub fn encode_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split CSV text into rows
pub fn parse_rows(text: &str) -> Result<Vec<CsvRow>> {
    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut row_start = 1usize;
    let mut row_has_content = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                row_has_content = true;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                row_has_content = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                if row_has_content || !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                    rows.push(CsvRow {
                        line: row_start,
                        fields: std::mem::take(&mut fields),
                    });
                }
                row_has_content = false;
                line += 1;
                row_start = line;
            }
            _ => {
                field.push(c);
                row_has_content = true;
            }
        }
    }

    if in_quotes {
        return Err(TallyboardError::MalformedRow {
            line: row_start,
            reason: "unterminated quoted field".to_string(),
        });
    }

    if row_has_content || !field.is_empty() {
        fields.push(field);
        rows.push(CsvRow {
            line: row_start,
            fields,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_field_is_borrowed() {
        assert!(matches!(escape_field("Study"), Cow::Borrowed("Study")));
    }

    #[test]
    fn test_escape_special_fields() {
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_parse_simple_rows() {
        let rows = parse_rows("timestamp,label,value\n2024-01-01,A,10.0\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].fields, vec!["2024-01-01", "A", "10.0"]);
        assert_eq!(rows[1].line, 2);
    }

    #[test]
    fn test_parse_quoted_fields_and_crlf() {
        let text = "a,b\r\n\"x,y\",\"he said \"\"no\"\"\"\r\n";
        let rows = parse_rows(text).unwrap();
        assert_eq!(rows[1].fields, vec!["x,y", "he said \"no\""]);
    }

    #[test]
    fn test_parse_multiline_field_tracks_lines() {
        let text = "h\n\"one\ntwo\"\nlast\n";
        let rows = parse_rows(text).unwrap();
        assert_eq!(rows[1].fields, vec!["one\ntwo"]);
        assert_eq!(rows[2].line, 4);
    }

    #[test]
    fn test_parse_skips_blank_lines_and_keeps_empty_fields() {
        let rows = parse_rows("a,b,c\n\n,,\nx,,z").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].fields, vec!["", "", ""]);
        assert_eq!(rows[2].fields, vec!["x", "", "z"]);
    }

    #[test]
    fn test_parse_unterminated_quote() {
        let err = parse_rows("a\n\"open").unwrap_err();
        assert!(matches!(err, TallyboardError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_encode_then_parse_preserves_fields() {
        let fields = ["2024-01-01T10:00:00", "Work, deep", "3.5"];
        let rows = parse_rows(&encode_row(&fields)).unwrap();
        assert_eq!(rows[0].fields, fields);
    }
}
