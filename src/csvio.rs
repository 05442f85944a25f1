// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Minimal CSV reading and writing.
//!
//! Handles what spreadsheet and RMM exports actually produce: a header row,
//! double-quoted fields with `""` escapes and embedded separators or newlines,
//! CRLF line endings and a UTF-8 byte-order mark.

use std::io::Write;

use crate::error::{BuildTierError, Result};

/// A parsed CSV document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parse text whose first record is the header
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut records = parse_records(text)?.into_iter();
        let header = match records.next() {
            Some(h) => h.into_iter().map(|c| c.trim().to_string()).collect(),
            None => return Ok(Self::default()),
        };
        let rows = records
            .filter(|r| !(r.len() == 1 && r[0].trim().is_empty()))
            .collect();
        Ok(Self { header, rows })
    }

    /// Position of a header column
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

fn parse_records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();
    let mut line = 1usize;

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
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if in_quotes {
        return Err(BuildTierError::Parse(format!(
            "unterminated quoted field at line {}",
            line
        )));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write one CSV record terminated by `\n`
pub fn write_record<W: Write, S: AsRef<str>>(out: &mut W, fields: &[S]) -> Result<()> {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f.as_ref())).collect();
    writeln!(out, "{}", line.join(","))?;
    Ok(())
}
