//! # ASCII Table Formatter
//!
//! Renders result sets as bordered text tables.
//!
//! ## Output Format
//!
//! ```text
//! +-------+--------+-------+
//! | name  | active | count |
//! +-------+--------+-------+
//! | Algol | TRUE   |   1   |
//! | Bár   | NULL   |  12.5 |
//! +-------+--------+-------+
//! ```
//!
//! ## Field Rendering
//!
//! Each raw value passes through [`render_field`] before layout:
//! - Booleans: `TRUE` / `FALSE`
//! - Arrays and objects: single-line JSON with sorted keys, `", "` and
//!   `": "` separators, non-ASCII characters kept verbatim
//! - Null: no text; the formatter substitutes `NULL`
//! - Strings: the string itself, unquoted
//! - Numbers: their JSON text
//!
//! Booleans are matched before the structured case so that a boolean is
//! never shown as JSON `true`.
//!
//! ## Column Width Calculation
//!
//! A column is as wide as its widest cell or header, measured in terminal
//! columns (`unicode-width`), so wide CJK characters count twice and
//! combining marks not at all. `NULL` counts as four columns.
//!
//! ## Alignment
//!
//! A column whose non-null cells all parse as numbers is numeric: values
//! are padded so their decimal points line up, then right-justified, and
//! the header is right-justified. Every other column is left-justified.

use crate::config::{FALSE_TOKEN, NULL_TOKEN, TRUE_TOKEN};
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;
use std::io;
use unicode_width::UnicodeWidthStr;

pub struct TableFormatter {
    headers: Vec<String>,
    widths: Vec<usize>,
    numeric: Vec<bool>,
    rows: Vec<Vec<String>>,
}

impl TableFormatter {
    pub fn new(headers: Vec<String>, rows: &[Vec<Value>]) -> Self {
        let rendered: Vec<Vec<Option<String>>> = rows
            .iter()
            .map(|row| row.iter().map(render_field).collect())
            .collect();
        Self::from_rendered(headers, rendered)
    }

    pub fn from_rendered(mut headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let column_count = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);
        headers.resize(column_count, String::new());

        let numeric: Vec<bool> = (0..column_count)
            .map(|col| {
                is_numeric_column(rows.iter().map(|row| row.get(col).and_then(|c| c.as_deref())))
            })
            .collect();

        let mut columns: Vec<Vec<String>> = (0..column_count)
            .map(|col| {
                rows.iter()
                    .map(|row| {
                        row.get(col)
                            .cloned()
                            .flatten()
                            .unwrap_or_else(|| NULL_TOKEN.to_string())
                    })
                    .collect()
            })
            .collect();

        for (col, cells) in columns.iter_mut().enumerate() {
            if numeric[col] {
                align_decimals(cells);
            }
        }

        let widths: Vec<usize> = headers
            .iter()
            .zip(&columns)
            .map(|(header, cells)| {
                cells
                    .iter()
                    .map(|c| display_width(c))
                    .chain(std::iter::once(display_width(header)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let rows = (0..rows.len())
            .map(|r| columns.iter().map(|cells| cells[r].clone()).collect())
            .collect();

        Self {
            headers,
            widths,
            numeric,
            rows,
        }
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        if self.widths.is_empty() {
            return output;
        }

        self.write_separator(&mut output);
        self.write_row(&mut output, &self.headers);
        self.write_separator(&mut output);

        for row in &self.rows {
            self.write_row(&mut output, row);
        }

        self.write_separator(&mut output);
        output.pop();

        output
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn write_separator(&self, output: &mut String) {
        output.push('+');
        for width in &self.widths {
            output.push_str(&"-".repeat(width + 2));
            output.push('+');
        }
        output.push('\n');
    }

    fn write_row(&self, output: &mut String, cells: &[String]) {
        output.push('|');
        for (i, cell) in cells.iter().enumerate() {
            output.push(' ');
            if self.numeric[i] {
                pad_left(output, cell, self.widths[i]);
            } else {
                pad_right(output, cell, self.widths[i]);
            }
            output.push_str(" |");
        }
        output.push('\n');
    }
}

pub fn render_field(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(true) => Some(TRUE_TOKEN.to_string()),
        Value::Bool(false) => Some(FALSE_TOKEN.to_string()),
        Value::Array(_) | Value::Object(_) => Some(to_display_json(value)),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
    }
}

/// Object keys come out sorted because `serde_json::Map` is ordered by key.
fn to_display_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => value.to_string(),
    }
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn is_numeric_column<'a>(cells: impl Iterator<Item = Option<&'a str>>) -> bool {
    let mut seen_number = false;
    for cell in cells.flatten() {
        if cell.trim().parse::<f64>().is_err() {
            return false;
        }
        seen_number = true;
    }
    seen_number
}

/// Digits after the decimal point (or exponent marker); `None` for integers
/// and non-numbers such as `NULL`.
fn digits_after_point(cell: &str) -> Option<usize> {
    if cell.parse::<f64>().is_err() || cell.parse::<i64>().is_ok() {
        return None;
    }
    let lowered = cell.to_ascii_lowercase();
    lowered
        .rfind('.')
        .or_else(|| lowered.rfind('e'))
        .map(|pos| cell.len() - pos - 1)
}

fn align_decimals(cells: &mut [String]) {
    let decimals: Vec<Option<usize>> = cells.iter().map(|c| digits_after_point(c)).collect();
    let Some(max_decimals) = decimals.iter().flatten().copied().max() else {
        return;
    };

    for (cell, decimals) in cells.iter_mut().zip(decimals) {
        let padding = match decimals {
            Some(d) => max_decimals - d,
            None => max_decimals + 1,
        };
        cell.push_str(&" ".repeat(padding));
    }
}

fn pad_right(output: &mut String, cell: &str, width: usize) {
    output.push_str(cell);
    output.push_str(&" ".repeat(width.saturating_sub(display_width(cell))));
}

fn pad_left(output: &mut String, cell: &str, width: usize) {
    output.push_str(&" ".repeat(width.saturating_sub(display_width(cell))));
    output.push_str(cell);
}
