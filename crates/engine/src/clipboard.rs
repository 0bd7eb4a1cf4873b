//! Clipboard codec: TSV encode/decode and per-column value coercion.
//!
//! Decoding follows RFC 4180 quoting with tab as the field separator, which is
//! what spreadsheet applications put on the system clipboard.
//!
//! Platform clipboard I/O is asynchronous on most hosts, so the grid splits
//! copy/cut/paste into two phases joined by a [`ClipboardTicket`]; see
//! `Grid::begin_copy` and friends.

use std::fmt;

use gridkit_core::{CellPos, Range};

use crate::column::{Column, ColumnType};
use crate::value::{row_value, Row, Value};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// The host refused access to the clipboard.
    PermissionDenied,
    /// Nothing (or no text) on the clipboard.
    Empty,
    /// The host has no clipboard API.
    Unsupported,
    /// The grid's shape changed while the operation was in flight.
    StaleTarget,
    Platform(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::PermissionDenied => write!(f, "clipboard access denied"),
            ClipboardError::Empty => write!(f, "clipboard is empty"),
            ClipboardError::Unsupported => write!(f, "clipboard not supported"),
            ClipboardError::StaleTarget => write!(f, "grid changed before the clipboard operation completed"),
            ClipboardError::Platform(msg) => write!(f, "clipboard error: {}", msg),
        }
    }
}

impl std::error::Error for ClipboardError {}

// ============================================================================
// Encode
// ============================================================================

/// Encode the range as TSV. Rows and columns are indexed positionally;
/// positions outside the slices are skipped. No quoting is applied.
pub fn encode(rows: &[Row], columns: &[Column], range: &Range) -> String {
    encode_range(rows, columns, range, false)
}

/// Like [`encode`], but quotes fields containing tabs, line breaks or quotes
/// so that [`decode`] reconstructs the same matrix.
pub fn encode_quoted(rows: &[Row], columns: &[Column], range: &Range) -> String {
    encode_range(rows, columns, range, true)
}

fn encode_range(rows: &[Row], columns: &[Column], range: &Range, quoted: bool) -> String {
    let keys: Vec<&str> = (range.start_col..=range.end_col)
        .filter_map(|c| columns.get(c))
        .map(|c| c.key.as_str())
        .collect();
    let selected = (range.start_row..=range.end_row).filter_map(|r| rows.get(r));
    encode_rows(selected, &keys, quoted)
}

/// Encode already-selected rows, one field per key.
pub fn encode_rows<'a, I>(rows: I, keys: &[&str], quoted: bool) -> String
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut out = String::new();
    for (i, row) in rows.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (j, key) in keys.iter().enumerate() {
            if j > 0 {
                out.push('\t');
            }
            let text = row_value(row, key).to_string();
            if quoted {
                push_quoted(&mut out, &text);
            } else {
                out.push_str(&text);
            }
        }
    }
    out
}

fn push_quoted(out: &mut String, field: &str) {
    if !field.contains(['\t', '\n', '\r', '"']) {
        out.push_str(field);
        return;
    }
    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}

// ============================================================================
// Decode
// ============================================================================

/// Normalize clipboard line endings (`\r\n`, bare `\r`) to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decode clipboard text into a matrix of fields.
///
/// A field starting with `"` runs to the matching unescaped quote and may
/// contain tabs and newlines; `""` inside it is a literal quote. A single
/// trailing empty row is dropped, so empty input decodes to no rows.
pub fn decode(text: &str) -> Vec<Vec<String>> {
    let text = normalize_line_endings(text);

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            '\t' => {
                row.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                at_field_start = true;
            }
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }
    row.push(field);
    rows.push(row);

    if rows.last().is_some_and(|r| r.len() == 1 && r[0].is_empty()) {
        rows.pop();
    }
    rows
}

// ============================================================================
// Coercion
// ============================================================================

/// Convert a pasted field to a value for `column`.
///
/// Empty text becomes null. Number columns parse when possible and keep the
/// raw text otherwise; validation is left to the column's validator. Date
/// columns keep the text, which their comparator reads as ISO 8601.
pub fn coerce_for_column(raw: &str, column: &Column) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match column.column_type {
        ColumnType::Number => match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::text(raw),
        },
        ColumnType::Boolean => Value::Bool(raw.eq_ignore_ascii_case("true") || raw == "1"),
        _ => Value::text(raw),
    }
}

// ============================================================================
// Two-phase operations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardOp {
    Copy,
    Cut,
    Paste,
}

impl fmt::Display for ClipboardOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClipboardOp::Copy => "copy",
            ClipboardOp::Cut => "cut",
            ClipboardOp::Paste => "paste",
        })
    }
}

/// Snapshot of the target taken when a clipboard operation starts.
///
/// The grid checks it against its current shape before applying the result.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardTicket {
    pub op: ClipboardOp,
    /// Effective selection (visual space) at start.
    pub range: Range,
    /// Structure revision at start. Any row or column add/delete/move bumps it.
    pub structure_rev: u64,
    /// Visible column keys covered by `range`.
    pub column_keys: Vec<String>,
    /// Data indices of the rows covered by `range`.
    pub data_rows: Vec<usize>,
}

impl ClipboardTicket {
    pub fn anchor(&self) -> CellPos {
        self.range.start()
    }
}

/// Platform clipboard access.
pub trait ClipboardProvider {
    fn read_text(&mut self) -> Result<String, ClipboardError>;
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// In-process clipboard, for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    denied: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self { contents: Some(text.into()), denied: false }
    }

    /// Make every subsequent read and write fail with `PermissionDenied`.
    pub fn deny(&mut self) {
        self.denied = true;
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl ClipboardProvider for MemoryClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        if self.denied {
            return Err(ClipboardError::PermissionDenied);
        }
        self.contents.clone().ok_or(ClipboardError::Empty)
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.denied {
            return Err(ClipboardError::PermissionDenied);
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}
