//! Sheet normalization: header-row policy and value coercion.
//!
//! A decoded [`RawSheet`] becomes a [`Sheet`] as follows:
//!
//! 1. Pick the header row and first data row from the [`HeaderRules`] table (first rule whose
//!    pattern is a case-insensitive substring of the sheet name; otherwise row 0 / row 1).
//! 2. Skip sheets with fewer than 2 raw rows, reporting [`IngestionWarning::InsufficientData`].
//! 3. Column count is the longest raw row.
//! 4. Headers are the coerced header cells; empty positions become `Column {n}` (1-based).
//! 5. Each data row maps every header to its coerced cell.
//!
//! Coercion ([`coerce_cell`]) is lossy: every cell becomes a string or null.
//!
//! | Cell             | Value                              |
//! |------------------|------------------------------------|
//! | empty / `""`     | `Null`                             |
//! | string           | the string                         |
//! | number           | decimal string (`1`, `98.5`)       |
//! | boolean          | `"true"` / `"false"`               |
//! | date/time        | `YYYY-MM-DDTHH:MM:SS.mmmZ`         |

use serde::{Deserialize, Serialize};

use crate::types::{Record, Sheet, Value};

use super::excel::{Cell, RawSheet};
use super::observability::IngestionWarning;

/// Minimum number of raw rows (header + data) for a sheet to be kept.
pub const MIN_RAW_ROWS: usize = 2;

/// Header placement for worksheets whose name contains `name_pattern` (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderRule {
    pub name_pattern: String,
    /// 0-based raw row holding the column names.
    pub header_row: usize,
    /// 0-based raw row where data starts.
    pub data_start: usize,
}

impl HeaderRule {
    pub fn new(name_pattern: impl Into<String>, header_row: usize, data_start: usize) -> Self {
        Self {
            name_pattern: name_pattern.into(),
            header_row,
            data_start,
        }
    }

    /// `true` if this rule applies to `sheet_name`.
    pub fn matches(&self, sheet_name: &str) -> bool {
        sheet_name
            .to_lowercase()
            .contains(&self.name_pattern.to_lowercase())
    }
}

/// Ordered header-rule table; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderRules {
    rules: Vec<HeaderRule>,
}

impl HeaderRules {
    /// A table with the given rules, in priority order.
    pub fn new(rules: Vec<HeaderRule>) -> Self {
        Self { rules }
    }

    /// A table with no rules: every sheet uses row 0 / row 1.
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[HeaderRule] {
        &self.rules
    }

    /// Returns `(header_row, data_start)` for `sheet_name`.
    pub fn resolve(&self, sheet_name: &str) -> (usize, usize) {
        self.rules
            .iter()
            .find(|r| r.matches(sheet_name))
            .map_or((0, 1), |r| (r.header_row, r.data_start))
    }
}

impl Default for HeaderRules {
    /// "Agent wise" report sheets carry a title row above the column names.
    fn default() -> Self {
        Self::new(vec![HeaderRule::new("agent wise", 1, 2)])
    }
}

/// Result of normalizing one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Sheet(Sheet),
    Skipped(IngestionWarning),
}

/// Normalize a decoded worksheet from `file_name` into a [`Sheet`].
pub fn normalize_sheet(file_name: &str, raw: &RawSheet, rules: &HeaderRules) -> Normalized {
    if raw.rows.len() < MIN_RAW_ROWS {
        return Normalized::Skipped(IngestionWarning::InsufficientData {
            sheet_name: raw.name.clone(),
            rows: raw.rows.len(),
        });
    }

    let (header_row, data_start) = rules.resolve(&raw.name);
    let column_count = raw.rows.iter().map(Vec::len).max().unwrap_or(0);
    let headers = build_headers(raw.rows.get(header_row), column_count);

    let rows = raw
        .rows
        .get(data_start..)
        .unwrap_or_default()
        .iter()
        .map(|cells| build_record(&headers, cells))
        .collect();

    Normalized::Sheet(Sheet {
        file_name: file_name.to_string(),
        sheet_name: raw.name.clone(),
        headers,
        rows,
    })
}

fn build_headers(header_cells: Option<&Vec<Cell>>, column_count: usize) -> Vec<String> {
    (0..column_count)
        .map(|i| {
            let cell = header_cells.and_then(|cells| cells.get(i));
            match cell.map(coerce_cell) {
                Some(Value::Utf8(name)) => name,
                _ => format!("Column {}", i + 1),
            }
        })
        .collect()
}

fn build_record(headers: &[String], cells: &[Cell]) -> Record {
    let mut record = Record::with_capacity(headers.len());
    for (i, header) in headers.iter().enumerate() {
        let value = cells.get(i).map_or(Value::Null, coerce_cell);
        record.insert(header.as_str(), value);
    }
    record
}

/// Coerce a typed cell to its string-or-null value.
pub fn coerce_cell(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::String(s) if s.is_empty() => Value::Null,
        Cell::String(s) => Value::Utf8(s.clone()),
        Cell::Int(i) => Value::Utf8(i.to_string()),
        Cell::Number(f) => Value::Utf8(f.to_string()),
        Cell::Bool(b) => Value::Utf8(b.to_string()),
        Cell::DateTime(dt) => Value::Utf8(dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
    }
}
