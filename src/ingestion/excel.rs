//! Workbook decoding.
//!
//! Turns raw `.xlsx`/`.xls`/`.xlsb` bytes into [`RawSheet`]s: one grid of typed [`Cell`]s per
//! worksheet, in workbook order. No header or coercion policy is applied here; see
//! [`super::normalize`].

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDateTime;

/// A typed worksheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    String(String),
    Int(i64),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// One decoded worksheet.
///
/// Fully blank rows are dropped and trailing empty cells are trimmed, so rows may be ragged.
/// Column positions are relative to the first used column of the sheet, so columns left of the
/// used range never appear.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Decode every worksheet in `bytes`.
///
/// The container format is sniffed from the bytes, so this works for any format calamine can
/// open.
pub fn decode_workbook(bytes: &[u8]) -> Result<Vec<RawSheet>, calamine::Error> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        sheets.push(RawSheet {
            rows: range_to_rows(&range),
            name,
        });
    }
    Ok(sheets)
}

fn range_to_rows(range: &calamine::Range<Data>) -> Vec<Vec<Cell>> {
    let mut rows = Vec::new();
    for row in range.rows() {
        let mut cells: Vec<Cell> = row.iter().map(convert_cell).collect();

        while cells.last().is_some_and(Cell::is_empty) {
            cells.pop();
        }
        if !cells.is_empty() {
            rows.push(cells);
        }
    }
    rows
}

fn convert_cell(c: &Data) -> Cell {
    match c {
        Data::Empty => Cell::Null,
        Data::String(s) => Cell::String(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if dt.is_datetime() => Cell::DateTime(ndt),
            _ => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::String(s.clone()),
        Data::Error(e) => Cell::String(e.to_string()),
    }
}
