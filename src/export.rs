//! Re-serialization of records into a single-sheet `.xlsx` workbook.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Record, Value};

/// Name of the only worksheet in exported workbooks.
pub const EXPORT_SHEET_NAME: &str = "Sheet1";

/// Serialize `records` into `.xlsx` bytes.
///
/// Column order is the key order of the first record; later records are written by key lookup
/// (missing keys stay blank). `Null` is written as an empty cell, strings as text and numbers as
/// numeric cells.
///
/// Fails with [`PipelineError::EmptyDataset`] if `records` is empty.
pub fn export_to_bytes(records: &[Record]) -> PipelineResult<Vec<u8>> {
    let first = records.first().ok_or(PipelineError::EmptyDataset)?;
    let columns: Vec<&str> = first.keys().collect();

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string(0, col_num(col)?, *name)?;
    }

    for (idx0, record) in records.iter().enumerate() {
        let row = u32::try_from(idx0 + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, name) in columns.iter().enumerate() {
            let col = col_num(col)?;
            match record.value(name) {
                Value::Null => {}
                Value::Utf8(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                Value::Int64(i) => {
                    worksheet.write_number(row, col, *i as f64)?;
                }
                Value::Float64(f) => {
                    worksheet.write_number(row, col, *f)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn col_num(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

/// `"{title}_{timestamp}.xlsx"`, with the ISO-8601 UTC instant made filename-safe
/// (`:` and `.` replaced by `-`).
pub fn export_file_name(title: &str, at: DateTime<Utc>) -> String {
    let timestamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{title}_{timestamp}.xlsx")
}

/// Export `records` into `dir` as a timestamped workbook and return the written path.
///
/// The bytes are fully produced before the destination is touched, so a failed export leaves no
/// file behind.
pub fn export_to_path(records: &[Record], dir: impl AsRef<Path>, title: &str) -> PipelineResult<PathBuf> {
    let bytes = export_to_bytes(records)?;
    let path = dir.as_ref().join(export_file_name(title, Utc::now()));
    fs::write(&path, bytes)?;
    Ok(path)
}
