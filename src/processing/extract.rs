//! Column projection/renaming for normalized sheets.

use crate::error::{PipelineError, PipelineResult};
use crate::types::{ColumnMapping, Record, Sheet};

/// Project every row of every sheet through `mappings`.
///
/// For each row, mappings are applied in order: `row[source_column]` (missing keys read as
/// `Null`) is copied to `target_column`, and a later mapping with the same target overwrites an
/// earlier one. A `required` mapping whose value is null/missing/empty aborts the whole call with
/// [`PipelineError::MissingRequiredColumn`]; no partial output is returned.
///
/// Output order is sheet order, then row order.
pub fn extract(sheets: &[Sheet], mappings: &[ColumnMapping]) -> PipelineResult<Vec<Record>> {
    let mut out = Vec::with_capacity(sheets.iter().map(Sheet::row_count).sum());
    for sheet in sheets {
        for (idx0, row) in sheet.rows.iter().enumerate() {
            let mut extracted = Record::with_capacity(mappings.len());
            for mapping in mappings {
                let value = row.value(&mapping.source_column);
                if mapping.required && value.is_blank() {
                    return Err(PipelineError::MissingRequiredColumn {
                        file_name: sheet.file_name.clone(),
                        sheet_name: sheet.sheet_name.clone(),
                        column: mapping.source_column.clone(),
                        row: idx0 + 1,
                    });
                }
                extracted.insert(mapping.target_column.as_str(), value.clone());
            }
            out.push(extracted);
        }
    }
    Ok(out)
}
