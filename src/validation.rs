//! Header-set validation against an expected schema.

use std::collections::HashSet;

use crate::types::Sheet;

/// Outcome of [`validate_format`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// `true` iff no sheet is missing an expected column.
    pub is_valid: bool,
    /// One message per failing sheet, in sheet order.
    pub errors: Vec<String>,
}

/// Check that every sheet's headers contain each of `expected_columns`.
///
/// Duplicates in `expected_columns` are ignored; missing columns are listed in the order they
/// first appear in `expected_columns`.
pub fn validate_format<S: AsRef<str>>(sheets: &[Sheet], expected_columns: &[S]) -> ValidationReport {
    let mut seen = HashSet::new();
    let expected: Vec<&str> = expected_columns
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| seen.insert(*c))
        .collect();

    let errors: Vec<String> = sheets
        .iter()
        .filter_map(|sheet| {
            let missing: Vec<&str> = expected
                .iter()
                .copied()
                .filter(|col| !sheet.headers.iter().any(|h| h == col))
                .collect();
            (!missing.is_empty()).then(|| {
                format!(
                    "File {}, Sheet {}: Missing columns: {}",
                    sheet.file_name,
                    sheet.sheet_name,
                    missing.join(", ")
                )
            })
        })
        .collect();

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}
