//! Sheet selection and column discovery ahead of mapping.

use std::collections::{BTreeSet, HashSet};

use crate::types::{ColumnMapping, Sheet, SheetKey};

/// Returns the sheets whose [`SheetKey`] is in `keys`, preserving ingestion order.
pub fn select_sheets(sheets: &[Sheet], keys: &[SheetKey]) -> Vec<Sheet> {
    let wanted: HashSet<&SheetKey> = keys.iter().collect();
    sheets
        .iter()
        .filter(|s| wanted.contains(&s.key()))
        .cloned()
        .collect()
}

/// Sorted, de-duplicated union of every sheet's headers.
pub fn available_columns(sheets: &[Sheet]) -> Vec<String> {
    sheets
        .iter()
        .flat_map(|s| s.headers.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// `true` if there is at least one mapping and each names both a source and a target.
pub fn mappings_are_complete(mappings: &[ColumnMapping]) -> bool {
    !mappings.is_empty()
        && mappings
            .iter()
            .all(|m| !m.source_column.is_empty() && !m.target_column.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{available_columns, mappings_are_complete, select_sheets};
    use crate::types::{ColumnMapping, Sheet, SheetKey};

    fn sheet(file: &str, name: &str, headers: &[&str]) -> Sheet {
        Sheet {
            file_name: file.to_string(),
            sheet_name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    #[test]
    fn selection_keeps_ingestion_order() {
        let sheets = vec![
            sheet("a.xlsx", "One", &[]),
            sheet("a.xlsx", "Two", &[]),
            sheet("b.xlsx", "One", &[]),
        ];
        let keys = vec![SheetKey::new("b.xlsx", "One"), SheetKey::new("a.xlsx", "One")];

        let picked: Vec<String> = select_sheets(&sheets, &keys).iter().map(|s| s.key().to_string()).collect();
        assert_eq!(picked, vec!["a.xlsx:One", "b.xlsx:One"]);
        assert!(select_sheets(&sheets, &[]).is_empty());
    }

    #[test]
    fn available_columns_is_sorted_union() {
        let sheets = vec![sheet("a.xlsx", "S", &["b", "a"]), sheet("b.xlsx", "S", &["c", "a"])];
        assert_eq!(available_columns(&sheets), vec!["a", "b", "c"]);
    }

    #[test]
    fn mapping_completeness() {
        assert!(!mappings_are_complete(&[]));
        assert!(mappings_are_complete(&[ColumnMapping::new("a", "b")]));
        assert!(!mappings_are_complete(&[ColumnMapping::new("a", "b"), ColumnMapping::new("", "c")]));
        assert!(!mappings_are_complete(&[ColumnMapping::new("a", "")]));
    }
}
