//! Core data model.
//!
//! Ingestion produces [`Sheet`]s whose rows are ordered [`Record`]s keyed by the sheet headers.
//! Processing consumes records plus the declarative [`ColumnMapping`] and [`GroupingConfig`]
//! descriptions, which can be loaded from JSON.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single scalar value in a [`Record`].
///
/// Ingested cells are always [`Value::Null`] or [`Value::Utf8`]; numeric variants appear in
/// aggregation output.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// UTF-8 string.
    Utf8(String),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
}

static NULL: Value = Value::Null;

impl Value {
    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `true` for null values and empty strings.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Utf8(s) => s.is_empty(),
            Self::Int64(_) | Self::Float64(_) => false,
        }
    }

    /// Borrow the string payload, if this is a [`Value::Utf8`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s),
            _ => None,
        }
    }

    /// Lenient numeric view used by aggregation.
    ///
    /// Strings are trimmed and parsed as `f64`; anything unparsable counts as `0`. Only finite
    /// numbers are accepted, so `NaN`, `inf` or `infinity` text also reads as `0`.
    pub fn to_number(&self) -> f64 {
        let n = match self {
            Self::Null => 0.0,
            Self::Int64(i) => *i as f64,
            Self::Float64(f) => *f,
            Self::Utf8(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        if n.is_finite() { n } else { 0.0 }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Utf8(s) => f.write_str(s),
            Self::Int64(i) => write!(f, "{i}"),
            Self::Float64(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Utf8(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Utf8(s)
    }
}

impl From<Option<&str>> for Value {
    fn from(s: Option<&str>) -> Self {
        s.map_or(Self::Null, Self::from)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float64(f)
    }
}

/// An ordered key/value record.
///
/// Keys keep their first-insertion position; inserting an existing key replaces its value in
/// place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with room for `n` fields.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(n),
        }
    }

    /// Set `key` to `value`, overwriting (but not moving) an existing entry.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Returns the value under `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the value under `key`, treating a missing key as [`Value::Null`].
    pub fn value(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&NULL)
    }

    /// Iterate keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Identifies one worksheet of one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetKey {
    pub file_name: String,
    pub sheet_name: String,
}

impl SheetKey {
    pub fn new(file_name: impl Into<String>, sheet_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            sheet_name: sheet_name.into(),
        }
    }
}

impl fmt::Display for SheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_name, self.sheet_name)
    }
}

/// One worksheet normalized into headers plus string-or-null rows.
///
/// Every row's key set is the set of `headers`; `headers` may contain duplicates, in which case
/// the right-most column wins for that key.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Name of the originating file.
    pub file_name: String,
    /// Worksheet name inside the workbook.
    pub sheet_name: String,
    /// Positional column names.
    pub headers: Vec<String>,
    /// Data rows in original order.
    pub rows: Vec<Record>,
}

impl Sheet {
    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn key(&self) -> SheetKey {
        SheetKey::new(&self.file_name, &self.sheet_name)
    }
}

/// Projects `source_column` of each sheet row onto `target_column` of the extracted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub source_column: String,
    pub target_column: String,
    /// Reject rows whose source value is null, missing or empty.
    #[serde(default)]
    pub required: bool,
}

impl ColumnMapping {
    /// An optional mapping.
    pub fn new(source_column: impl Into<String>, target_column: impl Into<String>) -> Self {
        Self {
            source_column: source_column.into(),
            target_column: target_column.into(),
            required: false,
        }
    }

    /// A mapping that fails extraction on blank values.
    pub fn required(source_column: impl Into<String>, target_column: impl Into<String>) -> Self {
        Self {
            required: true,
            ..Self::new(source_column, target_column)
        }
    }
}

/// Built-in per-group aggregation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    /// Sum of numeric values.
    Sum,
    /// Mean of numeric values, `0` for an empty value set.
    Average,
    /// Number of non-null values.
    Count,
    /// Minimum numeric value, `0` for an empty value set.
    Min,
    /// Maximum numeric value, `0` for an empty value set.
    Max,
}

impl AggregateOp {
    /// Suffix appended to the column name in the output record.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Average => "avg",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

/// A single aggregation: `operation` applied to `column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub column: String,
    pub operation: AggregateOp,
}

impl Aggregation {
    pub fn new(column: impl Into<String>, operation: AggregateOp) -> Self {
        Self {
            column: column.into(),
            operation,
        }
    }

    /// Output field name, e.g. `amount_avg`.
    pub fn output_column(&self) -> String {
        format!("{}_{}", self.column, self.operation.suffix())
    }
}

/// Group-by columns plus the aggregations computed for each group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupingConfig {
    pub group_by: Vec<String>,
    pub aggregations: Vec<Aggregation>,
}

impl GroupingConfig {
    /// `true` when neither grouping columns nor aggregations are configured.
    pub fn is_empty(&self) -> bool {
        self.group_by.is_empty() && self.aggregations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{AggregateOp, Aggregation, ColumnMapping, GroupingConfig, Record, SheetKey, Value};

    #[test]
    fn record_insert_overwrites_in_place() {
        let mut r = Record::new();
        r.insert("a", Value::from("1"));
        r.insert("b", Value::from("2"));
        r.insert("a", Value::from("3"));

        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(r.get("a"), Some(&Value::from("3")));
        assert_eq!(r.value("missing"), &Value::Null);
    }

    #[test]
    fn to_number_is_lenient() {
        assert_eq!(Value::from(" 12.5 ").to_number(), 12.5);
        assert_eq!(Value::from("abc").to_number(), 0.0);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert_eq!(Value::from("NaN").to_number(), 0.0);
        assert_eq!(Value::from("INF").to_number(), 0.0);
        assert_eq!(Value::from("inf").to_number(), 0.0);
        assert_eq!(Value::from(" -infinity ").to_number(), 0.0);
        assert_eq!(Value::from("Infinity").to_number(), 0.0);
        assert_eq!(Value::from("1e3").to_number(), 1000.0);
        assert_eq!(Value::Int64(3).to_number(), 3.0);
        assert_eq!(Value::Null.to_number(), 0.0);
    }

    #[test]
    fn blank_covers_null_and_empty_string() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("").is_blank());
        assert!(!Value::from(" ").is_blank());
        assert!(!Value::Int64(0).is_blank());
    }

    #[test]
    fn aggregation_output_column_uses_avg_suffix() {
        assert_eq!(
            Aggregation::new("amount", AggregateOp::Average).output_column(),
            "amount_avg"
        );
        assert_eq!(
            Aggregation::new("amount", AggregateOp::Count).output_column(),
            "amount_count"
        );
    }

    #[test]
    fn sheet_key_displays_file_and_sheet() {
        assert_eq!(SheetKey::new("a.xlsx", "Sales").to_string(), "a.xlsx:Sales");
    }

    #[test]
    fn config_types_deserialize_from_camel_case_json() {
        let mapping: ColumnMapping =
            serde_json::from_str(r#"{"sourceColumn":"Region","targetColumn":"region"}"#).unwrap();
        assert_eq!(mapping, ColumnMapping::new("Region", "region"));

        let grouping: GroupingConfig = serde_json::from_str(
            r#"{"groupBy":["region"],"aggregations":[{"column":"amount","operation":"average"}]}"#,
        )
        .unwrap();
        assert_eq!(grouping.group_by, vec!["region".to_string()]);
        assert_eq!(grouping.aggregations[0].operation, AggregateOp::Average);
    }
}
