//! Grouping and per-group aggregation of extracted rows.

use std::collections::HashMap;

use crate::types::{AggregateOp, GroupingConfig, Record, Value};

/// Structural group key: the tuple of group-by values under value equality.
///
/// Floats compare by bit pattern (with `-0.0` folded into `0.0`) so the key can be hashed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(Vec<KeyPart>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Null,
    Utf8(String),
    Int64(i64),
    Float64(u64),
}

impl GroupKey {
    /// Build the key of `row` for the given group-by columns.
    pub fn of(row: &Record, group_by: &[String]) -> Self {
        Self(group_by.iter().map(|col| KeyPart::from(row.value(col))).collect())
    }
}

impl From<&Value> for KeyPart {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Utf8(s) => Self::Utf8(s.clone()),
            Value::Int64(i) => Self::Int64(*i),
            Value::Float64(f) if *f == 0.0 => Self::Float64(0.0f64.to_bits()),
            Value::Float64(f) => Self::Float64(f.to_bits()),
        }
    }
}

struct Group<'a> {
    values: Vec<Value>,
    rows: Vec<&'a Record>,
}

/// Group `rows` by `config.group_by` and compute `config.aggregations` for each group.
///
/// - Groups are emitted in first-seen key order.
/// - Each output record holds the group-by values (as found in the first row of the group)
///   followed by one `{column}_{suffix}` field per aggregation.
/// - An empty `group_by` yields exactly one group containing every row (none if `rows` is
///   empty).
///
/// Aggregations only see non-null values of their column; see [`AggregateOp::apply`].
pub fn group(rows: &[Record], config: &GroupingConfig) -> Vec<Record> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Group<'_>> = Vec::new();

    for row in rows {
        let key = GroupKey::of(row, &config.group_by);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Group {
                values: config.group_by.iter().map(|c| row.value(c).clone()).collect(),
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].rows.push(row);
    }

    groups
        .into_iter()
        .map(|g| {
            let mut out = Record::with_capacity(config.group_by.len() + config.aggregations.len());
            for (col, value) in config.group_by.iter().zip(g.values) {
                out.insert(col.as_str(), value);
            }
            for agg in &config.aggregations {
                let values: Vec<&Value> = g
                    .rows
                    .iter()
                    .map(|r| r.value(&agg.column))
                    .filter(|v| !v.is_null())
                    .collect();
                out.insert(agg.output_column(), agg.operation.apply(&values));
            }
            out
        })
        .collect()
}

impl AggregateOp {
    /// Aggregate a group's non-null values.
    ///
    /// Values are read leniently (unparsable strings count as `0`). `Average`, `Min` and `Max`
    /// of an empty value set are `0`; `Count` counts values whether or not they are numeric.
    pub fn apply(self, values: &[&Value]) -> Value {
        match self {
            Self::Sum => Value::Float64(sum(values)),
            Self::Average => Value::Float64(average(values)),
            Self::Count => Value::Int64(count(values)),
            Self::Min => Value::Float64(min(values)),
            Self::Max => Value::Float64(max(values)),
        }
    }
}

fn sum(values: &[&Value]) -> f64 {
    values.iter().fold(0.0, |acc, v| acc + v.to_number())
}

fn average(values: &[&Value]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        sum(values) / values.len() as f64
    }
}

fn count(values: &[&Value]) -> i64 {
    values.len() as i64
}

fn min(values: &[&Value]) -> f64 {
    values
        .iter()
        .map(|v| v.to_number())
        .reduce(f64::min)
        .unwrap_or(0.0)
}

fn max(values: &[&Value]) -> f64 {
    values
        .iter()
        .map(|v| v.to_number())
        .reduce(f64::max)
        .unwrap_or(0.0)
}
