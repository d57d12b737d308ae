//! In-memory transformations over normalized sheets.
//!
//! All functions here are pure: they borrow their inputs and return fresh records.
//!
//! - [`select_sheets()`] / [`available_columns()`]: pick sheets and discover mappable columns
//! - [`extract()`]: project/rename columns, enforcing required mappings
//! - [`group()`]: group rows and compute per-group aggregates
//!
//! ## Example: extract → group
//!
//! ```rust
//! use sheet_pipeline::processing::{extract, group};
//! use sheet_pipeline::types::{
//!     AggregateOp, Aggregation, ColumnMapping, GroupingConfig, Record, Sheet, Value,
//! };
//!
//! let sheet = Sheet {
//!     file_name: "q1.xlsx".to_string(),
//!     sheet_name: "Sales".to_string(),
//!     headers: vec!["Region".to_string(), "Amount".to_string()],
//!     rows: vec![
//!         Record::from_iter([("Region", Value::from("E")), ("Amount", Value::from("10"))]),
//!         Record::from_iter([("Region", Value::from("E")), ("Amount", Value::from("5"))]),
//!         Record::from_iter([("Region", Value::from("W")), ("Amount", Value::from("abc"))]),
//!     ],
//! };
//!
//! let rows = extract(
//!     &[sheet],
//!     &[ColumnMapping::required("Region", "region"), ColumnMapping::new("Amount", "amount")],
//! )
//! .unwrap();
//!
//! let grouped = group(
//!     &rows,
//!     &GroupingConfig {
//!         group_by: vec!["region".to_string()],
//!         aggregations: vec![Aggregation::new("amount", AggregateOp::Sum)],
//!     },
//! );
//! assert_eq!(grouped[0].value("amount_sum"), &Value::Float64(15.0));
//! assert_eq!(grouped[1].value("amount_sum"), &Value::Float64(0.0));
//! ```

pub mod aggregate;
pub mod extract;
pub mod select;

pub use aggregate::{group, GroupKey};
pub use extract::extract;
pub use select::{available_columns, mappings_are_complete, select_sheets};
