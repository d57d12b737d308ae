//! `sheet-pipeline` turns a batch of heterogeneous spreadsheet files into a normalized tabular
//! dataset, remaps/renames columns, computes grouped aggregates, and exports the result back as
//! an `.xlsx` workbook.
//!
//! ## Pipeline
//!
//! ```text
//! bytes ─▶ ingestion ─▶ Sheet[] ─▶ extract(ColumnMapping[]) ─▶ Record[]
//!                          │
//!                          └──────▶ validate_format(expected) ─▶ ValidationReport
//!
//! Record[] ─▶ group(GroupingConfig) ─▶ Record[] ─▶ export ─▶ bytes
//! ```
//!
//! - [`ingestion`]: accepts `.xlsx`/`.xls`/`.xlsb` files (by extension or MIME type), decodes
//!   every worksheet, detects the header row via configurable [`ingestion::HeaderRules`], and
//!   coerces cells to string-or-null [`types::Value`]s. Sheets with fewer than two rows are
//!   dropped with a warning sent to the injected [`ingestion::IngestionObserver`].
//! - [`processing`]: sheet selection, column projection with required-field enforcement, and
//!   grouping with `sum`/`avg`/`count`/`min`/`max` aggregates.
//! - [`validation`]: checks each sheet's headers against an expected column set.
//! - [`export`]: writes uniformly-shaped records to a single-sheet workbook.
//! - [`pipeline`]: a JSON-configurable orchestrator over the above.
//! - [`error`]: the crate-wide error type.
//!
//! ## Quick example
//!
//! ```no_run
//! use sheet_pipeline::export::export_to_path;
//! use sheet_pipeline::ingestion::{ingest_from_path, IngestionOptions};
//! use sheet_pipeline::processing::{extract, group};
//! use sheet_pipeline::types::{AggregateOp, Aggregation, ColumnMapping, GroupingConfig};
//!
//! # fn main() -> Result<(), sheet_pipeline::PipelineError> {
//! let sheets = ingest_from_path("sales.xlsx", &IngestionOptions::default())?;
//!
//! let rows = extract(
//!     &sheets,
//!     &[
//!         ColumnMapping::required("Region", "region"),
//!         ColumnMapping::new("Amount", "amount"),
//!     ],
//! )?;
//!
//! let grouped = group(
//!     &rows,
//!     &GroupingConfig {
//!         group_by: vec!["region".to_string()],
//!         aggregations: vec![Aggregation::new("amount", AggregateOp::Sum)],
//!     },
//! );
//!
//! let path = export_to_path(&grouped, ".", "Grouped Data")?;
//! println!("wrote {}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ### Aggregation semantics
//!
//! Aggregates only see non-null values of their column. Values are read leniently: anything that
//! does not parse as a number counts as `0` for `Sum`/`Average`/`Min`/`Max`, while `Count` counts
//! every non-null value. `Average`/`Min`/`Max` of an empty value set are `0`.

pub mod error;
pub mod export;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod types;
pub mod validation;

pub use error::{PipelineError, PipelineResult};
