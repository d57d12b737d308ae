//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_workbook`], [`ingest_from_path`] or [`ingest_batch`] (from
//! [`unified`]) which:
//!
//! - accept files by extension or MIME type (`.xlsx`, `.xls`, `.xlsb`)
//! - decode the workbook ([`excel`]) and normalize each worksheet ([`normalize`])
//! - optionally report success/warnings/failures/alerts to an [`IngestionObserver`]

pub mod excel;
pub mod normalize;
pub mod observability;
pub mod unified;

pub use excel::{decode_workbook, Cell, RawSheet};
pub use normalize::{coerce_cell, normalize_sheet, HeaderRule, HeaderRules, Normalized};
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    IngestionWarning, StdErrObserver, TracingObserver,
};
pub use unified::{
    ingest_batch, ingest_dir, ingest_from_path, ingest_workbook, BatchOutcome, BatchPolicy, IngestionOptions,
    WorkbookFormat, WorkbookInput,
};
