//! Unified ingestion entrypoints.
//!
//! - [`ingest_workbook`] ingests one in-memory [`WorkbookInput`] into normalized [`Sheet`]s.
//! - [`ingest_from_path`] reads a file first.
//! - [`ingest_batch`] ingests many inputs in parallel and applies a [`BatchPolicy`].
//! - [`ingest_dir`] collects every accepted workbook under a directory and ingests them as a batch.
//!
//! Files are accepted by extension or MIME type (see [`WorkbookFormat`]) before any bytes are
//! decoded. If an [`IngestionObserver`] is configured, success/warnings/failures/alerts are
//! reported to it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{PipelineError, PipelineResult};
use crate::types::Sheet;

use super::excel::decode_workbook;
use super::normalize::{normalize_sheet, HeaderRules, Normalized};
use super::observability::{
    IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, TracingObserver,
};

/// Accepted workbook container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    /// Office Open XML workbook.
    Xlsx,
    /// Legacy BIFF workbook.
    Xls,
    /// Binary workbook.
    Xlsb,
}

impl WorkbookFormat {
    /// Parse a format from a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "xlsb" => Some(Self::Xlsb),
            _ => None,
        }
    }

    /// Parse a format from the extension of `file_name`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Path::new(file_name)
            .extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse a format from a MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some(Self::Xlsx),
            "application/vnd.ms-excel" => Some(Self::Xls),
            "application/vnd.ms-excel.sheet.binary.macroenabled.12" => Some(Self::Xlsb),
            _ => None,
        }
    }

    /// Accept a file if either its MIME type or its name identifies a workbook.
    pub fn detect(file_name: &str, mime: Option<&str>) -> Option<Self> {
        mime.and_then(Self::from_mime)
            .or_else(|| Self::from_file_name(file_name))
    }
}

/// What a batch does when one file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// The first failure (in input order) fails the whole batch.
    #[default]
    AbortOnError,
    /// Failed files are reported in [`BatchOutcome::failures`]; the rest still contribute.
    SkipFailed,
}

/// Options controlling ingestion behavior.
///
/// Use [`Default`] for common cases. The default observer is [`TracingObserver`], so skipped
/// sheets and failures are logged unless `observer` is set to `None`.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Header-row placement rules.
    pub header_rules: HeaderRules,
    /// Observer for logging/alerts; `None` disables reporting.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
    /// Continuation policy for [`ingest_batch`].
    pub batch_policy: BatchPolicy,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("header_rules", &self.header_rules)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("batch_policy", &self.batch_policy)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            header_rules: HeaderRules::default(),
            observer: Some(Arc::new(TracingObserver)),
            alert_at_or_above: IngestionSeverity::Critical,
            batch_policy: BatchPolicy::default(),
        }
    }
}

/// A workbook payload plus the metadata used to accept it.
#[derive(Clone)]
pub struct WorkbookInput {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for WorkbookInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkbookInput")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl WorkbookInput {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: None,
            bytes,
        }
    }

    /// Attach the MIME type reported by the upload boundary.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Read a file; the file name (not the full path) becomes `file_name`.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        Ok(Self::new(display_name(path), bytes))
    }

    /// The accepted format, or `None` if this input must be rejected.
    pub fn format(&self) -> Option<WorkbookFormat> {
        WorkbookFormat::detect(&self.file_name, self.mime.as_deref())
    }
}

/// Ingest one workbook into normalized sheets.
///
/// Sheets with fewer than two raw rows are dropped and reported via `on_warning`. When an
/// observer is configured, this function also reports:
///
/// - `on_success` on success, with sheet/row counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use sheet_pipeline::ingestion::{ingest_workbook, IngestionOptions, StdErrObserver, WorkbookInput};
///
/// # fn main() -> Result<(), sheet_pipeline::PipelineError> {
/// let bytes = std::fs::read("report.xlsx")?;
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     ..Default::default()
/// };
/// let sheets = ingest_workbook(&WorkbookInput::new("report.xlsx", bytes), &opts)?;
/// for sheet in &sheets {
///     println!("{}: {} rows", sheet.sheet_name, sheet.row_count());
/// }
/// # Ok(())
/// # }
/// ```
pub fn ingest_workbook(input: &WorkbookInput, options: &IngestionOptions) -> PipelineResult<Vec<Sheet>> {
    let ctx = IngestionContext {
        file_name: input.file_name.clone(),
        format: input.format(),
    };

    let result = match ctx.format {
        Some(_) => ingest_accepted(&ctx, &input.bytes, options),
        None => Err(PipelineError::UnsupportedFormat {
            file_name: input.file_name.clone(),
        }),
    };

    report_result(&ctx, options, &result);
    result
}

/// Read `path` and ingest it with [`ingest_workbook`].
///
/// A file that cannot be read is reported as a `Critical` failure.
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> PipelineResult<Vec<Sheet>> {
    let path = path.as_ref();
    match WorkbookInput::from_path(path) {
        Ok(input) => ingest_workbook(&input, options),
        Err(e) => {
            let file_name = display_name(path);
            let ctx = IngestionContext {
                format: WorkbookFormat::from_file_name(&file_name),
                file_name,
            };
            let result = Err(PipelineError::Io(e));
            report_result(&ctx, options, &result);
            result
        }
    }
}

fn ingest_accepted(ctx: &IngestionContext, bytes: &[u8], options: &IngestionOptions) -> PipelineResult<Vec<Sheet>> {
    let raw_sheets = decode_workbook(bytes).map_err(|source| PipelineError::Decode {
        file_name: ctx.file_name.clone(),
        source,
    })?;

    let mut sheets = Vec::with_capacity(raw_sheets.len());
    for raw in &raw_sheets {
        match normalize_sheet(&ctx.file_name, raw, &options.header_rules) {
            Normalized::Sheet(sheet) => sheets.push(sheet),
            Normalized::Skipped(warning) => {
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_warning(ctx, &warning);
                }
            }
        }
    }

    if let Some(obs) = options.observer.as_ref() {
        obs.on_success(
            ctx,
            IngestionStats {
                sheets: sheets.len(),
                rows: sheets.iter().map(Sheet::row_count).sum(),
                skipped_sheets: raw_sheets.len() - sheets.len(),
            },
        );
    }
    Ok(sheets)
}

fn report_result(ctx: &IngestionContext, options: &IngestionOptions, result: &PipelineResult<Vec<Sheet>>) {
    let (Some(obs), Err(e)) = (options.observer.as_ref(), result) else {
        return;
    };
    let sev = IngestionSeverity::for_error(e);
    obs.on_failure(ctx, sev, e);
    if sev >= options.alert_at_or_above {
        obs.on_alert(ctx, sev, e);
    }
}

/// Result of [`ingest_batch`].
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Sheets of every successfully ingested file, in input order.
    pub sheets: Vec<Sheet>,
    /// Files that failed (only populated under [`BatchPolicy::SkipFailed`]).
    pub failures: Vec<(String, PipelineError)>,
    /// Files rejected because they are not accepted workbook types.
    pub rejected: Vec<String>,
}

/// Ingest a batch of workbooks.
///
/// Inputs that are not accepted workbook types are filtered out up front (listed in
/// [`BatchOutcome::rejected`]); if none remain the batch fails with
/// [`PipelineError::NoWorkbooks`]. Accepted files are decoded in parallel; results are then
/// combined in input order according to `options.batch_policy`.
pub fn ingest_batch(inputs: &[WorkbookInput], options: &IngestionOptions) -> PipelineResult<BatchOutcome> {
    let (accepted, rejected): (Vec<&WorkbookInput>, Vec<&WorkbookInput>) =
        inputs.iter().partition(|i| i.format().is_some());
    if accepted.is_empty() {
        return Err(PipelineError::NoWorkbooks);
    }

    let results: Vec<PipelineResult<Vec<Sheet>>> = accepted
        .par_iter()
        .map(|input| ingest_workbook(input, options))
        .collect();

    let mut outcome = BatchOutcome {
        rejected: rejected.iter().map(|i| i.file_name.clone()).collect(),
        ..Default::default()
    };
    for (input, result) in accepted.iter().zip(results) {
        match (result, options.batch_policy) {
            (Ok(mut sheets), _) => outcome.sheets.append(&mut sheets),
            (Err(e), BatchPolicy::AbortOnError) => return Err(e),
            (Err(e), BatchPolicy::SkipFailed) => outcome.failures.push((input.file_name.clone(), e)),
        }
    }
    Ok(outcome)
}

/// Ingest every accepted workbook found under `dir` (recursively, sorted by path).
pub fn ingest_dir(dir: impl AsRef<Path>, options: &IngestionOptions) -> PipelineResult<BatchOutcome> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && WorkbookFormat::from_file_name(&display_name(entry.path())).is_some() {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    let inputs = paths
        .iter()
        .map(WorkbookInput::from_path)
        .collect::<std::io::Result<Vec<_>>>()?;
    ingest_batch(&inputs, options)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
