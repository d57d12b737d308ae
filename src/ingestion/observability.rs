use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::PipelineError;

use super::unified::WorkbookFormat;

/// Severity of a failed ingestion, compared against the alert threshold.
///
/// Non-fatal findings are reported through [`IngestionObserver::on_warning`] and carry no
/// severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// The file could not be ingested.
    Error,
    /// Critical error (typically I/O failures).
    Critical,
}

impl IngestionSeverity {
    /// Severity assigned to a failed ingestion.
    pub fn for_error(e: &PipelineError) -> Self {
        match e {
            PipelineError::Io(_) => Self::Critical,
            _ => Self::Error,
        }
    }
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Name of the file being ingested.
    pub file_name: String,
    /// Detected workbook format, if the file was accepted.
    pub format: Option<WorkbookFormat>,
}

/// Stats reported on successful ingestion of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Sheets kept.
    pub sheets: usize,
    /// Data rows across kept sheets.
    pub rows: usize,
    /// Sheets dropped with a warning.
    pub skipped_sheets: usize,
}

/// Non-fatal ingestion findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionWarning {
    /// The worksheet had fewer than two raw rows and was dropped.
    InsufficientData { sheet_name: String, rows: usize },
}

impl fmt::Display for IngestionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData { sheet_name, rows } => {
                write!(f, "sheet '{sheet_name}' has insufficient data ({rows} rows)")
            }
        }
    }
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when a file is ingested.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called for each non-fatal finding (e.g. a skipped sheet).
    fn on_warning(&self, _ctx: &IngestionContext, _warning: &IngestionWarning) {}

    /// Called when ingestion fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &PipelineError) {}

    /// Called when an ingestion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &PipelineError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_warning(&self, ctx: &IngestionContext, warning: &IngestionWarning) {
        for o in &self.observers {
            o.on_warning(ctx, warning);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &PipelineError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &PipelineError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs ingestion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!(
            "[ingest][ok] file={} format={:?} sheets={} rows={} skipped={}",
            ctx.file_name, ctx.format, stats.sheets, stats.rows, stats.skipped_sheets
        );
    }

    fn on_warning(&self, ctx: &IngestionContext, warning: &IngestionWarning) {
        eprintln!("[ingest][warn] file={} {}", ctx.file_name, warning);
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &PipelineError) {
        eprintln!(
            "[ingest][{:?}] file={} format={:?} err={}",
            severity, ctx.file_name, ctx.format, error
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &PipelineError) {
        eprintln!(
            "[ALERT][ingest][{:?}] file={} format={:?} err={}",
            severity, ctx.file_name, ctx.format, error
        );
    }
}

/// Forwards ingestion events to `tracing`.
///
/// Install a subscriber (e.g. `tracing_subscriber::fmt`) in the binary to see them.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            file = %ctx.file_name,
            format = ?ctx.format,
            sheets = stats.sheets,
            rows = stats.rows,
            skipped = stats.skipped_sheets,
            "workbook ingested"
        );
    }

    fn on_warning(&self, ctx: &IngestionContext, warning: &IngestionWarning) {
        tracing::warn!(file = %ctx.file_name, "{warning}");
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &PipelineError) {
        tracing::error!(file = %ctx.file_name, severity = ?severity, "ingestion failed: {error}");
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &PipelineError) {
        tracing::error!(file = %ctx.file_name, severity = ?severity, alert = true, "ingestion failed: {error}");
    }
}

/// Appends ingestion events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append_line(&format!(
            "{} ok file={} sheets={} rows={} skipped={}",
            unix_ts(),
            ctx.file_name,
            stats.sheets,
            stats.rows,
            stats.skipped_sheets
        ));
    }

    fn on_warning(&self, ctx: &IngestionContext, warning: &IngestionWarning) {
        self.append_line(&format!("{} warn file={} {}", unix_ts(), ctx.file_name, warning));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &PipelineError) {
        self.append_line(&format!(
            "{} fail severity={:?} file={} err={}",
            unix_ts(),
            severity,
            ctx.file_name,
            error
        ));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &PipelineError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} file={} err={}",
            unix_ts(),
            severity,
            ctx.file_name,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
