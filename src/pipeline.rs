//! End-to-end orchestration: validate → extract → group → export.
//!
//! [`Pipeline`] bundles a declarative [`PipelineConfig`] (loadable from JSON) with an optional
//! [`PipelineObserver`] that receives a [`PipelineEvent`] after each stage.
//!
//! ```rust
//! use sheet_pipeline::pipeline::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::from_json_str(
//!     r#"{
//!         "mappings": [{ "sourceColumn": "Region", "targetColumn": "region", "required": true }],
//!         "grouping": { "groupBy": ["region"], "aggregations": [] }
//!     }"#,
//! )
//! .unwrap();
//! let output = Pipeline::new(config).run(&[]).unwrap();
//! assert!(output.extracted.is_empty());
//! assert_eq!(output.grouped, Some(Vec::new()));
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;
use crate::export::export_to_path;
use crate::ingestion::{HeaderRules, IngestionOptions};
use crate::processing::{extract, group};
use crate::types::{ColumnMapping, GroupingConfig, Record, Sheet};
use crate::validation::{validate_format, ValidationReport};

/// Declarative pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Header-row rules applied during ingestion.
    pub header_rules: HeaderRules,
    /// Column projection applied by extraction.
    pub mappings: Vec<ColumnMapping>,
    /// Grouping; skipped when empty.
    pub grouping: GroupingConfig,
    /// Columns every sheet must have for [`Pipeline::validate`].
    pub expected_columns: Vec<String>,
}

impl PipelineConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Ingestion options carrying this config's header rules.
    pub fn ingestion_options(&self) -> IngestionOptions {
        IngestionOptions {
            header_rules: self.header_rules.clone(),
            ..Default::default()
        }
    }
}

/// Events emitted by [`Pipeline`].
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    ValidationFinished { sheets: usize, failing_sheets: usize },
    ExtractionFinished { rows: usize, elapsed: Duration },
    ExtractionFailed { message: String },
    GroupingFinished { groups: usize, elapsed: Duration },
    ExportFinished { path: PathBuf },
}

/// Observer hook for pipeline events.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// A simple stderr logger for pipeline events.
#[derive(Debug, Default)]
pub struct StdErrPipelineObserver;

impl PipelineObserver for StdErrPipelineObserver {
    fn on_event(&self, event: &PipelineEvent) {
        eprintln!("[pipeline] {event:?}");
    }
}

/// Output of [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineOutput {
    /// One extracted row per source row.
    pub extracted: Vec<Record>,
    /// Group records, if grouping was configured.
    pub grouped: Option<Vec<Record>>,
}

impl PipelineOutput {
    /// The most refined result: grouped rows if present, otherwise extracted rows.
    pub fn result(&self) -> &[Record] {
        self.grouped.as_deref().unwrap_or(&self.extracted)
    }
}

/// Runs the configured transforms over selected sheets.
pub struct Pipeline {
    config: PipelineConfig,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    /// Attach an observer for pipeline events.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Check `sheets` against `expected_columns`. Does not affect [`Self::run`].
    pub fn validate(&self, sheets: &[Sheet]) -> ValidationReport {
        let report = validate_format(sheets, &self.config.expected_columns);
        self.emit(PipelineEvent::ValidationFinished {
            sheets: sheets.len(),
            failing_sheets: report.errors.len(),
        });
        report
    }

    /// Extract, then group when the grouping config has any group-by column or aggregation.
    ///
    /// A missing required column aborts before grouping runs.
    pub fn run(&self, sheets: &[Sheet]) -> PipelineResult<PipelineOutput> {
        let start = Instant::now();
        let extracted = match extract(sheets, &self.config.mappings) {
            Ok(rows) => rows,
            Err(e) => {
                self.emit(PipelineEvent::ExtractionFailed { message: e.to_string() });
                return Err(e);
            }
        };
        self.emit(PipelineEvent::ExtractionFinished {
            rows: extracted.len(),
            elapsed: start.elapsed(),
        });

        let grouped = if self.config.grouping.is_empty() {
            None
        } else {
            let start = Instant::now();
            let groups = group(&extracted, &self.config.grouping);
            self.emit(PipelineEvent::GroupingFinished {
                groups: groups.len(),
                elapsed: start.elapsed(),
            });
            Some(groups)
        };

        Ok(PipelineOutput { extracted, grouped })
    }

    /// Write `records` into `dir` as `"{title}_{timestamp}.xlsx"`.
    pub fn export(&self, records: &[Record], dir: impl AsRef<Path>, title: &str) -> PipelineResult<PathBuf> {
        let path = export_to_path(records, dir, title)?;
        self.emit(PipelineEvent::ExportFinished { path: path.clone() });
        Ok(path)
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}
