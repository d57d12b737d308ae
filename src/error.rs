use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by ingestion, extraction and export.
///
/// Insufficient-data sheets are not errors: they are dropped and reported as an
/// [`crate::ingestion::IngestionWarning`] through the configured observer.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook bytes could not be decoded. Fatal for this file only.
    #[error("failed to decode workbook '{file_name}': {source}")]
    Decode {
        file_name: String,
        #[source]
        source: calamine::Error,
    },

    /// The file is not an accepted workbook type (`.xlsx`, `.xls`, `.xlsb`).
    #[error("unsupported file '{file_name}': expected .xlsx, .xls or .xlsb")]
    UnsupportedFormat { file_name: String },

    /// A batch contained no accepted workbook at all.
    #[error("no valid Excel files found; upload .xlsx, .xls or .xlsb files")]
    NoWorkbooks,

    /// A required mapping found a null, missing or empty value. Aborts the whole extraction.
    #[error(
        "required column '{column}' is missing or empty in {file_name} (sheet '{sheet_name}', row {row})"
    )]
    MissingRequiredColumn {
        file_name: String,
        sheet_name: String,
        column: String,
        row: usize,
    },

    /// Export was asked to write an empty record set.
    #[error("nothing to export: the dataset is empty")]
    EmptyDataset,

    /// The workbook writer failed to produce bytes.
    #[error("export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    /// A pipeline configuration document could not be parsed.
    #[error("invalid pipeline config: {0}")]
    Config(#[from] serde_json::Error),
}
