//! Error types for the dobby transformation pipeline.
//!
//! Structural failures are layered so `?` works across boundaries:
//!
//! - [`TableError`] - reading, decoding, encoding and writing delimited tables
//! - [`TransformError`] - a pipeline stage could not run (missing columns, bad dates)
//! - [`RecordError`] - a row does not fit the strict output record
//! - [`PipelineError`] - top-level run failures returned to callers
//! - [`LogError`] - the run log could not be set up
//!
//! Record-level problems found while transforming (bad RUT, bad phone, bad
//! email) are *not* errors. They are collected in the
//! [`ErrorLedger`](crate::transform::ErrorLedger) and the run keeps going.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Table I/O Errors
// =============================================================================

/// Errors while reading or writing a delimited table.
#[derive(Debug, Error)]
pub enum TableError {
    /// Input file could not be read.
    #[error("Failed to read file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be written.
    #[error("Failed to write file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes are not valid in the configured encoding.
    #[error("Input is not valid {encoding} text")]
    Decode { encoding: String },

    /// Text contains characters the output encoding cannot represent.
    #[error("Output contains characters not representable in {encoding}")]
    Encode { encoding: String },

    /// Malformed delimited data.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// Input has no header row.
    #[error("CSV file is empty")]
    EmptyFile,
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Structural failures inside the pipeline. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum TransformError {
    /// One or more required input columns are absent.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A stage needed a column that an earlier stage should have produced.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A non-empty date cell could not be parsed day-first.
    #[error("Row {row}: cannot parse '{value}' in column '{column}' as a date")]
    InvalidDate {
        row: usize,
        column: String,
        value: String,
    },

    /// Loading the input table failed.
    #[error(transparent)]
    Table(#[from] TableError),
}

// =============================================================================
// Record Errors
// =============================================================================

/// A field of an output row that does not satisfy the strict record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Required field is missing or empty.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Field is present but its value is not acceptable.
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl RecordError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            RecordError::MissingField(field) => field,
            RecordError::InvalidValue { field, .. } => field,
        }
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level failure of a run.
///
/// Everything that goes wrong between loading the input and producing the
/// final table is wrapped once in [`PipelineError::Transformation`]; the
/// original cause stays reachable through [`std::error::Error::source`] and
/// [`PipelineError::kind`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The transformation did not complete.
    #[error("Transformation failed: {0}")]
    Transformation(#[from] TransformError),

    /// The transformed table could not be written.
    #[error("Failed to write output: {0}")]
    Output(#[source] TableError),

    /// Configuration or lookup tables are unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of a [`PipelineError`] for callers and exit reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ColumnMissing,
    FileRead,
    FileWrite,
    Transformation,
    Config,
}

impl PipelineError {
    /// Classify the failure by its root cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Transformation(TransformError::MissingColumns(_)) => {
                ErrorKind::ColumnMissing
            }
            PipelineError::Transformation(TransformError::Table(_)) => ErrorKind::FileRead,
            PipelineError::Transformation(_) => ErrorKind::Transformation,
            PipelineError::Output(_) => ErrorKind::FileWrite,
            PipelineError::Config(_) => ErrorKind::Config,
        }
    }
}

// =============================================================================
// Logging Errors
// =============================================================================

/// Failure to install the run log.
#[derive(Debug, Error)]
pub enum LogError {
    /// The log file or its directory could not be opened.
    #[error("Failed to open log file '{path}': {source}")]
    File {
        path: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },

    /// A global subscriber was already installed.
    #[error("Logger already initialized: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for table I/O.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for pipeline stages.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for whole runs.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for logger setup.
pub type LogResult<T> = Result<T, LogError>;
