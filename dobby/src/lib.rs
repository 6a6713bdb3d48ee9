//! # Dobby - student enrollment export to SN upload format
//!
//! Dobby turns the semicolon-delimited enrollment export of a school into the
//! fixed 29-column file accepted by the SN enrollment platform.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Export CSV  │────▶│   Reader    │────▶│  Pipeline   │────▶│ Upload CSV  │
//! │ (74 cols)   │     │ (encoding)  │     │ (14 stages) │     │ (29 cols)   │
//! └─────────────┘     └─────────────┘     └──────┬──────┘     └─────────────┘
//!                                                │
//!                                         ┌──────▼──────┐
//!                                         │ Error ledger│
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dobby::{TransformConfig, Transformer};
//! use std::path::Path;
//!
//! let transformer = Transformer::new(TransformConfig::default())?;
//! let output = transformer.transform_file(Path::new("alumnos.csv"))?;
//! transformer.save(&output.table, Path::new("upload.csv"))?;
//! for issue in &output.issues {
//!     eprintln!("{}", issue);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Layered error types
//! - [`config`] - Run configuration
//! - [`tabular`] - In-memory table, reader, writer and encodings
//! - [`validation`] - RUT and email checks
//! - [`transform`] - Normalizers, lookup tables, stages and the pipeline driver
//! - [`models`] - Strict upload record
//! - [`report`] - Summaries and issue reports
//! - [`logs`] - Run log

// Core modules
pub mod config;
pub mod error;
pub mod logs;

// Tables
pub mod tabular;

// Validation
pub mod validation;

// Transformation
pub mod transform;

// Output
pub mod models;
pub mod report;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ErrorKind, LogError, LogResult, PipelineError, PipelineResult, RecordError, TableError,
    TableResult, TransformError, TransformResult,
};

// =============================================================================
// Re-exports - Configuration & tables
// =============================================================================

pub use config::TransformConfig;
pub use tabular::{read_table, write_table, Cell, Table, TextEncoding};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{validate_email, validate_rut};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    stages_description, ErrorLedger, Lookups, Stage, TransformOutput, Transformer,
    ValidationIssue, OUTPUT_COLUMNS,
};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use models::{check_table, Sex, StudentRecord};
pub use report::{render_issues, write_issue_report, RunSummary};
