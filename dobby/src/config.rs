//! Run configuration.
//!
//! [`TransformConfig`] is fixed for the duration of a run. It can be built
//! in code, loaded from JSON (missing keys take their defaults), or assembled
//! by the CLI from flags and `DOBBY_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PipelineError;
use crate::tabular::TextEncoding;

/// Options for one transformation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// School RBD identifier
    #[serde(alias = "rbd")]
    pub school_id: i64,

    /// Academic year
    #[serde(alias = "year")]
    pub academic_year: i32,

    /// School location label
    #[serde(alias = "local")]
    pub location_label: String,

    pub input_encoding: TextEncoding,

    pub output_encoding: TextEncoding,

    #[serde(alias = "csv_separator")]
    pub field_separator: char,

    /// Validate RUT check digits
    #[serde(alias = "validate_rut")]
    pub validate_identifier: bool,

    /// Validate email formats
    pub validate_email: bool,

    /// Not consulted by any stage; kept so existing configuration files load.
    pub skip_invalid_rows: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            school_id: 574,
            academic_year: 2025,
            location_label: "Principal".to_string(),
            input_encoding: TextEncoding::Utf8Sig,
            output_encoding: TextEncoding::Utf8Sig,
            field_separator: ';',
            validate_identifier: true,
            validate_email: true,
            skip_invalid_rows: false,
        }
    }
}

impl TransformConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Reject settings the reader/writer cannot honor.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let sep = self.field_separator;
        if !sep.is_ascii() || sep == '"' || sep == '\n' || sep == '\r' {
            return Err(PipelineError::Config(format!(
                "unusable field separator {:?}",
                sep
            )));
        }
        if self.output_encoding == TextEncoding::Auto {
            return Err(PipelineError::Config(
                "output encoding cannot be 'auto'".to_string(),
            ));
        }
        Ok(())
    }
}
