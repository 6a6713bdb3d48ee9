//! Lookup tables driving the pipeline.
//!
//! The locality list, commune names, grade levels, column renames and the
//! output column order are plain data. [`Lookups::default`] holds the tables
//! for the Coquimbo region; a JSON file with the same shape can replace them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use super::columns;
use crate::error::PipelineError;

/// Immutable bundle of lookup tables owned by a
/// [`Transformer`](super::Transformer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookups {
    /// Version of the table format
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Locality names stripped from addresses (whole word, case-insensitive)
    pub localities: Vec<String>,

    /// Commune code → commune name
    pub communes: BTreeMap<String, String>,

    /// Grade value → grade level label
    pub grade_levels: BTreeMap<String, String>,

    /// Pipeline column name → upload column name
    pub renames: BTreeMap<String, String>,

    /// Upload columns, in output order
    pub output_columns: Vec<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Output columns of the SN upload format.
pub const OUTPUT_COLUMNS: [&str; 29] = [
    "rbd",
    "year",
    "nivel",
    "curso",
    "local",
    "fechaMatricula",
    "estudiantePaterno",
    "estudianteMaterno",
    "estudianteNombre1",
    "estudianteNombre2",
    "estudianteEmail",
    "sexo",
    "estudianteRun",
    "fechaNacimiento",
    "direccion",
    "tutor1Nombre1",
    "tutor1Nombre2",
    "tutor1Paterno",
    "tutor1Materno",
    "tutor1Run",
    "tutor1Email",
    "tutor1Celular",
    "tutor2Nombre1",
    "tutor2Nombre2",
    "tutor2Paterno",
    "tutor2Materno",
    "tutor2Run",
    "tutor2Email",
    "tutor2Celular",
];

const LOCALITIES: [&str; 7] = [
    "la serena",
    "laserena",
    "serena",
    "laserna",
    "la  serena",
    "coquimbo",
    "vicuña",
];

const COMMUNES: [(&str, &str); 15] = [
    ("4101", "LA SERENA"),
    ("4102", "COQUIMBO"),
    ("4103", "ANDACOLLO"),
    ("4104", "LA HIGUERA"),
    ("4105", "PAIGUANO"),
    ("4106", "VICUÑA"),
    ("4201", "ILLAPEL"),
    ("4202", "CANELA"),
    ("4203", "LOS VILOS"),
    ("4204", "SALAMANCA"),
    ("4301", "OVALLE"),
    ("4302", "COMBARBALÁ"),
    ("4303", "MONTE PATRIA"),
    ("4304", "PUNITAQUI"),
    ("4305", "RÍO HURTADO"),
];

const GRADE_LEVELS: [(&str, &str); 14] = [
    ("PK", "Prekínder"),
    ("K", "Kínder"),
    ("1", "1° Básico"),
    ("2", "2° Básico"),
    ("3", "3° Básico"),
    ("4", "4° Básico"),
    ("5", "5° Básico"),
    ("6", "6° Básico"),
    ("7", "7° Básico"),
    ("8", "8° Básico"),
    ("9", "1° Medio"),
    ("10", "2° Medio"),
    ("11", "3° Medio"),
    ("12", "4° Medio"),
];

const RENAMES: [(&str, &str); 26] = [
    (columns::LEVEL, "nivel"),
    (columns::COURSE, "curso"),
    (columns::ENROLLMENT_DATE, "fechaMatricula"),
    (columns::PATERNAL_SURNAME, "estudiantePaterno"),
    (columns::MATERNAL_SURNAME, "estudianteMaterno"),
    (columns::STUDENT_FIRST_NAME, "estudianteNombre1"),
    (columns::STUDENT_SECOND_NAME, "estudianteNombre2"),
    (columns::STUDENT_EMAIL, "estudianteEmail"),
    (columns::SEX, "sexo"),
    (columns::RUT, "estudianteRun"),
    (columns::BIRTH_DATE, "fechaNacimiento"),
    (columns::FULL_ADDRESS, "direccion"),
    (columns::GUARDIAN_FIRST_NAME, "tutor1Nombre1"),
    (columns::GUARDIAN_SECOND_NAME, "tutor1Nombre2"),
    (columns::GUARDIAN_PATERNAL, "tutor1Paterno"),
    (columns::GUARDIAN_MATERNAL, "tutor1Materno"),
    (columns::GUARDIAN_RUT, "tutor1Run"),
    (columns::GUARDIAN_EMAIL, "tutor1Email"),
    (columns::GUARDIAN_PHONE, "tutor1Celular"),
    (columns::GUARDIAN2_FIRST_NAME, "tutor2Nombre1"),
    (columns::GUARDIAN2_SECOND_NAME, "tutor2Nombre2"),
    (columns::GUARDIAN2_PATERNAL, "tutor2Paterno"),
    (columns::GUARDIAN2_MATERNAL, "tutor2Materno"),
    (columns::GUARDIAN2_RUT, "tutor2Run"),
    (columns::GUARDIAN2_EMAIL, "tutor2Email"),
    (columns::GUARDIAN2_PHONE, "tutor2Celular"),
];

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for Lookups {
    fn default() -> Self {
        Self {
            version: default_version(),
            description: "Coquimbo region enrollment export → SN upload".to_string(),
            localities: LOCALITIES.iter().map(|s| s.to_string()).collect(),
            communes: to_map(&COMMUNES),
            grade_levels: to_map(&GRADE_LEVELS),
            renames: to_map(&RENAMES),
            output_columns: OUTPUT_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Lookups {
    /// Parse tables from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize tables to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load tables from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read lookups '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content).map_err(|e| {
            PipelineError::Config(format!("invalid lookups '{}': {}", path.display(), e))
        })
    }

    /// Check the tables are usable: a non-empty output schema without
    /// duplicate columns, and no blank locality names.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.output_columns.is_empty() {
            return Err(PipelineError::Config("output column list is empty".into()));
        }
        let mut seen = HashSet::new();
        for column in &self.output_columns {
            if !seen.insert(column.as_str()) {
                return Err(PipelineError::Config(format!(
                    "duplicate output column '{}'",
                    column
                )));
            }
        }
        if self.localities.iter().any(|l| l.trim().is_empty()) {
            return Err(PipelineError::Config("blank locality name".into()));
        }
        Ok(())
    }

    /// Commune name for a code, if known.
    pub fn commune_name(&self, code: &str) -> Option<&str> {
        self.communes.get(code).map(String::as_str)
    }

    /// Grade level label for a grade value, if known.
    pub fn grade_level(&self, grade: &str) -> Option<&str> {
        self.grade_levels.get(grade).map(String::as_str)
    }
}
