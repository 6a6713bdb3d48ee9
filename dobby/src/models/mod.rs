//! Strict model of one upload row.
//!
//! The pipeline itself never needs this: it works on untyped tables and only
//! collects record-level issues. [`StudentRecord`] is an optional second
//! pass (`dobby transform --strict`) that checks every output row against
//! the typed 29-field record.
//!
//! - [`StudentRecord`] - one student with up to two guardians
//! - [`Sex`] - `M` or `F`
//! - [`check_table`] - run the strict check over a whole table

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RecordError;
use crate::tabular::{Cell, Table};
use crate::transform::normalize::parse_day_first;
use crate::transform::ErrorLedger;

/// Accepted academic years.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 2000..=2100;

/// Guardian phones other than `0`.
pub const MOBILE_RANGE: std::ops::RangeInclusive<i64> = 900_000_000..=999_999_999;

// =============================================================================
// Sex
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    M,
    F,
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" => Ok(Sex::M),
            "F" => Ok(Sex::F),
            other => Err(format!("must be 'M' or 'F', got '{}'", other)),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::M => f.write_str("M"),
            Sex::F => f.write_str("F"),
        }
    }
}

// =============================================================================
// Student Record
// =============================================================================

/// One row of the upload file.
///
/// Second names and guardian-2 fields are optional. Phones are `0` when
/// absent and otherwise a 9-digit mobile number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub rbd: i64,
    pub year: i32,
    pub nivel: String,
    pub curso: String,
    pub local: String,
    pub fecha_matricula: NaiveDate,

    // Student
    pub estudiante_paterno: String,
    pub estudiante_materno: String,
    pub estudiante_nombre1: String,
    pub estudiante_nombre2: Option<String>,
    pub estudiante_email: String,
    pub sexo: Sex,
    pub estudiante_run: String,
    pub fecha_nacimiento: NaiveDate,
    pub direccion: String,

    // Guardian 1
    pub tutor1_nombre1: String,
    pub tutor1_nombre2: Option<String>,
    pub tutor1_paterno: String,
    pub tutor1_materno: String,
    pub tutor1_run: String,
    pub tutor1_email: String,
    #[serde(default)]
    pub tutor1_celular: i64,

    // Guardian 2
    pub tutor2_nombre1: Option<String>,
    pub tutor2_nombre2: Option<String>,
    pub tutor2_paterno: Option<String>,
    pub tutor2_materno: Option<String>,
    pub tutor2_run: Option<String>,
    pub tutor2_email: Option<String>,
    #[serde(default)]
    pub tutor2_celular: i64,
}

impl StudentRecord {
    /// Build a record from one table row, collecting every field error.
    pub fn from_row(columns: &[String], row: &[Cell]) -> Result<Self, Vec<RecordError>> {
        let mut fields = RowFields {
            columns,
            row,
            errors: Vec::new(),
        };

        let rbd = fields.required_int("rbd").unwrap_or_default();
        let year = fields.year("year");
        let sexo = fields.sex("sexo");

        let record = StudentRecord {
            rbd,
            year,
            nivel: fields.required_text("nivel"),
            curso: fields.required_text("curso"),
            local: fields.required_text("local"),
            fecha_matricula: fields.required_date("fechaMatricula"),
            estudiante_paterno: fields.required_text("estudiantePaterno"),
            estudiante_materno: fields.required_text("estudianteMaterno"),
            estudiante_nombre1: fields.required_text("estudianteNombre1"),
            estudiante_nombre2: fields.text("estudianteNombre2"),
            estudiante_email: fields.required_text("estudianteEmail"),
            sexo: sexo.unwrap_or(Sex::M),
            estudiante_run: fields.required_text("estudianteRun"),
            fecha_nacimiento: fields.required_date("fechaNacimiento"),
            direccion: fields.required_text("direccion"),
            tutor1_nombre1: fields.required_text("tutor1Nombre1"),
            tutor1_nombre2: fields.text("tutor1Nombre2"),
            tutor1_paterno: fields.required_text("tutor1Paterno"),
            tutor1_materno: fields.required_text("tutor1Materno"),
            tutor1_run: fields.required_text("tutor1Run"),
            tutor1_email: fields.required_text("tutor1Email"),
            tutor1_celular: fields.phone("tutor1Celular"),
            tutor2_nombre1: fields.text("tutor2Nombre1"),
            tutor2_nombre2: fields.text("tutor2Nombre2"),
            tutor2_paterno: fields.text("tutor2Paterno"),
            tutor2_materno: fields.text("tutor2Materno"),
            tutor2_run: fields.text("tutor2Run"),
            tutor2_email: fields.text("tutor2Email"),
            tutor2_celular: fields.phone("tutor2Celular"),
        };

        if fields.errors.is_empty() {
            Ok(record)
        } else {
            Err(fields.errors)
        }
    }
}

/// Typed access to the cells of one row, accumulating errors.
struct RowFields<'a> {
    columns: &'a [String],
    row: &'a [Cell],
    errors: Vec<RecordError>,
}

impl<'a> RowFields<'a> {
    fn cell(&self, name: &str) -> &'a Cell {
        const MISSING: &Cell = &Cell::Missing;
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|idx| self.row.get(idx))
            .unwrap_or(MISSING)
    }

    fn invalid(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(RecordError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn text(&self, name: &str) -> Option<String> {
        self.cell(name)
            .text_value()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn required_text(&mut self, name: &str) -> String {
        match self.text(name) {
            Some(value) => value,
            None => {
                self.errors.push(RecordError::MissingField(name.to_string()));
                String::new()
            }
        }
    }

    fn required_int(&mut self, name: &str) -> Option<i64> {
        let cell = self.cell(name);
        match cell {
            Cell::Int(n) => Some(*n),
            Cell::Missing => {
                self.errors.push(RecordError::MissingField(name.to_string()));
                None
            }
            other => match other.lookup_key().and_then(|key| key.parse().ok()) {
                Some(n) => Some(n),
                None => {
                    self.invalid(name, format!("'{}' is not an integer", other));
                    None
                }
            },
        }
    }

    fn year(&mut self, name: &str) -> i32 {
        let Some(value) = self.required_int(name) else {
            return 0;
        };
        match i32::try_from(value) {
            Ok(year) if YEAR_RANGE.contains(&year) => year,
            _ => {
                self.invalid(
                    name,
                    format!(
                        "{} is outside {}-{}",
                        value,
                        YEAR_RANGE.start(),
                        YEAR_RANGE.end()
                    ),
                );
                0
            }
        }
    }

    fn sex(&mut self, name: &str) -> Option<Sex> {
        let Some(value) = self.text(name) else {
            self.errors.push(RecordError::MissingField(name.to_string()));
            return None;
        };
        match value.parse::<Sex>() {
            Ok(sex) => Some(sex),
            Err(message) => {
                self.invalid(name, message);
                None
            }
        }
    }

    fn required_date(&mut self, name: &str) -> NaiveDate {
        let parsed = match self.cell(name) {
            Cell::Missing => {
                self.errors.push(RecordError::MissingField(name.to_string()));
                return NaiveDate::default();
            }
            Cell::Date(date) => Some(*date),
            other => {
                let raw = other.to_string();
                let parsed = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .ok()
                    .or_else(|| parse_day_first(&raw));
                if parsed.is_none() {
                    self.invalid(name, format!("'{}' is not a date", raw));
                }
                parsed
            }
        };
        parsed.unwrap_or_default()
    }

    /// `0` means absent; anything else must be a mobile number.
    fn phone(&mut self, name: &str) -> i64 {
        let cell = self.cell(name);
        let number = match cell {
            Cell::Missing => return 0,
            Cell::Int(n) => *n,
            other => match other.lookup_key().and_then(|key| key.parse::<i64>().ok()) {
                Some(n) => n,
                None => {
                    self.invalid(name, format!("'{}' is not a phone number", other));
                    return 0;
                }
            },
        };
        if number != 0 && !MOBILE_RANGE.contains(&number) {
            self.invalid(name, "must be 0 or a 9-digit number starting with 9");
        }
        number
    }
}

/// Check every row of an upload table against [`StudentRecord`].
///
/// Each field error becomes one issue; rows are never dropped.
pub fn check_table(table: &Table) -> ErrorLedger {
    let mut ledger = ErrorLedger::new();
    for (idx, row) in table.rows().iter().enumerate() {
        if let Err(errors) = StudentRecord::from_row(table.columns(), row) {
            for error in errors {
                let value = table.cell(idx, error.field()).cloned().unwrap_or_default();
                ledger.record(idx, error.field(), value, error.to_string());
            }
        }
    }
    ledger
}
