//! Pipeline driver.
//!
//! A [`Transformer`] owns the run configuration and lookup tables and runs
//! the stages of [`Stage::PIPELINE`] over one table, threading it by value.
//! Record-level problems are appended to an [`ErrorLedger`]; anything else
//! stops the run and is surfaced once as [`PipelineError::Transformation`].
//!
//! ```rust,ignore
//! use dobby::{TransformConfig, Transformer};
//! use std::path::Path;
//!
//! let transformer = Transformer::new(TransformConfig::default())?;
//! let output = transformer.transform_file(Path::new("data/alumnos.csv"))?;
//! println!("{} rows, {} issues", output.table.row_count(), output.issues.len());
//! ```

use std::path::Path;

use super::columns;
use super::ledger::ErrorLedger;
use super::lookups::Lookups;
use super::normalize::{normalize_phone, parse_day_first, split_first_space, AddressCleaner, PhoneNumber};
use super::stages::Stage;
use crate::config::TransformConfig;
use crate::error::{PipelineError, PipelineResult, TableError, TransformError, TransformResult};
use crate::logs::{log_debug, log_error, log_info, log_success, log_warning};
use crate::tabular::{read_table, write_table, Cell, Table, TextEncoding};
use crate::validation::{format_rut, validate_email, validate_rut};

pub const RUT_MESSAGE: &str = "Invalid RUT check digit";
pub const PHONE_MESSAGE: &str =
    "Invalid phone: must be 9 digits (mobile 9XX... or fixed 2-7XX...)";
pub const EMAIL_MESSAGE: &str = "Invalid email format";

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Table in the upload schema
    pub table: Table,
    /// Record-level issues, in discovery order
    pub issues: ErrorLedger,
    /// Body rows read from the input
    pub input_rows: usize,
    /// Encoding the input was decoded with
    pub encoding: TextEncoding,
}

impl TransformOutput {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Runs the transformation pipeline.
#[derive(Debug, Clone)]
pub struct Transformer {
    config: TransformConfig,
    lookups: Lookups,
    addresses: AddressCleaner,
}

impl Transformer {
    /// Transformer with the built-in lookup tables.
    pub fn new(config: TransformConfig) -> PipelineResult<Self> {
        Self::with_lookups(config, Lookups::default())
    }

    /// Transformer with custom lookup tables.
    pub fn with_lookups(config: TransformConfig, lookups: Lookups) -> PipelineResult<Self> {
        config.validate()?;
        lookups.validate()?;
        let addresses = AddressCleaner::new(&lookups.localities)
            .map_err(|e| PipelineError::Config(format!("invalid locality pattern: {}", e)))?;
        Ok(Self {
            config,
            lookups,
            addresses,
        })
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn lookups(&self) -> &Lookups {
        &self.lookups
    }

    // =========================================================================
    // Runs
    // =========================================================================

    /// Read the input table with the configured separator and encoding.
    pub fn load(&self, path: &Path) -> TransformResult<(Table, TextEncoding)> {
        let (table, encoding) = read_table(
            path,
            self.config.field_separator,
            self.config.input_encoding,
        )?;
        log_info(format!(
            "Loaded {} rows, {} columns from {} ({})",
            table.row_count(),
            table.column_count(),
            path.display(),
            encoding
        ));
        Ok((table, encoding))
    }

    /// Load a file and run every stage over it.
    pub fn transform_file(&self, path: &Path) -> PipelineResult<TransformOutput> {
        log_info(format!("Transforming {}", path.display()));
        let (table, encoding) = self.load(path).map_err(|e| self.fail(e))?;
        let input_rows = table.row_count();
        let (table, issues) = self.transform_table(table)?;
        Ok(TransformOutput {
            table,
            issues,
            input_rows,
            encoding,
        })
    }

    /// Run every stage over an already loaded table.
    pub fn transform_table(&self, table: Table) -> PipelineResult<(Table, ErrorLedger)> {
        let (table, issues) = self.run_stages(table).map_err(|e| self.fail(e))?;

        if issues.is_empty() {
            log_success(format!(
                "Transformation complete: {} rows, {} columns",
                table.row_count(),
                table.column_count()
            ));
        } else {
            log_warning(format!(
                "Transformation complete with {} validation issues in {} rows",
                issues.len(),
                issues.affected_rows().len()
            ));
        }
        Ok((table, issues))
    }

    fn run_stages(&self, mut table: Table) -> TransformResult<(Table, ErrorLedger)> {
        let mut ledger = ErrorLedger::new();
        for stage in Stage::PIPELINE {
            let before = ledger.len();
            table = self.apply(stage, table, &mut ledger)?;
            log_debug(format!(
                "{}: {} columns, {} new issues",
                stage.name(),
                table.column_count(),
                ledger.len() - before
            ));
        }
        Ok((table, ledger))
    }

    fn fail(&self, error: TransformError) -> PipelineError {
        log_error(format!("Transformation failed: {}", error));
        PipelineError::Transformation(error)
    }

    /// Write a transformed table with the configured separator and encoding.
    pub fn save(&self, table: &Table, path: &Path) -> PipelineResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| {
                PipelineError::Output(TableError::Write {
                    path: parent.to_path_buf(),
                    source,
                })
            })?;
        }
        write_table(
            table,
            path,
            self.config.field_separator,
            self.config.output_encoding,
        )
        .map_err(PipelineError::Output)?;
        log_success(format!("Saved {} rows to {}", table.row_count(), path.display()));
        Ok(())
    }

    // =========================================================================
    // Stages
    // =========================================================================

    /// Run a single stage.
    pub fn apply(
        &self,
        stage: Stage,
        table: Table,
        ledger: &mut ErrorLedger,
    ) -> TransformResult<Table> {
        match stage {
            Stage::RequireColumns => self.require_columns(table),
            Stage::CleanAddresses => Ok(self.clean_addresses(table)),
            Stage::UppercaseAddresses => Ok(self.uppercase_addresses(table)),
            Stage::FormatRuts => self.format_ruts(table, ledger),
            Stage::SplitNames => Ok(self.split_names(table)),
            Stage::CreateCourseCodes => self.create_course_codes(table),
            Stage::MapCommunes => Ok(self.map_communes(table)),
            Stage::CreateFullAddresses => self.create_full_addresses(table),
            Stage::AddMetadata => Ok(self.add_metadata(table)),
            Stage::ConvertDates => self.convert_dates(table),
            Stage::CleanPhones => Ok(self.clean_phones(table, ledger)),
            Stage::RenameColumns => Ok(self.rename_columns(table)),
            Stage::ReorderColumns => Ok(self.reorder_columns(table)),
            Stage::ValidateEmails => Ok(self.validate_emails(table, ledger)),
        }
    }

    /// Fail with every required column that is absent.
    pub fn require_columns(&self, table: Table) -> TransformResult<Table> {
        let missing: Vec<String> = columns::REQUIRED
            .iter()
            .filter(|name| !table.has_column(name))
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            Ok(table)
        } else {
            Err(TransformError::MissingColumns(missing))
        }
    }

    pub fn clean_addresses(&self, mut table: Table) -> Table {
        table.update_column(columns::ADDRESS, |_, cell| {
            *cell = Cell::text(self.addresses.clean_cell(cell));
        });
        table
    }

    /// Uppercase `Direccion` if it is still present under that name.
    pub fn uppercase_addresses(&self, mut table: Table) -> Table {
        table.update_column(columns::ADDRESS, |_, cell| {
            if let Cell::Text(text) = cell {
                *text = text.to_uppercase();
            }
        });
        table
    }

    /// `Rut` becomes `body-check`, the check digit column is dropped and,
    /// when enabled, every identifier is validated.
    pub fn format_ruts(&self, mut table: Table, ledger: &mut ErrorLedger) -> TransformResult<Table> {
        if !table.has_column(columns::RUT) {
            return Err(TransformError::MissingColumn(columns::RUT.to_string()));
        }
        let checks = table
            .drop_column(columns::CHECK_DIGIT)
            .ok_or_else(|| TransformError::MissingColumn(columns::CHECK_DIGIT.to_string()))?;

        let validate = self.config.validate_identifier;
        table.update_column(columns::RUT, |row, cell| {
            let body = cell.lookup_key().unwrap_or_default();
            let check = checks[row].lookup_key().unwrap_or_default();
            *cell = Cell::text(format_rut(&body, &check));

            if validate && !validate_rut(&cell.to_string()) {
                ledger.record(row, columns::RUT, cell.clone(), RUT_MESSAGE);
            }
        });
        Ok(table)
    }

    /// Split each present full-name column into first and second name.
    pub fn split_names(&self, mut table: Table) -> Table {
        for (source, first, second) in columns::NAME_SPLITS {
            let Some(position) = table.column_index(source) else {
                continue;
            };
            let names = table.drop_column(source).unwrap_or_default();
            let (firsts, seconds): (Vec<Cell>, Vec<Cell>) =
                names.iter().map(split_first_space).unzip();
            table.insert_column(position, first, firsts);
            table.insert_column(position + 1, second, seconds);
        }
        table
    }

    /// `Curso` = `Grado` + `Letra`.
    pub fn create_course_codes(&self, mut table: Table) -> TransformResult<Table> {
        let grades = column_values(&table, columns::GRADE)?;
        let sections = column_values(&table, columns::SECTION)?;
        let courses = grades
            .iter()
            .zip(&sections)
            .map(|(grade, section)| Cell::text(format!("{}{}", grade, section)))
            .collect();
        table.set_column(columns::COURSE, courses);
        Ok(table)
    }

    /// Replace known commune codes with names. Unknown codes are kept.
    pub fn map_communes(&self, mut table: Table) -> Table {
        table.update_column(columns::COMMUNE, |_, cell| {
            if let Some(code) = cell.lookup_key() {
                if let Some(name) = self.lookups.commune_name(&code) {
                    *cell = Cell::text(name);
                }
            }
        });
        table
    }

    /// `Direccion Completa` = `Direccion, Comuna`; `Direccion` is dropped.
    pub fn create_full_addresses(&self, mut table: Table) -> TransformResult<Table> {
        let communes = column_values(&table, columns::COMMUNE)?;
        let position = table
            .column_index(columns::ADDRESS)
            .ok_or_else(|| TransformError::MissingColumn(columns::ADDRESS.to_string()))?;
        let addresses = table.drop_column(columns::ADDRESS).unwrap_or_default();

        let full = addresses
            .iter()
            .zip(&communes)
            .map(|(address, commune)| Cell::text(format!("{}, {}", address, commune)))
            .collect();
        table.insert_column(position, columns::FULL_ADDRESS, full);
        Ok(table)
    }

    /// Insert `rbd`, `year`, `Nivel` and `local` at the front and fill
    /// `Nivel` from `Grado`.
    pub fn add_metadata(&self, mut table: Table) -> Table {
        table.insert_constant(0, columns::SCHOOL_ID, Cell::Int(self.config.school_id));
        table.insert_constant(
            1,
            columns::YEAR,
            Cell::Int(i64::from(self.config.academic_year)),
        );
        table.insert_constant(2, columns::LEVEL, Cell::Missing);
        table.insert_constant(
            3,
            columns::LOCATION,
            Cell::text(self.config.location_label.as_str()),
        );

        let levels: Option<Vec<Cell>> = table.column(columns::GRADE).map(|grades| {
            grades
                .map(|grade| {
                    grade
                        .lookup_key()
                        .and_then(|key| self.lookups.grade_level(&key))
                        .map(Cell::text)
                        .unwrap_or_default()
                })
                .collect()
        });
        if let Some(levels) = levels {
            table.set_column(columns::LEVEL, levels);
        }
        table
    }

    /// Reparse present date columns day-first. Empty cells stay missing;
    /// anything else that does not parse aborts the run.
    pub fn convert_dates(&self, mut table: Table) -> TransformResult<Table> {
        for name in columns::DATE_COLUMNS {
            if !table.has_column(name) {
                continue;
            }
            let dates = table
                .column(name)
                .into_iter()
                .flatten()
                .enumerate()
                .map(|(row, cell)| match cell {
                    Cell::Missing | Cell::Date(_) => Ok(cell.clone()),
                    other => {
                        let raw = other.to_string();
                        if raw.trim().is_empty() {
                            return Ok(Cell::Missing);
                        }
                        parse_day_first(raw.trim())
                            .map(Cell::Date)
                            .ok_or(TransformError::InvalidDate {
                                row,
                                column: name.to_string(),
                                value: raw,
                            })
                    }
                })
                .collect::<TransformResult<Vec<Cell>>>()?;
            table.set_column(name, dates);
        }
        Ok(table)
    }

    /// Normalize guardian phones; invalid numbers are recorded and zeroed.
    pub fn clean_phones(&self, mut table: Table, ledger: &mut ErrorLedger) -> Table {
        for name in columns::PHONE_COLUMNS {
            table.update_column(name, |row, cell| {
                let phone = normalize_phone(cell);
                if let PhoneNumber::Invalid { .. } = phone {
                    ledger.record(row, name, cell.clone(), PHONE_MESSAGE);
                }
                *cell = Cell::Int(phone.stored_value());
            });
        }
        table
    }

    pub fn rename_columns(&self, mut table: Table) -> Table {
        table.rename_columns(&self.lookups.renames);
        table
    }

    /// Keep exactly the output columns, in order.
    pub fn reorder_columns(&self, mut table: Table) -> Table {
        table.drop_column(columns::GRADE);
        table.select(&self.lookups.output_columns);
        table
    }

    /// Record every malformed, non-empty email when email checks are on.
    pub fn validate_emails(&self, table: Table, ledger: &mut ErrorLedger) -> Table {
        if !self.config.validate_email {
            return table;
        }
        for name in columns::EMAIL_COLUMNS {
            let Some(cells) = table.column(name) else {
                continue;
            };
            for (row, cell) in cells.enumerate() {
                if let Some(email) = cell.as_str() {
                    if !email.trim().is_empty() && !validate_email(email) {
                        ledger.record(row, name, cell.clone(), EMAIL_MESSAGE);
                    }
                }
            }
        }
        table
    }
}

/// Display form of every cell of a required column.
fn column_values(table: &Table, name: &str) -> TransformResult<Vec<String>> {
    table
        .column(name)
        .map(|cells| cells.map(|cell| cell.to_string()).collect())
        .ok_or_else(|| TransformError::MissingColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::tabular::parse_table;
    use chrono::NaiveDate;

    const HEADER: &str = "Rut;Digito verificador;Nombres;Apellido Paterno;Apellido Materno;\
Grado;Letra;Direccion;Comuna;Sexo;Email Estudiante;Fecha de Nacimiento;Fecha de Matrícula;\
Nombre Apoderado;Apellido Paterno Apo.;Apellido Materno Apo.;Rut Apoderado;Email Apoderado;\
Celular Apoderado;Nombre Apoderado SPL;Celular SPL;Email Apoderado SPL";

    fn fixture() -> Table {
        let content = format!(
            "{}\n\
23762615;K;JUAN PABLO;PEREZ;SOTO;7;A;Calle Principal 123, La Serena;4101;M;juan@colegio.cl;15-05-2011;01-03-2024;MARIA JOSE;SOTO;ROJAS;11111111-1;maria@mail.cl;987654321;;0;\n\
12345678;5;ANA;DIAZ;MUÑOZ;1;B;Los Aromos 45 Coquimbo;4102;F;;3/2/2017;01-03-2024;PEDRO;DIAZ;LARA;22222222-2;no-es-email;123456789;LUISA FERNANDA;223456789;luisa@mail.cl\n",
            HEADER
        );
        parse_table(&content, ';').unwrap()
    }

    fn transformer() -> Transformer {
        Transformer::new(TransformConfig::default()).unwrap()
    }

    fn run_until(transformer: &Transformer, last: Stage) -> (Table, ErrorLedger) {
        let mut ledger = ErrorLedger::new();
        let mut table = fixture();
        for stage in Stage::PIPELINE {
            table = transformer.apply(stage, table, &mut ledger).unwrap();
            if stage == last {
                break;
            }
        }
        (table, ledger)
    }

    #[test]
    fn test_full_pipeline_shape() {
        let (table, issues) = transformer().transform_table(fixture()).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 29);
        assert_eq!(table.columns(), Lookups::default().output_columns.as_slice());

        assert!(issues.iter().all(|i| i.field != columns::RUT));
        assert_eq!(table.cell(0, "estudianteRun"), Some(&Cell::text("23762615-K")));
        assert_eq!(table.cell(1, "estudianteRun"), Some(&Cell::text("12345678-5")));
    }

    #[test]
    fn test_full_pipeline_values() {
        let (table, _) = transformer().transform_table(fixture()).unwrap();

        assert_eq!(table.cell(0, "rbd"), Some(&Cell::Int(574)));
        assert_eq!(table.cell(0, "year"), Some(&Cell::Int(2025)));
        assert_eq!(table.cell(0, "local"), Some(&Cell::text("Principal")));
        assert_eq!(table.cell(0, "nivel"), Some(&Cell::text("7° Básico")));
        assert_eq!(table.cell(0, "curso"), Some(&Cell::text("7A")));
        assert_eq!(table.cell(0, "direccion"), Some(&Cell::text("CALLE PRINCIPAL 123, LA SERENA")));
        assert_eq!(table.cell(1, "direccion"), Some(&Cell::text("LOS AROMOS 45, COQUIMBO")));
        assert_eq!(table.cell(0, "estudianteNombre1"), Some(&Cell::text("JUAN")));
        assert_eq!(table.cell(0, "estudianteNombre2"), Some(&Cell::text("PABLO")));
        assert_eq!(table.cell(1, "estudianteNombre2"), Some(&Cell::Missing));
        assert_eq!(table.cell(0, "tutor1Nombre2"), Some(&Cell::text("JOSE")));
        assert_eq!(table.cell(1, "tutor2Nombre1"), Some(&Cell::text("LUISA")));
        assert_eq!(
            table.cell(1, "fechaNacimiento"),
            Some(&Cell::Date(NaiveDate::from_ymd_opt(2017, 2, 3).unwrap()))
        );
        assert_eq!(table.cell(0, "tutor1Celular"), Some(&Cell::Int(987654321)));
        assert_eq!(table.cell(1, "tutor2Celular"), Some(&Cell::Int(223456789)));
        assert_eq!(table.cell(0, "tutor2Celular"), Some(&Cell::Int(0)));
    }

    #[test]
    fn test_record_issues_do_not_abort() {
        let (table, issues) = transformer().transform_table(fixture()).unwrap();

        assert_eq!(issues.len(), 2);
        let phone = &issues.issues()[0];
        assert_eq!(phone.row, 1);
        assert_eq!(phone.field, columns::GUARDIAN_PHONE);
        assert_eq!(phone.value, Cell::text("123456789"));
        assert_eq!(phone.message, PHONE_MESSAGE);
        assert_eq!(table.cell(1, "tutor1Celular"), Some(&Cell::Int(0)));

        let email = &issues.issues()[1];
        assert_eq!(email.row, 1);
        assert_eq!(email.field, "tutor1Email");
        assert_eq!(email.message, EMAIL_MESSAGE);
    }

    #[test]
    fn test_padded_email_is_recorded() {
        let mut table = fixture();
        table.update_column(columns::STUDENT_EMAIL, |row, cell| {
            if row == 0 {
                *cell = Cell::text(" ana@mail.cl ");
            }
        });
        let (out, issues) = transformer().transform_table(table).unwrap();

        // Written as received, and reported.
        assert_eq!(out.cell(0, columns::OUT_STUDENT_EMAIL), Some(&Cell::text(" ana@mail.cl ")));
        let padded: Vec<_> = issues.iter().filter(|i| i.field == columns::OUT_STUDENT_EMAIL).collect();
        assert_eq!(padded.len(), 1);
        assert_eq!(padded[0].row, 0);
        assert_eq!(padded[0].value, Cell::text(" ana@mail.cl "));
        assert_eq!(padded[0].message, EMAIL_MESSAGE);
    }

    #[test]
    fn test_invalid_rut_recorded_and_kept() {
        let mut table = fixture();
        table.update_column(columns::CHECK_DIGIT, |row, cell| {
            if row == 1 {
                *cell = Cell::text("9");
            }
        });
        let (out, issues) = transformer().transform_table(table).unwrap();

        assert_eq!(out.row_count(), 2);
        let rut_issues: Vec<_> = issues.iter().filter(|i| i.field == columns::RUT).collect();
        assert_eq!(rut_issues.len(), 1);
        assert_eq!(rut_issues[0].row, 1);
        assert_eq!(rut_issues[0].value, Cell::text("12345678-9"));
        assert_eq!(rut_issues[0].message, RUT_MESSAGE);
    }

    #[test]
    fn test_validation_switches() {
        let config = TransformConfig {
            validate_email: false,
            validate_identifier: false,
            ..Default::default()
        };
        let mut table = fixture();
        table.update_column(columns::CHECK_DIGIT, |_, cell| *cell = Cell::text("1"));
        let (_, issues) = Transformer::new(config).unwrap().transform_table(table).unwrap();

        // Only the phone issue remains; phones are always normalized.
        assert_eq!(issues.len(), 1);
        assert_eq!(issues.issues()[0].field, columns::GUARDIAN_PHONE);
    }

    #[test]
    fn test_skip_invalid_rows_is_currently_inert() {
        let strict = TransformConfig {
            skip_invalid_rows: true,
            ..Default::default()
        };
        let with_flag = Transformer::new(strict).unwrap().transform_table(fixture()).unwrap();
        let without = transformer().transform_table(fixture()).unwrap();
        assert_eq!(with_flag, without);
        assert_eq!(with_flag.0.row_count(), 2);
    }

    #[test]
    fn test_missing_required_columns() {
        let table = parse_table("Rut;Nombres;Comuna\n1;A;4101\n", ';').unwrap();
        let err = transformer().transform_table(table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ColumnMissing);
        let msg = err.to_string();
        for name in ["Digito verificador", "Apellido Paterno", "Grado", "Letra", "Direccion"] {
            assert!(msg.contains(name), "{} not in {}", name, msg);
        }
        assert!(!msg.contains("Nombres"));
    }

    #[test]
    fn test_invalid_date_aborts() {
        let mut table = fixture();
        table.update_column(columns::BIRTH_DATE, |row, cell| {
            if row == 1 {
                *cell = Cell::text("no sabe");
            }
        });
        let err = transformer().transform_table(table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transformation);
        assert!(matches!(
            err,
            PipelineError::Transformation(TransformError::InvalidDate { row: 1, .. })
        ));
    }

    #[test]
    fn test_empty_date_stays_missing() {
        let mut table = fixture();
        table.update_column(columns::ENROLLMENT_DATE, |_, cell| *cell = Cell::Missing);
        let (out, _) = transformer().transform_table(table).unwrap();
        assert_eq!(out.cell(0, "fechaMatricula"), Some(&Cell::Missing));
    }

    #[test]
    fn test_uppercase_only_while_address_present() {
        let t = transformer();
        let (table, _) = run_until(&t, Stage::UppercaseAddresses);
        assert_eq!(table.cell(0, columns::ADDRESS), Some(&Cell::text("CALLE PRINCIPAL 123")));

        let (table, _) = run_until(&t, Stage::CreateFullAddresses);
        assert!(!table.has_column(columns::ADDRESS));
        let again = t.uppercase_addresses(table.clone());
        assert_eq!(again, table);
    }

    #[test]
    fn test_format_ruts_drops_check_digit() {
        let (table, ledger) = run_until(&transformer(), Stage::FormatRuts);
        assert!(!table.has_column(columns::CHECK_DIGIT));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_split_names_skips_absent_columns() {
        let t = transformer();
        let mut table = fixture();
        table.drop_column(columns::GUARDIAN2_NAMES);
        let table = t.split_names(table);
        assert!(table.has_column(columns::STUDENT_FIRST_NAME));
        assert!(table.has_column(columns::GUARDIAN_SECOND_NAME));
        assert!(!table.has_column(columns::GUARDIAN2_FIRST_NAME));
        assert!(!table.has_column(columns::NAMES));
    }

    #[test]
    fn test_unmapped_commune_passes_through() {
        let t = transformer();
        let mut table = fixture();
        table.update_column(columns::COMMUNE, |row, cell| {
            *cell = Cell::text(if row == 0 { "9999" } else { "4106.0" });
        });
        let table = t.map_communes(table);
        assert_eq!(table.cell(0, columns::COMMUNE), Some(&Cell::text("9999")));
        assert_eq!(table.cell(1, columns::COMMUNE), Some(&Cell::text("VICUÑA")));
    }

    #[test]
    fn test_substituted_commune_table() {
        let mut lookups = Lookups::default();
        lookups.communes.insert("4101".into(), "SERENA CENTRO".into());
        let t = Transformer::with_lookups(TransformConfig::default(), lookups).unwrap();
        let (table, _) = t.transform_table(fixture()).unwrap();
        assert_eq!(table.cell(0, "direccion"), Some(&Cell::text("CALLE PRINCIPAL 123, SERENA CENTRO")));
    }

    #[test]
    fn test_unknown_grade_keeps_empty_level() {
        let t = transformer();
        let mut table = fixture();
        table.update_column(columns::GRADE, |_, cell| *cell = Cell::text("99"));
        let table = t.add_metadata(table);
        assert_eq!(&table.columns()[..4], &["rbd", "year", "Nivel", "local"]);
        assert_eq!(table.cell(0, columns::LEVEL), Some(&Cell::Missing));
    }

    #[test]
    fn test_rename_and_reorder_idempotent() {
        let t = transformer();
        let (table, _) = t.transform_table(fixture()).unwrap();
        let again = t.reorder_columns(t.rename_columns(table.clone()));
        assert_eq!(again, table);
    }

    #[test]
    fn test_bad_configuration_rejected() {
        let config = TransformConfig {
            field_separator: '"',
            ..Default::default()
        };
        assert!(matches!(
            Transformer::new(config),
            Err(PipelineError::Config(_))
        ));
    }
}
