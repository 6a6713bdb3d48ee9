//! Column names used by the pipeline stages.
//!
//! Source names are the exact headers of the school's enrollment export.
//! Derived names are intermediate columns created by the stages; they are
//! mapped onto the upload schema by the rename table in
//! [`Lookups`](super::Lookups).

// Source export
pub const RUT: &str = "Rut";
pub const CHECK_DIGIT: &str = "Digito verificador";
pub const NAMES: &str = "Nombres";
pub const PATERNAL_SURNAME: &str = "Apellido Paterno";
pub const MATERNAL_SURNAME: &str = "Apellido Materno";
pub const GRADE: &str = "Grado";
pub const SECTION: &str = "Letra";
pub const ADDRESS: &str = "Direccion";
pub const COMMUNE: &str = "Comuna";
pub const SEX: &str = "Sexo";
pub const STUDENT_EMAIL: &str = "Email Estudiante";
pub const BIRTH_DATE: &str = "Fecha de Nacimiento";
pub const ENROLLMENT_DATE: &str = "Fecha de Matrícula";
pub const GUARDIAN_NAMES: &str = "Nombre Apoderado";
pub const GUARDIAN_PATERNAL: &str = "Apellido Paterno Apo.";
pub const GUARDIAN_MATERNAL: &str = "Apellido Materno Apo.";
pub const GUARDIAN_RUT: &str = "Rut Apoderado";
pub const GUARDIAN_EMAIL: &str = "Email Apoderado";
pub const GUARDIAN_PHONE: &str = "Celular Apoderado";
pub const GUARDIAN2_NAMES: &str = "Nombre Apoderado SPL";
pub const GUARDIAN2_PATERNAL: &str = "Apellido Paterno Apo. SPL";
pub const GUARDIAN2_MATERNAL: &str = "Apellido Materno Apo. SPL";
pub const GUARDIAN2_RUT: &str = "Rut Apoderado SPL";
pub const GUARDIAN2_EMAIL: &str = "Email Apoderado SPL";
pub const GUARDIAN2_PHONE: &str = "Celular SPL";

// Derived by the stages
pub const STUDENT_FIRST_NAME: &str = "Primer Nombre Alumno";
pub const STUDENT_SECOND_NAME: &str = "Segundo Nombre Alumno";
pub const GUARDIAN_FIRST_NAME: &str = "Primer Nombre Apoderado";
pub const GUARDIAN_SECOND_NAME: &str = "Segundo Nombre Apoderado";
pub const GUARDIAN2_FIRST_NAME: &str = "Primer Nombre Apoderado SPL";
pub const GUARDIAN2_SECOND_NAME: &str = "Segundo Nombre Apoderado SPL";
pub const COURSE: &str = "Curso";
pub const FULL_ADDRESS: &str = "Direccion Completa";
pub const LEVEL: &str = "Nivel";
pub const SCHOOL_ID: &str = "rbd";
pub const YEAR: &str = "year";
pub const LOCATION: &str = "local";

// Upload schema columns checked after renaming
pub const OUT_STUDENT_EMAIL: &str = "estudianteEmail";
pub const OUT_GUARDIAN_EMAIL: &str = "tutor1Email";
pub const OUT_GUARDIAN2_EMAIL: &str = "tutor2Email";

/// Columns the export must contain for the pipeline to run.
pub const REQUIRED: [&str; 9] = [
    RUT,
    CHECK_DIGIT,
    NAMES,
    PATERNAL_SURNAME,
    MATERNAL_SURNAME,
    GRADE,
    SECTION,
    ADDRESS,
    COMMUNE,
];

/// Full-name columns and the first/second name columns they split into.
pub const NAME_SPLITS: [(&str, &str, &str); 3] = [
    (NAMES, STUDENT_FIRST_NAME, STUDENT_SECOND_NAME),
    (GUARDIAN_NAMES, GUARDIAN_FIRST_NAME, GUARDIAN_SECOND_NAME),
    (GUARDIAN2_NAMES, GUARDIAN2_FIRST_NAME, GUARDIAN2_SECOND_NAME),
];

pub const DATE_COLUMNS: [&str; 2] = [BIRTH_DATE, ENROLLMENT_DATE];

pub const PHONE_COLUMNS: [&str; 2] = [GUARDIAN_PHONE, GUARDIAN2_PHONE];

pub const EMAIL_COLUMNS: [&str; 3] = [OUT_STUDENT_EMAIL, OUT_GUARDIAN_EMAIL, OUT_GUARDIAN2_EMAIL];
