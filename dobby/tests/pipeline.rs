//! End-to-end runs over files on disk.

use dobby::{
    read_table, Cell, ErrorKind, Lookups, PipelineError, TextEncoding, TransformConfig,
    Transformer, OUTPUT_COLUMNS,
};
use std::fs;
use std::path::Path;

const HEADER: &str = "Rut;Digito verificador;Nombres;Apellido Paterno;Apellido Materno;\
Grado;Letra;Direccion;Comuna;Sexo;Email Estudiante;Fecha de Nacimiento;Fecha de Matrícula;\
Nombre Apoderado;Apellido Paterno Apo.;Apellido Materno Apo.;Rut Apoderado;Email Apoderado;\
Celular Apoderado;Celular SPL;Observaciones";

const ROWS: &str = "23762615;K;JUAN PABLO;PEREZ;SOTO;7;A;Calle Principal 123, La Serena;4101;M;juan@colegio.cl;15-05-2011;01-03-2024;MARIA JOSE;SOTO;ROJAS;11111111-1;maria@mail.cl;+56 9 8765 4321;;sin observaciones\n\
12345678;5;ANA;DIAZ;MUÑOZ;1;B;Los Aromos 45;4102;F;;03/02/2017;01-03-2024;PEDRO;DIAZ;LARA;22222222-2;pedro@mail;123456789;223456789;\n";

fn write_input(dir: &Path, name: &str, encoding: TextEncoding) -> std::path::PathBuf {
    let text = format!("{}\n{}", HEADER, ROWS);
    let bytes = dobby::tabular::encode_content(&text, encoding).unwrap();
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn transform_write_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "alumnos.csv", TextEncoding::Utf8Sig);

    let transformer = Transformer::new(TransformConfig::default()).unwrap();
    let output = transformer.transform_file(&input).unwrap();

    assert_eq!(output.input_rows, 2);
    assert_eq!(output.table.row_count(), 2);
    assert_eq!(output.table.column_count(), 29);

    // Invalid guardian phone and malformed guardian email on the second row.
    assert_eq!(output.issues.len(), 2);
    assert!(output.issues.iter().all(|issue| issue.row == 1));

    let out_path = dir.path().join("data").join("upload.csv");
    transformer.save(&output.table, &out_path).unwrap();

    let (back, encoding) = read_table(&out_path, ';', TextEncoding::Auto).unwrap();
    assert_eq!(encoding, TextEncoding::Utf8Sig);
    assert_eq!(back.row_count(), output.table.row_count());
    assert_eq!(back.columns(), OUTPUT_COLUMNS.as_slice());

    assert_eq!(back.cell(0, "estudianteRun"), Some(&Cell::text("23762615-K")));
    assert_eq!(back.cell(0, "tutor1Celular"), Some(&Cell::text("987654321")));
    assert_eq!(back.cell(1, "tutor1Celular"), Some(&Cell::text("0")));
    assert_eq!(back.cell(1, "fechaNacimiento"), Some(&Cell::text("2017-02-03")));
    assert_eq!(back.cell(0, "direccion"), Some(&Cell::text("CALLE PRINCIPAL 123, LA SERENA")));
}

#[test]
fn latin1_input_with_accented_headers() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "latin.csv", TextEncoding::Latin1);

    let config = TransformConfig {
        input_encoding: TextEncoding::Latin1,
        ..Default::default()
    };
    let output = Transformer::new(config).unwrap().transform_file(&input).unwrap();

    assert_eq!(output.encoding, TextEncoding::Latin1);
    assert!(output.table.cell(0, "fechaMatricula").is_some_and(|c| !c.is_missing()));
    assert_eq!(output.table.cell(1, "estudianteMaterno"), Some(&Cell::text("MUÑOZ")));
}

#[test]
fn missing_file_is_a_read_failure() {
    let dir = tempfile::tempdir().unwrap();
    let transformer = Transformer::new(TransformConfig::default()).unwrap();
    let err = transformer
        .transform_file(&dir.path().join("nope.csv"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileRead);
    assert!(matches!(err, PipelineError::Transformation(_)));
}

#[test]
fn missing_columns_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("short.csv");
    fs::write(&input, "Rut;Nombres\n1;ANA\n").unwrap();

    let transformer = Transformer::new(TransformConfig::default()).unwrap();
    let err = transformer.transform_file(&input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ColumnMissing);
    assert!(err.to_string().contains("Digito verificador"));
}

#[test]
fn unwritable_destination_is_an_output_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "alumnos.csv", TextEncoding::Utf8Sig);
    let transformer = Transformer::new(TransformConfig::default()).unwrap();
    let output = transformer.transform_file(&input).unwrap();

    // A regular file where the parent directory should be.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let err = transformer
        .save(&output.table, &blocker.join("upload.csv"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileWrite);
}

#[test]
fn lookups_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut lookups = Lookups::default();
    lookups.communes.insert("4102".into(), "PUERTO COQUIMBO".into());
    let tables = dir.path().join("tables.json");
    fs::write(&tables, lookups.to_json().unwrap()).unwrap();

    let loaded = Lookups::from_file(&tables).unwrap();
    assert_eq!(loaded, lookups);

    let input = write_input(dir.path(), "alumnos.csv", TextEncoding::Utf8Sig);
    let transformer = Transformer::with_lookups(TransformConfig::default(), loaded).unwrap();
    let output = transformer.transform_file(&input).unwrap();
    assert_eq!(
        output.table.cell(1, "direccion"),
        Some(&Cell::text("LOS AROMOS 45, PUERTO COQUIMBO"))
    );
}
