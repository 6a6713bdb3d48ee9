//! Delimited-table writer.
//!
//! Output goes to a sibling temporary file first and is renamed over the
//! destination once fully written.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::encoding::{encode_content, TextEncoding};
use super::Table;
use crate::error::{TableError, TableResult};

/// Render a table as delimited text (header + one line per row).
pub fn render_table(table: &Table, separator: char) -> TableResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(separator as u8)
        .from_writer(Vec::new());

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TableError::Csv(csv::Error::from(e.into_error())))?;
    String::from_utf8(bytes).map_err(|_| TableError::Encode {
        encoding: "utf-8".to_string(),
    })
}

/// Write a table to `path` in the given separator and encoding.
pub fn write_table(
    table: &Table,
    path: &Path,
    separator: char,
    encoding: TextEncoding,
) -> TableResult<()> {
    let text = render_table(table, separator)?;
    let bytes = encode_content(&text, encoding)?;

    let write_err = |source| TableError::Write {
        path: path.to_path_buf(),
        source,
    };

    let staging = staging_path(path);
    fs::write(&staging, &bytes).map_err(write_err)?;
    if let Err(source) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(write_err(source));
    }
    Ok(())
}

/// `dir/.name.tmp` next to the destination, so the rename stays on one filesystem.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::{read_table, Cell};

    fn sample() -> Table {
        Table::from_rows(
            vec!["rbd".into(), "direccion".into(), "tutor1Celular".into()],
            vec![
                vec![Cell::Int(574), Cell::text("CALLE 1, LA SERENA"), Cell::Int(987654321)],
                vec![Cell::Int(574), Cell::Missing, Cell::Int(0)],
            ],
        )
    }

    #[test]
    fn test_render_quotes_when_needed() {
        let text = render_table(&sample(), ',').unwrap();
        assert!(text.starts_with("rbd,direccion,tutor1Celular\n"));
        assert!(text.contains("\"CALLE 1, LA SERENA\""));
    }

    #[test]
    fn test_missing_renders_empty() {
        let text = render_table(&sample(), ';').unwrap();
        assert!(text.contains("574;;0"));
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_table(&sample(), &path, ';', TextEncoding::Utf8Sig).unwrap();
        let (table, _) = read_table(&path, ';', TextEncoding::Utf8Sig).unwrap();

        assert_eq!(table.columns(), sample().columns());
        assert_eq!(table.row_count(), 2);
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.csv");
        let err = write_table(&sample(), &path, ';', TextEncoding::Utf8).unwrap_err();
        assert!(matches!(err, TableError::Write { .. }));
    }
}
