//! Delimited-table reader with configurable separator and encoding.

use std::path::Path;

use super::encoding::{decode_content, detect_encoding, TextEncoding};
use super::{Cell, Table};
use crate::error::{TableError, TableResult};

/// Read a delimited file into a [`Table`].
///
/// Returns the table together with the encoding actually used, which differs
/// from `encoding` only when it was [`TextEncoding::Auto`].
pub fn read_table(
    path: &Path,
    separator: char,
    encoding: TextEncoding,
) -> TableResult<(Table, TextEncoding)> {
    let bytes = std::fs::read(path).map_err(|source| TableError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_table_bytes(&bytes, separator, encoding)
}

/// Decode and parse raw file bytes.
pub fn read_table_bytes(
    bytes: &[u8],
    separator: char,
    encoding: TextEncoding,
) -> TableResult<(Table, TextEncoding)> {
    let encoding = match encoding {
        TextEncoding::Auto => detect_encoding(bytes),
        explicit => explicit,
    };
    let content = decode_content(bytes, encoding)?;
    Ok((parse_table(&content, separator)?, encoding))
}

/// Parse already-decoded text.
///
/// The first record is the header. Empty fields become [`Cell::Missing`],
/// every other field is kept verbatim as [`Cell::Text`]. Blank lines are
/// skipped; rows shorter than the header are padded.
pub fn parse_table(content: &str, separator: char) -> TableResult<Table> {
    if content.trim().is_empty() {
        return Err(TableError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(Cell::text).collect());
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_table() {
        let table = parse_table("Rut;Nombres\n12345678;JUAN PABLO\n23456789;MARIA", ';').unwrap();

        assert_eq!(table.columns(), ["Rut", "Nombres"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, "Nombres"), Some(&Cell::text("JUAN PABLO")));
        assert_eq!(table.cell(1, "Rut"), Some(&Cell::text("23456789")));
    }

    #[test]
    fn test_quoted_values_keep_separator() {
        let table = parse_table("a;b\n\"x;y\";\"Hello World\"", ';').unwrap();
        assert_eq!(table.cell(0, "a"), Some(&Cell::text("x;y")));
        assert_eq!(table.cell(0, "b"), Some(&Cell::text("Hello World")));
    }

    #[test]
    fn test_empty_fields_are_missing() {
        let table = parse_table("a;b;c\n1;;3", ';').unwrap();
        assert_eq!(table.cell(0, "b"), Some(&Cell::Missing));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = parse_table("a;b;c\n1", ';').unwrap();
        assert_eq!(table.cell(0, "c"), Some(&Cell::Missing));
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse_table("a;b\n1;2\n\n3;4\n", ';').unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_empty_content_error() {
        assert!(matches!(parse_table("", ';'), Err(TableError::EmptyFile)));
    }

    #[test]
    fn test_bom_header_is_clean() {
        let bytes = [&[0xEF, 0xBB, 0xBF][..], "Rut;Letra\n1;A".as_bytes()].concat();
        let (table, encoding) = read_table_bytes(&bytes, ';', TextEncoding::Utf8Sig).unwrap();
        assert_eq!(encoding, TextEncoding::Utf8Sig);
        assert!(table.has_column("Rut"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = read_table(Path::new("/nonexistent/input.csv"), ';', TextEncoding::Utf8)
            .unwrap_err();
        assert!(matches!(err, TableError::Read { .. }));
    }
}
