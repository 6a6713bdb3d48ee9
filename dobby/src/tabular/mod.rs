//! In-memory table with named, ordered columns.
//!
//! The pipeline mutates one [`Table`] in place: columns are added, renamed,
//! dropped and reordered while row order always matches the input file.
//! Reading and writing live in [`reader`] and [`writer`]; text encodings in
//! [`encoding`].

pub mod encoding;
pub mod reader;
pub mod writer;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub use encoding::{decode_content, detect_encoding, encode_content, TextEncoding};
pub use reader::{parse_table, read_table, read_table_bytes};
pub use writer::{render_table, write_table};

// =============================================================================
// Cell
// =============================================================================

/// A single table value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Empty field.
    #[default]
    Missing,
    Text(String),
    Int(i64),
    Date(NaiveDate),
}

impl Cell {
    /// Build a text cell; empty input becomes [`Cell::Missing`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Missing
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Borrow the text of a [`Cell::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Textual form of any present value, `None` when missing.
    pub fn text_value(&self) -> Option<String> {
        match self {
            Cell::Missing => None,
            other => Some(other.to_string()),
        }
    }

    /// Key used for code lookups: trimmed text, with spreadsheet float
    /// artifacts like `4101.0` reduced to `4101`.
    pub fn lookup_key(&self) -> Option<String> {
        let text = self.text_value()?;
        let trimmed = text.trim();
        if let Some(int_part) = trimmed.strip_suffix(".0") {
            if !int_part.is_empty() && int_part.chars().all(|c| c.is_ascii_digit()) {
                return Some(int_part.to_string());
            }
        }
        Some(trimmed.to_string())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Int(n) => write!(f, "{}", n),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

// =============================================================================
// Table
// =============================================================================

/// Ordered rows over an ordered set of column names.
///
/// Every row always has exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a table from a header and rows. Short rows are padded with
    /// missing cells, long rows are truncated.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Missing);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in column `name`.
    pub fn cell(&self, row: usize, name: &str) -> Option<&Cell> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Iterate the cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Apply `f(row_index, cell)` to every cell of a column.
    /// Returns `false` without doing anything if the column is absent.
    pub fn update_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(usize, &mut Cell),
    {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for (row_idx, row) in self.rows.iter_mut().enumerate() {
            f(row_idx, &mut row[idx]);
        }
        true
    }

    /// Replace a column's values, or append it at the end if absent.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) {
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => self.insert_column(self.columns.len(), name, values),
        }
    }

    /// Insert a new column at `position` (clamped to the end).
    pub fn insert_column(&mut self, position: usize, name: &str, values: Vec<Cell>) {
        let position = position.min(self.columns.len());
        self.columns.insert(position, name.to_string());
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.insert(position, values.next().unwrap_or_default());
        }
    }

    /// Insert a column holding the same value on every row.
    pub fn insert_constant(&mut self, position: usize, name: &str, value: Cell) {
        let values = vec![value; self.rows.len()];
        self.insert_column(position, name, values);
    }

    /// Remove a column, returning its values.
    pub fn drop_column(&mut self, name: &str) -> Option<Vec<Cell>> {
        let idx = self.column_index(name)?;
        self.columns.remove(idx);
        Some(self.rows.iter_mut().map(|row| row.remove(idx)).collect())
    }

    /// Rename columns through `renames`; each column is looked up once.
    pub fn rename_columns(&mut self, renames: &BTreeMap<String, String>) {
        for column in &mut self.columns {
            if let Some(new_name) = renames.get(column.as_str()) {
                *column = new_name.clone();
            }
        }
    }

    /// Keep exactly `columns`, in that order. Columns not listed are dropped;
    /// listed columns that do not exist are added as missing cells.
    pub fn select(&mut self, columns: &[String]) {
        let sources: Vec<Option<usize>> = columns.iter().map(|c| self.column_index(c)).collect();
        for row in &mut self.rows {
            let mut old = std::mem::take(row);
            *row = sources
                .iter()
                .map(|src| match src {
                    Some(idx) => std::mem::take(&mut old[*idx]),
                    None => Cell::Missing,
                })
                .collect();
        }
        self.columns = columns.to_vec();
    }
}
