//! Append-only ledger of record-level validation issues.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::tabular::Cell;

/// One non-fatal problem found in a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Zero-based index of the row in the input body (header excluded).
    pub row: usize,
    /// Column the value came from, as named at the time of the check.
    pub field: String,
    /// The offending value as it was before any substitution.
    pub value: Cell,
    pub message: String,
}

impl ValidationIssue {
    /// One-based line number in the input file, counting the header.
    pub fn line_number(&self) -> usize {
        self.row + 2
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Row {}, field '{}' (value '{}'): {}",
            self.row, self.field, self.value, self.message
        )
    }
}

/// Issues in discovery order. Nothing is ever removed or merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorLedger {
    issues: Vec<ValidationIssue>,
}

impl ErrorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an issue.
    pub fn record(
        &mut self,
        row: usize,
        field: impl Into<String>,
        value: Cell,
        message: impl Into<String>,
    ) {
        self.issues.push(ValidationIssue {
            row,
            field: field.into(),
            value,
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationIssue> {
        self.issues.iter()
    }

    /// Number of issues per field.
    pub fn counts_by_field(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.field.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct rows with at least one issue.
    pub fn affected_rows(&self) -> BTreeSet<usize> {
        self.issues.iter().map(|issue| issue.row).collect()
    }

    /// Serialize the issues as a JSON array.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl<'a> IntoIterator for &'a ErrorLedger {
    type Item = &'a ValidationIssue;
    type IntoIter = std::slice::Iter<'a, ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}
