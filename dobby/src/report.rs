//! Run reports: counts, the issue table and a JSON export.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult, TableError};
use crate::transform::{ErrorLedger, TransformOutput, ValidationIssue};

/// Widest value shown in the issue table.
pub const VALUE_WIDTH: usize = 28;

/// Counts describing one completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub input_rows: usize,
    pub output_rows: usize,
    pub output_columns: usize,
    pub encoding: String,
    pub issue_count: usize,
    pub affected_rows: usize,
    pub issues_by_field: BTreeMap<String, usize>,
}

impl RunSummary {
    pub fn from_output(output: &TransformOutput) -> Self {
        Self {
            input_rows: output.input_rows,
            output_rows: output.table.row_count(),
            output_columns: output.table.column_count(),
            encoding: output.encoding.to_string(),
            issue_count: output.issues.len(),
            affected_rows: output.issues.affected_rows().len(),
            issues_by_field: output
                .issues
                .counts_by_field()
                .into_iter()
                .map(|(field, count)| (field.to_string(), count))
                .collect(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "📊 Summary");
        let _ = writeln!(out, "   Input rows: {} ({})", self.input_rows, self.encoding);
        let _ = writeln!(
            out,
            "   Output: {} rows × {} columns",
            self.output_rows, self.output_columns
        );
        if self.issue_count == 0 {
            let _ = writeln!(out, "   ✅ No validation issues");
        } else {
            let _ = writeln!(
                out,
                "   ⚠️  {} validation issues in {} rows",
                self.issue_count, self.affected_rows
            );
            for (field, count) in &self.issues_by_field {
                let _ = writeln!(out, "      {:<24} {}", field, count);
            }
        }
        out
    }
}

/// Shorten a value to [`VALUE_WIDTH`] characters.
pub fn truncate_value(value: &str) -> String {
    if value.chars().count() <= VALUE_WIDTH {
        value.to_string()
    } else {
        let head: String = value.chars().take(VALUE_WIDTH - 3).collect();
        format!("{}...", head)
    }
}

/// Render issues as a table with 1-based file line numbers.
///
/// At most `limit` issues are listed; the remainder is summarized.
pub fn render_issues(issues: &ErrorLedger, limit: Option<usize>) -> String {
    let mut out = String::new();
    if issues.is_empty() {
        return out;
    }

    let shown = limit.unwrap_or(issues.len()).min(issues.len());
    let _ = writeln!(
        out,
        "{:>6}  {:<20}  {:<width$}  {}",
        "Line",
        "Field",
        "Value",
        "Message",
        width = VALUE_WIDTH
    );
    for issue in issues.iter().take(shown) {
        let _ = writeln!(out, "{}", issue_line(issue));
    }
    if shown < issues.len() {
        let _ = writeln!(out, "   ... and {} more", issues.len() - shown);
    }
    out
}

fn issue_line(issue: &ValidationIssue) -> String {
    format!(
        "{:>6}  {:<20}  {:<width$}  {}",
        issue.line_number(),
        issue.field,
        truncate_value(&issue.value.to_string()),
        issue.message,
        width = VALUE_WIDTH
    )
}

#[derive(Serialize)]
struct IssueReport<'a> {
    summary: &'a RunSummary,
    issues: &'a ErrorLedger,
}

/// Write the summary and every issue to a JSON file.
pub fn write_issue_report(
    summary: &RunSummary,
    issues: &ErrorLedger,
    path: &Path,
) -> PipelineResult<()> {
    let json = serde_json::to_string_pretty(&IssueReport { summary, issues })
        .map_err(|e| PipelineError::Config(format!("cannot serialize report: {}", e)))?;
    std::fs::write(path, json).map_err(|source| {
        PipelineError::Output(TableError::Write {
            path: path.to_path_buf(),
            source,
        })
    })
}
