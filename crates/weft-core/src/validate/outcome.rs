use crate::model::BulkProductRow;
use crate::parsing::DraftRow;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The row is rejected.
    Error,
    /// The row is accepted with a caveat.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single finding against a source row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Spreadsheet row number (the header is row 1).
    pub row: usize,
    /// Canonical field key, `materialPercentage` for the sum check, or `general`.
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationError {
    pub fn error(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            row,
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            row,
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// A rejected row with whatever could be mapped and every error it raised.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidRow {
    pub row: usize,
    pub data: DraftRow,
    pub errors: Vec<ValidationError>,
}

/// Outcome of validating a batch.
///
/// Every input row lands in exactly one of `valid_rows` / `invalid_rows`,
/// so `valid_count + error_count == total_rows`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True when no row raised an error.
    pub is_valid: bool,
    pub valid_rows: Vec<BulkProductRow>,
    pub invalid_rows: Vec<InvalidRow>,
    /// Warnings for every row, valid or not, ordered by row number.
    pub warnings: Vec<ValidationError>,
    pub total_rows: usize,
    pub valid_count: usize,
    /// Number of rejected rows (not the number of error entries).
    pub error_count: usize,
    pub warning_count: usize,
}

impl ValidationResult {
    /// All error entries across rejected rows, in row order.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.invalid_rows.iter().flat_map(|r| r.errors.iter())
    }
}
