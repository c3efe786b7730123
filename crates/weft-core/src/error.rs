use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WeftError {
    #[error("failed to read spreadsheet: {0}")]
    Read(String),

    #[error("malformed input shape: {0}")]
    InvalidShape(String),

    #[error("failed to load factor table from {path}: {reason}")]
    FactorTableLoad { path: PathBuf, reason: String },

    #[error("invalid factor table: {0}")]
    FactorTableInvalid(String),

    #[error("SKU registry unavailable: {0}")]
    SkuRegistry(String),

    #[error("invalid assessment input: {0}")]
    InvalidAssessment(String),

    #[error("{invalid} of {total} rows are invalid")]
    RowsRejected { invalid: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
