use serde::Serialize;
use thiserror::Error;

/// Reasons a single payroll file is skipped. None of these stop a batch.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("unreadable file: {0}")]
    Unreadable(String),

    #[error("header row {header_row} is out of range (sheet has {rows} rows)")]
    HeaderRowOutOfRange { header_row: usize, rows: usize },

    #[error("missing columns: need at least {needed}, sheet has {found}")]
    MissingColumns { needed: usize, found: usize },
}

/// A file-level error recorded against the file it came from.
#[derive(Debug, Serialize)]
pub struct FileFailure {
    pub file: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: SheetError,
}

fn serialize_display<S: serde::Serializer>(
    error: &SheetError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
