use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::payroll::log::LogEntry;
use crate::payroll::{AmbiguousRow, BatchReport, FillOutcome, UnmatchedRow};

#[derive(Debug, Serialize)]
pub struct FillSummary<'a> {
    pub template: String,
    pub output: String,
    pub matched: usize,
    pub unmatched_total: usize,
    pub unmatched: &'a [UnmatchedRow],
    pub ambiguous: &'a [AmbiguousRow],
}

impl<'a> FillSummary<'a> {
    pub fn new(template: &Path, output: &Path, outcome: &'a FillOutcome) -> Self {
        Self {
            template: template.display().to_string(),
            output: output.display().to_string(),
            matched: outcome.matched,
            unmatched_total: outcome.unmatched_total,
            unmatched: &outcome.unmatched,
            ambiguous: &outcome.ambiguous,
        }
    }
}

/// Everything a run produced, for `--json`.
#[derive(Debug, Default, Serialize)]
pub struct RunReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<&'a BatchReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillSummary<'a>>,
    pub log: &'a [LogEntry],
}

pub fn serialize_to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize data to JSON")
}

pub fn write_json_to_file<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;

    let json_string = serialize_to_json(data)?;

    file.write_all(json_string.as_bytes())
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    Ok(())
}
