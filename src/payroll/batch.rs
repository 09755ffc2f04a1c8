use serde::Serialize;

use crate::excel::Sheet;
use crate::payroll::aggregate::{GroupedTable, aggregate};
use crate::payroll::error::{FileFailure, SheetError};
use crate::payroll::headers::reconstruct;
use crate::payroll::layout::HEADER_ROW;
use crate::payroll::log::{LogContext, LogSink};

/// Grouped totals merged across every file of a batch.
pub type SummaryTable = GroupedTable;

/// One payroll file as handed over by the input provider. Load errors travel
/// with the file so they are reported like any other file-level failure.
pub struct SheetInput {
    pub name: String,
    pub sheet: anyhow::Result<Sheet>,
}

impl SheetInput {
    pub fn loaded(name: &str, sheet: Sheet) -> Self {
        Self {
            name: name.to_string(),
            sheet: Ok(sheet),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", content = "summary", rename_all = "snake_case")]
pub enum SummaryOutcome {
    Data(SummaryTable),
    /// No file produced any grouped rows.
    NoData,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub outcome: SummaryOutcome,
    pub failures: Vec<FileFailure>,
    pub files_seen: usize,
    pub files_used: usize,
}

impl BatchReport {
    pub fn summary(&self) -> Option<&SummaryTable> {
        match &self.outcome {
            SummaryOutcome::Data(table) => Some(table),
            SummaryOutcome::NoData => None,
        }
    }
}

/// Reconstructs headers and aggregates one sheet.
pub fn summarize_sheet(sheet: &Sheet) -> Result<GroupedTable, SheetError> {
    let headers = reconstruct(sheet, HEADER_ROW)?;
    aggregate(sheet, &headers, HEADER_ROW)
}

/// Runs every input through header reconstruction and aggregation and merges
/// the results. A failing file is logged and skipped; it never stops the batch.
pub fn summarize<I, S>(inputs: I, sink: &mut S) -> BatchReport
where
    I: IntoIterator<Item = SheetInput>,
    S: LogSink + ?Sized,
{
    let mut summary = SummaryTable::default();
    let mut failures = Vec::new();
    let mut files_seen = 0;
    let mut files_used = 0;

    for input in inputs {
        files_seen += 1;
        let context = LogContext::file(&input.name);
        sink.info(context.clone(), "processing".to_string());

        let result = input
            .sheet
            .map_err(|e| SheetError::Unreadable(format!("{:#}", e)))
            .and_then(|sheet| summarize_sheet(&sheet));

        match result {
            Ok(table) if table.is_empty() => {
                sink.warn(context, "no data rows below the header".to_string());
            }
            Ok(table) => {
                sink.info(
                    context,
                    format!(
                        "done: {} units, {} wage columns",
                        table.rows.len(),
                        table.columns.len()
                    ),
                );
                summary.merge(&table);
                files_used += 1;
            }
            Err(error) => {
                sink.error(context, error.to_string());
                failures.push(FileFailure {
                    file: input.name,
                    error,
                });
            }
        }
    }

    let outcome = if files_used == 0 {
        sink.error(
            LogContext::run(),
            "no usable data found, check the sheet layout and headers".to_string(),
        );
        SummaryOutcome::NoData
    } else {
        summary.sort_units();
        sink.info(
            LogContext::run(),
            format!(
                "summary complete: {} units from {} of {} files",
                summary.rows.len(),
                files_used,
                files_seen
            ),
        );
        SummaryOutcome::Data(summary)
    };

    BatchReport {
        outcome,
        failures,
        files_seen,
        files_used,
    }
}
