//! The two phases wired to files: summarize a folder of payroll workbooks into
//! "File A", and fill a template from a summary.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::excel::input::{find_workbooks, load_inputs};
use crate::excel::template::TemplateWorkbook;
use crate::export::{read_summary, write_summary};
use crate::payroll::log::{LogContext, LogSink};
use crate::payroll::{BatchReport, FillOutcome, SummaryOutcome, SummaryTable, WageValueMap};
use crate::payroll::{fill, summarize};

pub struct SummarizeRun {
    pub report: BatchReport,
    /// Set when a summary was produced and written.
    pub summary_file: Option<PathBuf>,
}

/// Phase 1. A folder without usable data is not an error; the report says `NoData`
/// and nothing is written.
pub fn summarize_dir<S: LogSink + ?Sized>(
    input_dir: &Path,
    summary_path: &Path,
    sink: &mut S,
) -> Result<SummarizeRun> {
    let paths = find_workbooks(input_dir, Some(summary_path))?;
    sink.info(
        LogContext::run(),
        format!("found {} workbooks in {}", paths.len(), input_dir.display()),
    );

    let report = summarize(load_inputs(paths), sink);

    let summary_file = match &report.outcome {
        SummaryOutcome::Data(summary) => {
            write_summary(summary, summary_path)?;
            sink.info(
                LogContext::run(),
                format!("summary saved to {}", summary_path.display()),
            );
            Some(summary_path.to_path_buf())
        }
        SummaryOutcome::NoData => None,
    };

    Ok(SummarizeRun {
        report,
        summary_file,
    })
}

/// Phase 2 from an in-memory summary.
pub fn fill_from_summary<S: LogSink + ?Sized>(
    summary: &SummaryTable,
    template_path: &Path,
    output_path: &Path,
    sink: &mut S,
) -> Result<FillOutcome> {
    let values = WageValueMap::from_summary(summary);
    sink.info(
        LogContext::run(),
        format!(
            "{} (unit, category) values from {} units",
            values.len(),
            summary.rows.len()
        ),
    );
    fill_template(&values, template_path, output_path, sink)
}

/// Phase 2 from a summary file written by an earlier run.
pub fn fill_from_summary_file<S: LogSink + ?Sized>(
    summary_path: &Path,
    template_path: &Path,
    output_path: &Path,
    sink: &mut S,
) -> Result<FillOutcome> {
    let summary = read_summary(summary_path)?;
    fill_from_summary(&summary, template_path, output_path, sink)
}

/// Fills the template and saves it to `output_path`. An unparseable template
/// fails the whole operation before anything is written.
pub fn fill_template<S: LogSink + ?Sized>(
    values: &WageValueMap,
    template_path: &Path,
    output_path: &Path,
    sink: &mut S,
) -> Result<FillOutcome> {
    let mut template = TemplateWorkbook::open(template_path)?;
    let sheet = template.to_sheet()?;

    let outcome = fill(values, sheet, sink);

    template.apply(&outcome.writes)?;
    template.save(output_path)?;
    sink.info(
        LogContext::run(),
        format!(
            "filled {} saved to {}",
            template.file_path().display(),
            output_path.display()
        ),
    );

    Ok(outcome)
}
