use std::path::{Path, PathBuf};

use crate::excel::template::default_output_path;

/// File name of the persisted summary ("File A").
pub const DEFAULT_SUMMARY_FILE: &str = "文件A_汇总结果.xlsx";

/// Where a run reads from and writes to.
#[derive(Clone, Debug, Default)]
pub struct RunConfig {
    /// Summary workbook; defaults to [`DEFAULT_SUMMARY_FILE`] inside the input folder.
    pub summary_output: Option<PathBuf>,
    /// Filled template; defaults to a timestamped name next to the template.
    pub template_output: Option<PathBuf>,
    /// Run report as JSON.
    pub json_report: Option<PathBuf>,
    /// Append-only run log.
    pub log_file: Option<PathBuf>,
}

impl RunConfig {
    pub fn summary_path(&self, input_dir: &Path) -> PathBuf {
        self.summary_output
            .clone()
            .unwrap_or_else(|| input_dir.join(DEFAULT_SUMMARY_FILE))
    }

    pub fn template_output_path(&self, template: &Path) -> PathBuf {
        self.template_output
            .clone()
            .unwrap_or_else(|| default_output_path(template))
    }
}
