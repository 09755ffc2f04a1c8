use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern, glob_with};
use std::path::{Path, PathBuf};

use crate::excel::{open_first_sheet, same_path};
use crate::payroll::SheetInput;

const SPREADSHEET_EXTENSIONS: [&str; 3] = ["xlsx", "xlsm", "xls"];

/// Lists the payroll workbooks under `dir`, recursively and in path order.
///
/// Office lock files (`~$name.xlsx`) and `exclude`, usually the summary
/// written by an earlier run into the same folder, are left out.
pub fn find_workbooks(dir: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/**/*", Pattern::escape(&dir.to_string_lossy()));
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut paths = Vec::new();
    for entry in glob_with(&pattern, options)
        .with_context(|| format!("Invalid input directory: {}", dir.display()))?
    {
        let path = entry.with_context(|| format!("Unable to read directory: {}", dir.display()))?;
        if is_payroll_workbook(&path) && exclude.is_none_or(|ex| !same_path(ex, &path)) {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

fn is_payroll_workbook(path: &Path) -> bool {
    let is_lock_file = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("~$"));

    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.to_lowercase().as_str()));

    path.is_file() && has_extension && !is_lock_file
}

/// Opens each workbook on demand, so only one file handle is alive at a time.
pub fn load_inputs(paths: Vec<PathBuf>) -> impl Iterator<Item = SheetInput> {
    paths.into_iter().map(|path| {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        SheetInput {
            sheet: open_first_sheet(&path),
            name,
        }
    })
}
