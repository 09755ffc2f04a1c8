use anyhow::{Context, Result, anyhow};
use chrono::Local;
use std::path::{Path, PathBuf};
use umya_spreadsheet::Spreadsheet;

use crate::excel::{Cell, Sheet, same_path};
use crate::payroll::CellWrite;

const TEMPLATE_SHEET: usize = 0;

/// The template workbook, loaded whole so that cells the filler does not
/// touch, styles included, are written back unchanged.
pub struct TemplateWorkbook {
    book: Spreadsheet,
    file_path: PathBuf,
}

impl TemplateWorkbook {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let book = umya_spreadsheet::reader::xlsx::read(path)
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("Unable to parse template: {}", path.display()))?;

        if book.get_sheet(&TEMPLATE_SHEET).is_none() {
            anyhow::bail!("No worksheets found in template: {}", path.display());
        }

        Ok(Self {
            book,
            file_path: path.to_path_buf(),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Cell values of the first worksheet as an in-memory sheet.
    pub fn to_sheet(&self) -> Result<Sheet> {
        let worksheet = self
            .book
            .get_sheet(&TEMPLATE_SHEET)
            .context("Template worksheet disappeared")?;

        let max_rows = worksheet.get_highest_row() as usize;
        let max_cols = worksheet.get_highest_column() as usize;
        let mut sheet = Sheet::new(worksheet.get_name(), max_rows, max_cols);

        for row in 1..=max_rows {
            for col in 1..=max_cols {
                let value = worksheet.get_value((col as u32, row as u32));
                if !value.is_empty() {
                    sheet.data[row][col] = Cell::text(value);
                }
            }
        }

        Ok(sheet)
    }

    pub fn apply(&mut self, writes: &[CellWrite]) -> Result<()> {
        let worksheet = self
            .book
            .get_sheet_mut(&TEMPLATE_SHEET)
            .context("Template worksheet disappeared")?;

        for write in writes {
            worksheet
                .get_cell_mut((write.col as u32, write.row as u32))
                .set_value_number(write.value);
        }

        Ok(())
    }

    /// Saves to `path`; the template the workbook was read from is never overwritten.
    pub fn save(&self, path: &Path) -> Result<()> {
        if same_path(path, &self.file_path) {
            anyhow::bail!(
                "Refusing to overwrite the template: {}",
                self.file_path.display()
            );
        }

        umya_spreadsheet::writer::xlsx::write(&self.book, path)
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("Unable to write filled template: {}", path.display()))
    }
}

/// `<stem>_filled_<timestamp>.xlsx` next to the template.
pub fn default_output_path(template: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let file_stem = template
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("template");
    let parent_dir = template.parent().unwrap_or_else(|| Path::new(""));

    parent_dir.join(format!("{}_filled_{}.xlsx", file_stem, timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_keeps_stem_and_folder() {
        let out = default_output_path(Path::new("/data/模板.xlsx"));
        let name = out.file_name().unwrap().to_string_lossy().to_string();

        assert_eq!(out.parent(), Some(Path::new("/data")));
        assert!(name.starts_with("模板_filled_"));
        assert!(name.ends_with(".xlsx"));
    }

    #[test]
    fn garbage_template_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.xlsx");
        std::fs::write(&path, b"definitely not xlsx").unwrap();

        assert!(TemplateWorkbook::open(&path).is_err());
    }
}
