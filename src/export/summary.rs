use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use std::path::Path;

use crate::excel::{Sheet, open_first_sheet};
use crate::payroll::SummaryTable;

const SUMMARY_SHEET_NAME: &str = "汇总";

/// Writes the summary as a table: budget unit in column A, one column per
/// wage category, header in row 1.
pub fn write_summary(summary: &SummaryTable, path: &Path) -> Result<()> {
    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();
    let number_format = Format::new().set_num_format("General");

    let worksheet = workbook.add_worksheet().set_name(SUMMARY_SHEET_NAME)?;

    worksheet.write_string_with_format(0, 0, &summary.key_label, &header_format)?;
    worksheet.set_column_width(0, 30)?;
    for (idx, column) in summary.columns.iter().enumerate() {
        let col_idx = (idx + 1) as u16;
        worksheet.write_string_with_format(0, col_idx, column, &header_format)?;
        worksheet.set_column_width(col_idx, 15)?;
    }

    for (row_idx, (unit, values)) in summary.rows.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        worksheet.write_string(row, 0, unit)?;

        for (idx, column) in summary.columns.iter().enumerate() {
            let value = values.get(column).copied().unwrap_or(0.0);
            worksheet.write_number_with_format(row, (idx + 1) as u16, value, &number_format)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write summary: {}", path.display()))?;

    Ok(())
}

/// Reads a summary written by [`write_summary`] back into a table.
pub fn read_summary(path: &Path) -> Result<SummaryTable> {
    let sheet = open_first_sheet(path)?;
    Ok(summary_from_sheet(&sheet))
}

/// Row 1 holds the key label and wage names; each following row a unit.
pub fn summary_from_sheet(sheet: &Sheet) -> SummaryTable {
    let header = |col: usize| {
        sheet
            .cell(1, col)
            .map(|c| c.trimmed().to_string())
            .unwrap_or_default()
    };

    let columns: Vec<String> = (2..=sheet.max_cols).map(header).collect();
    let mut summary = SummaryTable::new(&header(1), Vec::new());
    for column in &columns {
        if !summary.columns.contains(column) {
            summary.columns.push(column.clone());
        }
    }

    for row in 2..=sheet.max_rows {
        let Some(key) = sheet.cell(row, 1) else {
            continue;
        };

        let unit = key.trimmed();
        for (idx, column) in columns.iter().enumerate() {
            let value = sheet.cell(row, idx + 2).map_or(0.0, |c| c.as_number());
            summary.add(unit, column, value);
        }
    }

    summary
}
