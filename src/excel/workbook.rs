use anyhow::{Context, Result};
use calamine::{Data, Dimensions, Range, Reader, Xls, Xlsx, open_workbook_auto};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::excel::{Cell, CellType, MergedRange, Sheet, format_number};

enum CalamineWorkbook {
    Xlsx(Xlsx<BufReader<File>>),
    Xls(Xls<BufReader<File>>),
}

/// Loads the first worksheet of a workbook, merged regions included when the
/// format exposes them.
///
/// The workbook handle lives only for the duration of this call.
pub fn open_first_sheet<P: AsRef<Path>>(path: P) -> Result<Sheet> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    let extension = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    let calamine_workbook = match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => {
            let file = File::open(path_ref)
                .with_context(|| format!("Unable to open Excel file: {}", path_str))?;
            let xlsx = Xlsx::new(BufReader::new(file))
                .with_context(|| format!("Unable to parse Excel file: {}", path_str))?;
            Some(CalamineWorkbook::Xlsx(xlsx))
        }
        Some("xls") => {
            let file = File::open(path_ref)
                .with_context(|| format!("Unable to open Excel file: {}", path_str))?;
            let xls = Xls::new(BufReader::new(file))
                .with_context(|| format!("Unable to parse Excel file: {}", path_str))?;
            Some(CalamineWorkbook::Xls(xls))
        }
        _ => None,
    };

    match calamine_workbook {
        Some(CalamineWorkbook::Xlsx(mut xlsx)) => {
            xlsx.load_merged_regions()
                .with_context(|| format!("Unable to read merged cells: {}", path_str))?;
            let name = first_sheet_name(xlsx.sheet_names(), &path_str)?;
            let range = xlsx
                .worksheet_range(&name)
                .with_context(|| format!("Unable to read worksheet: {}", name))?;
            let merged = xlsx
                .worksheet_merge_cells(&name)
                .unwrap_or(Ok(Vec::new()))
                .with_context(|| format!("Unable to read merged cells of worksheet: {}", name))?;
            Ok(create_sheet_from_range(&name, &range, &merged))
        }
        Some(CalamineWorkbook::Xls(mut xls)) => {
            let name = first_sheet_name(xls.sheet_names(), &path_str)?;
            let range = xls
                .worksheet_range(&name)
                .with_context(|| format!("Unable to read worksheet: {}", name))?;
            let merged = xls.worksheet_merge_cells(&name).unwrap_or_default();
            Ok(create_sheet_from_range(&name, &range, &merged))
        }
        None => {
            // Other formats (ods, xlsb) carry no merge information through calamine
            let mut workbook = open_workbook_auto(path_ref)
                .with_context(|| format!("Unable to parse Excel file: {}", path_str))?;
            let name = first_sheet_name(workbook.sheet_names(), &path_str)?;
            let range = workbook
                .worksheet_range(&name)
                .with_context(|| format!("Unable to read worksheet: {}", name))?;
            Ok(create_sheet_from_range(&name, &range, &[]))
        }
    }
}

fn first_sheet_name(names: Vec<String>, path_str: &str) -> Result<String> {
    names
        .into_iter()
        .next()
        .with_context(|| format!("No worksheets found in file: {}", path_str))
}

fn create_sheet_from_range(name: &str, range: &Range<Data>, merged: &[Dimensions]) -> Sheet {
    // Range coordinates are relative to the first used cell; the sheet keeps absolute ones
    let (start_row, start_col) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));
    let (end_row, end_col) = range
        .end()
        .map_or((0, 0), |(r, c)| (r as usize + 1, c as usize + 1));

    let merged: Vec<MergedRange> = merged
        .iter()
        .map(|dim| {
            MergedRange::new(
                dim.start.0 as usize + 1,
                dim.start.1 as usize + 1,
                dim.end.0 as usize + 1,
                dim.end.1 as usize + 1,
            )
        })
        .collect();

    // Merged regions can extend past the last used cell
    let max_rows = merged.iter().map(|m| m.last_row).fold(end_row, usize::max);
    let max_cols = merged.iter().map(|m| m.last_col).fold(end_col, usize::max);

    let mut sheet = Sheet::new(name, max_rows, max_cols);

    for (row_idx, col_idx, cell) in range.used_cells() {
        sheet.data[start_row + row_idx + 1][start_col + col_idx + 1] = convert_cell(cell);
    }

    sheet.with_merged(merged)
}

fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::empty(),
        Data::String(s) => Cell::text(s.clone()),
        Data::Float(f) => Cell::new_with_type(format_number(*f), CellType::Number, Some(*f)),
        Data::Int(i) => Cell::new_with_type(i.to_string(), CellType::Number, Some(*i as f64)),
        Data::Bool(b) => Cell::new_with_type(
            if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellType::Boolean,
            None,
        ),
        Data::Error(e) => Cell::new_with_type(format!("Error: {:?}", e), CellType::Text, None),
        Data::DateTime(dt) => Cell::new_with_type(dt.to_string(), CellType::Date, None),
        Data::DateTimeIso(s) => Cell::new_with_type(s.clone(), CellType::Date, None),
        Data::DurationIso(s) => Cell::new_with_type(s.clone(), CellType::Text, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_data_keeps_its_value() {
        let cell = convert_cell(&Data::Float(1200.0));
        assert_eq!(cell.value, "1200");
        assert_eq!(cell.number, Some(1200.0));

        let cell = convert_cell(&Data::Int(7));
        assert_eq!(cell.as_number(), 7.0);
    }

    #[test]
    fn text_data_stays_text() {
        let cell = convert_cell(&Data::String("财政局".to_string()));
        assert_eq!(cell.cell_type, CellType::Text);
        assert_eq!(cell.as_number(), 0.0);
    }
}
