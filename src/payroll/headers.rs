use crate::excel::Sheet;
use crate::payroll::error::SheetError;

/// Flattens a two-row merged header into one name per column.
///
/// `header_row` is 1-based and names the sub-category row; the row above it
/// holds the categories. Cells inside a merged region read as the region's
/// origin, so a category spanning several columns prefixes each of them.
pub fn reconstruct(sheet: &Sheet, header_row: usize) -> Result<Vec<String>, SheetError> {
    if header_row < 2 || header_row > sheet.max_rows {
        return Err(SheetError::HeaderRowOutOfRange {
            header_row,
            rows: sheet.max_rows,
        });
    }

    let headers = (1..=sheet.max_cols)
        .map(|col| {
            let top = header_part(sheet, header_row - 1, col);
            let bottom = header_part(sheet, header_row, col);

            match (top, bottom) {
                (Some(top), Some(bottom)) if top != bottom => format!("{}-{}", top, bottom),
                (Some(part), _) | (None, Some(part)) => part.to_string(),
                (None, None) => format!("Column{}", col),
            }
        })
        .collect();

    Ok(headers)
}

fn header_part(sheet: &Sheet, row: usize, col: usize) -> Option<&str> {
    sheet
        .resolved(row, col)
        .map(|cell| cell.trimmed())
        .filter(|value| !value.is_empty())
}
