use indexmap::IndexMap;
use serde::Serialize;

use crate::excel::Sheet;
use crate::payroll::error::SheetError;
use crate::payroll::layout::{BUDGET_UNIT_COLUMN, WAGE_FIRST_COLUMN, WAGE_LAST_COLUMN};

/// Wage totals per budget unit.
///
/// Keys are sorted; `columns` keeps the wage column order of the source sheet
/// and every row carries a value for every column.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GroupedTable {
    /// Header of the budget-unit column, used as the leading header when persisted.
    pub key_label: String,
    pub columns: Vec<String>,
    pub rows: IndexMap<String, IndexMap<String, f64>>,
}

impl GroupedTable {
    pub fn new(key_label: &str, columns: Vec<String>) -> Self {
        Self {
            key_label: key_label.to_string(),
            columns,
            rows: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, unit: &str, column: &str) -> Option<f64> {
        self.rows.get(unit).and_then(|row| row.get(column)).copied()
    }

    /// Adds `value` to the unit's total for `column`, creating either as needed.
    pub fn add(&mut self, unit: &str, column: &str, value: f64) {
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }

        let row = self.rows.entry(unit.to_string()).or_default();
        *row.entry(column.to_string()).or_insert(0.0) += value;
    }

    /// Column-wise sum of `other` into `self`.
    pub fn merge(&mut self, other: &GroupedTable) {
        if self.key_label.is_empty() {
            self.key_label = other.key_label.clone();
        }

        for column in &other.columns {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
            }
        }

        for (unit, values) in &other.rows {
            for (column, value) in values {
                self.add(unit, column, *value);
            }
        }

        self.fill_missing();
    }

    pub fn sort_units(&mut self) {
        self.rows.sort_keys();
    }

    // A unit without a column counts it as zero
    fn fill_missing(&mut self) {
        for row in self.rows.values_mut() {
            for column in &self.columns {
                row.entry(column.clone()).or_insert(0.0);
            }
            let position = |column: &String| {
                self.columns.iter().position(|c| c == column).unwrap_or(usize::MAX)
            };
            row.sort_by(|a, _, b, _| position(a).cmp(&position(b)));
        }
    }
}

/// Groups the data rows below `header_row` by budget unit and sums the wage
/// columns.
///
/// The budget unit is column 2 and the wage figures are columns 17 through 30.
/// Sheets narrower than column 30 contribute whatever wage columns they have.
/// Wage cells that are not numbers count as zero.
pub fn aggregate(
    sheet: &Sheet,
    headers: &[String],
    header_row: usize,
) -> Result<GroupedTable, SheetError> {
    let width = headers.len().min(sheet.max_cols);
    if width < WAGE_FIRST_COLUMN {
        return Err(SheetError::MissingColumns {
            needed: WAGE_FIRST_COLUMN,
            found: width,
        });
    }

    let wage_columns: Vec<usize> = (WAGE_FIRST_COLUMN..=WAGE_LAST_COLUMN.min(width)).collect();
    let key_label = &headers[BUDGET_UNIT_COLUMN - 1];

    let mut columns: Vec<String> = Vec::with_capacity(wage_columns.len());
    for &col in &wage_columns {
        let name = &headers[col - 1];
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }

    let mut table = GroupedTable::new(key_label, columns);

    for row in (header_row + 1)..=sheet.max_rows {
        let Some(cells) = sheet.data.get(row) else {
            continue;
        };

        let key_cell = &cells[BUDGET_UNIT_COLUMN];
        let wage_cells: Vec<_> = wage_columns.iter().map(|&col| &cells[col]).collect();

        // Trailing blank rows of the used range
        if key_cell.is_blank() && wage_cells.iter().all(|c| c.is_blank()) {
            continue;
        }

        let unit = key_cell.trimmed();
        for (&col, cell) in wage_columns.iter().zip(wage_cells) {
            table.add(unit, &headers[col - 1], cell.as_number());
        }
    }

    table.fill_missing();
    table.sort_units();

    Ok(table)
}
