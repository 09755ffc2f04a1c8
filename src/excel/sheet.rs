use crate::excel::Cell;

/// A merged region in 1-based, inclusive coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergedRange {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

impl MergedRange {
    pub fn new(first_row: usize, first_col: usize, last_row: usize, last_col: usize) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    pub fn origin(&self) -> (usize, usize) {
        (self.first_row, self.first_col)
    }
}

/// In-memory worksheet. `data` is indexed 1-based; row 0 and column 0 are padding.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub name: String,
    pub data: Vec<Vec<Cell>>,
    pub max_rows: usize,
    pub max_cols: usize,
    pub merged: Vec<MergedRange>,
}

impl Sheet {
    pub fn new(name: &str, max_rows: usize, max_cols: usize) -> Self {
        Self {
            name: name.to_string(),
            data: vec![vec![Cell::empty(); max_cols + 1]; max_rows + 1],
            max_rows,
            max_cols,
            merged: Vec::new(),
        }
    }

    /// Builds a sheet from 0-based rows; ragged rows are padded with empty cells.
    pub fn from_rows(name: &str, rows: Vec<Vec<Cell>>) -> Self {
        let max_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut sheet = Self::new(name, rows.len(), max_cols);

        for (row_idx, row) in rows.into_iter().enumerate() {
            for (col_idx, cell) in row.into_iter().enumerate() {
                sheet.data[row_idx + 1][col_idx + 1] = cell;
            }
        }

        sheet
    }

    pub fn with_merged(mut self, merged: Vec<MergedRange>) -> Self {
        self.merged = merged;
        self
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if row == 0 || col == 0 {
            return None;
        }
        self.data.get(row).and_then(|r| r.get(col))
    }

    /// Cell value as seen through merged regions: any position inside a
    /// region yields the region origin's cell.
    pub fn resolved(&self, row: usize, col: usize) -> Option<&Cell> {
        match self.merged.iter().find(|range| range.contains(row, col)) {
            Some(range) => {
                let (origin_row, origin_col) = range.origin();
                self.cell(origin_row, origin_col)
            }
            None => self.cell(row, col),
        }
    }

    pub fn ensure_cell_exists(&mut self, row: usize, col: usize) {
        if row >= self.data.len() {
            let row_len = self.data.first().map_or(col + 1, Vec::len);
            self.data.resize_with(row + 1, || vec![Cell::empty(); row_len]);
            self.max_rows = self.max_rows.max(row);
        }

        if self.data.first().is_some_and(|r| col >= r.len()) {
            for row_data in &mut self.data {
                row_data.resize_with(col + 1, Cell::empty);
            }
            self.max_cols = self.max_cols.max(col);
        }
    }

    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        self.ensure_cell_exists(row, col);
        self.data[row][col] = cell;
    }
}
