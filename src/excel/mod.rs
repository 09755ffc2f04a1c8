use std::path::Path;

mod cell;
pub mod input;
mod sheet;
pub mod template;
mod workbook;

pub use cell::{Cell, CellType, format_number};
pub use sheet::{MergedRange, Sheet};
pub use workbook::open_first_sheet;

pub(crate) fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// A1-style reference for 1-based coordinates, e.g. `(5, 10)` -> `J5`.
pub fn cell_reference(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col;

    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }

    letters.iter().rev().collect::<String>() + &row.to_string()
}
