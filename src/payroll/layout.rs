//! Fixed positions in the payroll and template workbooks.
//!
//! These are hard assumptions about the input layout, not something inferred
//! from the sheets. All indices are 1-based, matching spreadsheet numbering.

/// Second physical row of the two-row payroll header.
pub const HEADER_ROW: usize = 4;

/// Column holding the budget unit used as the grouping key.
pub const BUDGET_UNIT_COLUMN: usize = 2;

/// First and last columns holding wage figures.
pub const WAGE_FIRST_COLUMN: usize = 17;
pub const WAGE_LAST_COLUMN: usize = 30;

/// Template rows start after a single header row.
pub const TEMPLATE_FIRST_ROW: usize = 2;
pub const TEMPLATE_UNIT_COLUMN: usize = 1;
pub const TEMPLATE_PROJECT_COLUMN: usize = 2;
pub const TEMPLATE_TARGET_COLUMN: usize = 10;
