mod aggregate;
mod batch;
mod error;
mod fill;
mod headers;
pub mod layout;
pub mod log;
mod terminology;

pub use aggregate::{GroupedTable, aggregate};
pub use batch::{BatchReport, SheetInput, SummaryOutcome, SummaryTable, summarize, summarize_sheet};
pub use error::{FileFailure, SheetError};
pub use fill::{
    AmbiguousRow, CellWrite, FillOutcome, UNMATCHED_SAMPLE, UnmatchedRow, WageValueMap,
    clean_unit, fill,
};
pub use headers::reconstruct;
pub use terminology::normalize;
