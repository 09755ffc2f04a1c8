mod report;
mod summary;

pub use report::{FillSummary, RunReport, serialize_to_json, write_json_to_file};
pub use summary::{read_summary, summary_from_sheet, write_summary};
