use indexmap::IndexMap;
use serde::Serialize;

use crate::excel::{Cell, Sheet, cell_reference};
use crate::payroll::batch::SummaryTable;
use crate::payroll::layout::{
    TEMPLATE_FIRST_ROW, TEMPLATE_PROJECT_COLUMN, TEMPLATE_TARGET_COLUMN, TEMPLATE_UNIT_COLUMN,
};
use crate::payroll::log::{LogContext, LogSink};
use crate::payroll::terminology::normalize;

/// How many unmatched rows are kept for diagnostics.
pub const UNMATCHED_SAMPLE: usize = 10;

/// Value per (budget unit, canonical wage label), in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WageValueMap {
    entries: IndexMap<(String, String), f64>,
}

impl WageValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes every wage label of the summary. Labels that collapse onto
    /// the same canonical label for a unit are added together.
    pub fn from_summary(summary: &SummaryTable) -> Self {
        let mut map = Self::new();
        for (unit, values) in &summary.rows {
            for (label, value) in values {
                map.add(unit, &normalize(label), *value);
            }
        }
        map
    }

    pub fn add(&mut self, unit: &str, label: &str, value: f64) {
        *self
            .entries
            .entry((unit.trim().to_string(), label.to_string()))
            .or_insert(0.0) += value;
    }

    pub fn get(&self, unit: &str, label: &str) -> Option<f64> {
        self.entries
            .get(&(unit.to_string(), label.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.entries
            .iter()
            .map(|((unit, label), value)| (unit.as_str(), label.as_str(), *value))
    }
}

impl FromIterator<(String, String, f64)> for WageValueMap {
    fn from_iter<T: IntoIterator<Item = (String, String, f64)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (unit, label, value) in iter {
            map.add(&unit, &label, value);
        }
        map
    }
}

/// A value written into the template, 1-based coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellWrite {
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnmatchedRow {
    pub row: usize,
    pub unit: String,
    pub project: String,
}

/// A row more than one candidate matched; the first one was written.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AmbiguousRow {
    pub row: usize,
    pub candidates: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct FillOutcome {
    pub template: Sheet,
    pub writes: Vec<CellWrite>,
    pub matched: usize,
    pub unmatched_total: usize,
    /// The first few unmatched rows.
    pub unmatched: Vec<UnmatchedRow>,
    pub ambiguous: Vec<AmbiguousRow>,
}

struct Candidate<'a> {
    unit: &'a str,
    unit_cleaned: String,
    label: &'a str,
    value: f64,
}

impl Candidate<'_> {
    fn matches(&self, unit_cleaned: &str, project: &str) -> bool {
        if self.unit_cleaned.is_empty() || self.label.is_empty() {
            return false;
        }

        let unit_matches = self.unit_cleaned.contains(unit_cleaned)
            || unit_cleaned.contains(self.unit_cleaned.as_str());

        unit_matches && project.contains(self.label)
    }
}

/// Removes whitespace and hyphens, which template authors sprinkle into unit names.
pub fn clean_unit(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Writes wage values into the template's target column.
///
/// Rows are scanned from the first data row to the last. For each row the
/// candidates are tried in the map's insertion order and the first one whose
/// unit contains, or is contained in, the row's cleaned unit and whose label
/// appears in the project description wins. Later candidates are not
/// considered for the write, but a row with several matches is reported as
/// ambiguous. Rows without a match keep their target cell as is.
pub fn fill<S: LogSink + ?Sized>(
    values: &WageValueMap,
    mut template: Sheet,
    sink: &mut S,
) -> FillOutcome {
    let candidates: Vec<Candidate> = values
        .iter()
        .map(|(unit, label, value)| Candidate {
            unit,
            unit_cleaned: clean_unit(unit),
            label,
            value,
        })
        .collect();

    let mut writes = Vec::new();
    let mut unmatched = Vec::new();
    let mut unmatched_total = 0;
    let mut ambiguous = Vec::new();

    for row in TEMPLATE_FIRST_ROW..=template.max_rows {
        let unit_text = text_at(&template, row, TEMPLATE_UNIT_COLUMN);
        let project = text_at(&template, row, TEMPLATE_PROJECT_COLUMN);
        let unit_cleaned = clean_unit(&unit_text);

        let matching: Vec<&Candidate> = if unit_cleaned.is_empty() {
            Vec::new()
        } else {
            candidates
                .iter()
                .filter(|c| c.matches(&unit_cleaned, &project))
                .collect()
        };

        let Some(first) = matching.first() else {
            unmatched_total += 1;
            sink.info(
                LogContext::row(row),
                format!("no match: unit '{}', project '{}'", unit_text, project),
            );
            if unmatched.len() < UNMATCHED_SAMPLE {
                unmatched.push(UnmatchedRow {
                    row,
                    unit: unit_text,
                    project,
                });
            }
            continue;
        };

        if matching.len() > 1 {
            let names: Vec<(String, String)> = matching
                .iter()
                .map(|c| (c.unit.to_string(), c.label.to_string()))
                .collect();
            sink.warn(
                LogContext::row(row),
                format!(
                    "{} candidates match unit '{}', project '{}'; using {} / {}",
                    names.len(),
                    unit_text,
                    project,
                    first.unit,
                    first.label
                ),
            );
            ambiguous.push(AmbiguousRow {
                row,
                candidates: names,
            });
        }

        template.set_cell(row, TEMPLATE_TARGET_COLUMN, Cell::number(first.value));
        writes.push(CellWrite {
            row,
            col: TEMPLATE_TARGET_COLUMN,
            value: first.value,
        });
        sink.info(
            LogContext::row(row),
            format!(
                "matched {} / {} -> {} = {}",
                first.unit,
                first.label,
                cell_reference(row, TEMPLATE_TARGET_COLUMN),
                first.value
            ),
        );
    }

    sink.info(
        LogContext::run(),
        format!(
            "template filled: {} rows matched, {} rows unmatched",
            writes.len(),
            unmatched_total
        ),
    );

    FillOutcome {
        template,
        matched: writes.len(),
        writes,
        unmatched_total,
        unmatched,
        ambiguous,
    }
}

fn text_at(sheet: &Sheet, row: usize, col: usize) -> String {
    sheet
        .cell(row, col)
        .map(|cell| cell.trimmed().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::aggregate::GroupedTable;
    use crate::payroll::log::{LogLevel, RunLog};

    fn template(rows: &[(&str, &str)]) -> Sheet {
        let mut all = vec![vec![
            Cell::text("单位"),
            Cell::text("项目"),
            Cell::empty(),
            Cell::empty(),
            Cell::empty(),
            Cell::empty(),
            Cell::empty(),
            Cell::empty(),
            Cell::empty(),
            Cell::text("金额"),
        ]];
        for (unit, project) in rows {
            all.push(vec![Cell::text(*unit), Cell::text(*project)]);
        }
        Sheet::from_rows("Sheet1", all)
    }

    fn target(sheet: &Sheet, row: usize) -> Option<&Cell> {
        sheet.cell(row, TEMPLATE_TARGET_COLUMN)
    }

    #[test]
    fn hyphenated_unit_and_longer_project_text_match() {
        let values: WageValueMap =
            [("财政局".to_string(), "基础性绩效".to_string(), 200.0)].into_iter().collect();
        let sheet = template(&[("财政-局", "2024年基础性绩效工资")]);

        let outcome = fill(&values, sheet, &mut RunLog::new());

        assert_eq!(outcome.matched, 1);
        assert_eq!(target(&outcome.template, 2).map(Cell::as_number), Some(200.0));
        assert_eq!(
            outcome.writes,
            vec![CellWrite {
                row: 2,
                col: 10,
                value: 200.0
            }]
        );
    }

    #[test]
    fn unit_containment_is_symmetric() {
        let values: WageValueMap = [
            ("市财政局机关".to_string(), "基本医疗".to_string(), 1.0),
            ("教育".to_string(), "基本医疗".to_string(), 2.0),
        ]
        .into_iter()
        .collect();
        let sheet = template(&[("财政局", "基本医疗保险"), ("市 教育局", "基本医疗保险")]);

        let outcome = fill(&values, sheet, &mut RunLog::new());

        assert_eq!(target(&outcome.template, 2).map(Cell::as_number), Some(1.0));
        assert_eq!(target(&outcome.template, 3).map(Cell::as_number), Some(2.0));
    }

    #[test]
    fn unmatched_row_keeps_its_target() {
        let values: WageValueMap =
            [("财政局".to_string(), "基础性绩效".to_string(), 200.0)].into_iter().collect();
        let mut sheet = template(&[("财政局", "住房公积金"), ("", "基础性绩效")]);
        sheet.set_cell(2, TEMPLATE_TARGET_COLUMN, Cell::text("原值"));
        let mut log = RunLog::new();

        let outcome = fill(&values, sheet, &mut log);

        assert_eq!(outcome.matched, 0);
        assert_eq!(outcome.unmatched_total, 2);
        assert_eq!(
            target(&outcome.template, 2).map(|c| c.value.as_str()),
            Some("原值")
        );
        assert!(target(&outcome.template, 3).is_some_and(Cell::is_blank));
        assert_eq!(outcome.unmatched[0].project, "住房公积金");
        assert_eq!(log.count(LogLevel::Error), 0);
    }

    #[test]
    fn ambiguous_row_takes_first_in_insertion_order() {
        let values: WageValueMap = [
            ("财政局".to_string(), "基础性绩效".to_string(), 10.0),
            ("财政".to_string(), "基础性绩效".to_string(), 20.0),
            ("财政局".to_string(), "基本医疗".to_string(), 30.0),
        ]
        .into_iter()
        .collect();
        let sheet = template(&[("财政局", "基础性绩效及基本医疗")]);
        let mut log = RunLog::new();

        let outcome = fill(&values, sheet, &mut log);

        assert_eq!(target(&outcome.template, 2).map(Cell::as_number), Some(10.0));
        assert_eq!(outcome.ambiguous.len(), 1);
        assert_eq!(outcome.ambiguous[0].candidates.len(), 3);
        assert_eq!(log.count(LogLevel::Warn), 1);
    }

    #[test]
    fn header_row_is_never_written() {
        let values: WageValueMap =
            [("单位".to_string(), "项目".to_string(), 5.0)].into_iter().collect();
        let sheet = template(&[]);

        let outcome = fill(&values, sheet, &mut RunLog::new());

        assert_eq!(outcome.matched, 0);
        assert_eq!(
            target(&outcome.template, 1).map(|c| c.value.as_str()),
            Some("金额")
        );
    }

    #[test]
    fn summary_labels_are_normalized_and_summed() {
        let mut summary = GroupedTable::new("预算单位", Vec::new());
        summary.add("财政局", "在岗人员绩效工资", 100.0);
        summary.add("财政局", "绩效工资类别2", 50.0);
        summary.add("财政局", "医疗保险", 8.0);

        let values = WageValueMap::from_summary(&summary);

        assert_eq!(values.len(), 2);
        assert_eq!(values.get("财政局", "基础性绩效"), Some(150.0));
        assert_eq!(values.get("财政局", "基本医疗"), Some(8.0));
    }
}
