use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::Path;

use payroll_cli::excel::open_first_sheet;
use payroll_cli::export::read_summary;
use payroll_cli::payroll::log::{LogLevel, RunLog};
use payroll_cli::payroll::{SheetError, SummaryOutcome, WageValueMap};
use payroll_cli::pipeline::{fill_from_summary, fill_from_summary_file, summarize_dir};

// Column letters are 0-based indices here: B = 1, Q = 16, R = 17, AD = 29
fn write_payroll(path: &Path, wage_q: &str, wage_r: &str, rows: &[(&str, f64, &str)]) {
    let mut workbook = Workbook::new();
    let merged = Format::new();
    let worksheet = workbook.add_worksheet();

    worksheet.write_string(0, 0, "2024年12月工资表").unwrap();
    worksheet.merge_range(2, 0, 3, 0, "序号", &merged).unwrap();
    worksheet.merge_range(2, 1, 3, 1, "预算单位", &merged).unwrap();
    worksheet.merge_range(2, 16, 2, 17, "应发工资", &merged).unwrap();
    worksheet.write_string(3, 16, wage_q).unwrap();
    worksheet.write_string(3, 17, wage_r).unwrap();
    worksheet.write_string(3, 29, "备注").unwrap();

    for (idx, (unit, q, r)) in rows.iter().enumerate() {
        let row = 4 + idx as u32;
        worksheet.write_number(row, 0, (idx + 1) as f64).unwrap();
        worksheet.write_string(row, 1, *unit).unwrap();
        worksheet.write_number(row, 16, *q).unwrap();
        worksheet.write_string(row, 17, *r).unwrap();
    }

    workbook.save(path).unwrap();
}

fn write_template(path: &Path) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.write_string(0, 0, "单位").unwrap();
    worksheet.write_string(0, 1, "项目").unwrap();
    worksheet.write_string(0, 9, "金额").unwrap();

    worksheet.write_string(1, 0, "财政-局").unwrap();
    worksheet.write_string(1, 1, "2024年基础性绩效工资").unwrap();

    worksheet.write_string(2, 0, "教育局").unwrap();
    worksheet.write_string(2, 1, "住房公积金").unwrap();
    worksheet.write_string(2, 2, "备注保留").unwrap();
    worksheet.write_number(2, 9, 999.0).unwrap();

    worksheet.write_string(3, 0, "教育 局").unwrap();
    worksheet.write_string(3, 1, "基础性绩效").unwrap();

    worksheet.write_string(4, 0, "财政局").unwrap();
    worksheet.write_string(4, 1, "职工基本医疗保险").unwrap();

    workbook.save(path).unwrap();
}

fn target(sheet: &payroll_cli::excel::Sheet, row: usize) -> f64 {
    sheet.cell(row, 10).map_or(f64::NAN, |c| c.as_number())
}

#[test]
fn merged_headers_read_from_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("一月.xlsx");
    write_payroll(&path, "在岗人员绩效工资", "医疗保险", &[("财政局", 1.0, "2")]);

    let sheet = open_first_sheet(&path).unwrap();
    let headers = payroll_cli::payroll::reconstruct(&sheet, 4).unwrap();

    assert_eq!(headers.len(), 30);
    assert_eq!(headers[0], "序号");
    assert_eq!(headers[1], "预算单位");
    assert_eq!(headers[16], "应发工资-在岗人员绩效工资");
    assert_eq!(headers[17], "应发工资-医疗保险");
    assert_eq!(headers[18], "Column19");
    assert_eq!(headers[29], "备注");
}

#[test]
fn folder_to_filled_template() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    fs::create_dir(&input).unwrap();

    write_payroll(
        &input.join("a.xlsx"),
        "在岗人员绩效工资",
        "医疗保险",
        &[("财政局", 100.0, "10"), ("教育局", 40.0, "—"), (" 财政局", 5.0, "")],
    );
    write_payroll(
        &input.join("b.xlsx"),
        "绩效工资类别2",
        "医疗保险",
        &[("财政局", 50.0, "1.5")],
    );
    fs::write(input.join("broken.xlsx"), b"not a workbook").unwrap();
    fs::write(input.join("~$a.xlsx"), b"lock").unwrap();

    let summary_path = dir.path().join("文件A_汇总结果.xlsx");
    let mut log = RunLog::new();
    let run = summarize_dir(&input, &summary_path, &mut log).unwrap();

    assert_eq!(run.report.files_seen, 3);
    assert_eq!(run.report.files_used, 2);
    assert_eq!(run.report.failures.len(), 1);
    assert_eq!(run.report.failures[0].file, "broken.xlsx");
    assert!(matches!(
        run.report.failures[0].error,
        SheetError::Unreadable(_)
    ));
    assert_eq!(run.summary_file.as_deref(), Some(summary_path.as_path()));

    let summary = run.report.summary().unwrap();
    assert_eq!(summary.get("财政局", "应发工资-在岗人员绩效工资"), Some(105.0));
    assert_eq!(summary.get("财政局", "应发工资-绩效工资类别2"), Some(50.0));
    assert_eq!(summary.get("财政局", "应发工资-医疗保险"), Some(11.5));
    assert_eq!(summary.get("教育局", "应发工资-医疗保险"), Some(0.0));

    let values = WageValueMap::from_summary(summary);
    assert_eq!(values.get("财政局", "基础性绩效"), Some(155.0));
    assert_eq!(values.get("教育局", "基础性绩效"), Some(40.0));

    let template_path = dir.path().join("模板.xlsx");
    write_template(&template_path);
    let output_path = dir.path().join("模板_filled.xlsx");
    let outcome = fill_from_summary(summary, &template_path, &output_path, &mut log).unwrap();

    assert_eq!(outcome.matched, 3);
    assert_eq!(outcome.unmatched_total, 1);
    assert_eq!(outcome.unmatched[0].row, 3);

    let filled = open_first_sheet(&output_path).unwrap();
    assert_eq!(target(&filled, 2), 155.0);
    assert_eq!(target(&filled, 3), 999.0);
    assert_eq!(target(&filled, 4), 40.0);
    assert_eq!(target(&filled, 5), 11.5);
    assert_eq!(
        filled.cell(3, 3).map(|c| c.value.as_str()),
        Some("备注保留")
    );
    assert_eq!(filled.cell(1, 10).map(|c| c.value.as_str()), Some("金额"));

    // The upload itself is left alone
    let original = open_first_sheet(&template_path).unwrap();
    assert!(original.cell(2, 10).is_none_or(|c| c.is_blank()));

    assert!(log.count(LogLevel::Error) >= 1);
}

#[test]
fn persisted_summary_is_a_re_entry_point() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    fs::create_dir(&input).unwrap();
    write_payroll(
        &input.join("a.xlsx"),
        "绩效工资",
        "行政医疗",
        &[("财政局", 200.0, "30")],
    );

    let summary_path = input.join("文件A_汇总结果.xlsx");
    let run = summarize_dir(&input, &summary_path, &mut RunLog::new()).unwrap();
    let in_memory = run.report.summary().unwrap();
    assert_eq!(&read_summary(&summary_path).unwrap(), in_memory);

    // A second run over the same folder must not pick up its own output
    let rerun = summarize_dir(&input, &summary_path, &mut RunLog::new()).unwrap();
    assert_eq!(rerun.report.files_seen, 1);

    let template_path = dir.path().join("template.xlsx");
    write_template(&template_path);
    let output_path = dir.path().join("out.xlsx");
    let outcome =
        fill_from_summary_file(&summary_path, &template_path, &output_path, &mut RunLog::new())
            .unwrap();

    assert_eq!(outcome.matched, 1);
    let filled = open_first_sheet(&output_path).unwrap();
    assert_eq!(target(&filled, 2), 200.0);
}

#[test]
fn empty_folder_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let summary_path = dir.path().join("文件A_汇总结果.xlsx");

    let run = summarize_dir(dir.path(), &summary_path, &mut RunLog::new()).unwrap();

    assert!(matches!(run.report.outcome, SummaryOutcome::NoData));
    assert!(run.summary_file.is_none());
    assert!(!summary_path.exists());
}

#[test]
fn unparseable_template_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("template.xlsx");
    fs::write(&template_path, b"plain text").unwrap();
    let output_path = dir.path().join("out.xlsx");

    let mut summary = payroll_cli::payroll::SummaryTable::new("预算单位", Vec::new());
    summary.add("财政局", "绩效工资", 1.0);

    let result = fill_from_summary(&summary, &template_path, &output_path, &mut RunLog::new());

    assert!(result.is_err());
    assert!(!output_path.exists());
}
