use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use payroll_cli::config::RunConfig;
use payroll_cli::export::{FillSummary, RunReport, write_json_to_file};
use payroll_cli::payroll::log::{LogSink, RunLog, Tee, TracingSink};
use payroll_cli::pipeline;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Append the run log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Write a JSON report of the run to this file
    #[arg(long, global = true)]
    json: Option<PathBuf>,

    /// Show debug output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize every payroll workbook under a folder into one summary workbook
    Summarize {
        /// Folder with the payroll .xls/.xlsx files
        input_dir: PathBuf,

        /// Summary workbook path (default: 文件A_汇总结果.xlsx in the input folder)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Fill a template from a summary workbook written by `summarize`
    Fill {
        /// Summary workbook
        summary: PathBuf,

        /// Template workbook to fill
        template: PathBuf,

        /// Filled workbook path (default: timestamped copy next to the template)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Summarize a folder and fill a template in one go
    Run {
        /// Folder with the payroll .xls/.xlsx files
        input_dir: PathBuf,

        /// Template workbook to fill
        template: PathBuf,

        /// Summary workbook path
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Filled workbook path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = RunConfig {
        json_report: cli.json,
        log_file: cli.log_file,
        ..RunConfig::default()
    };

    let mut run_log = RunLog::new();
    let mut console = TracingSink;
    let result = {
        let mut sink = Tee::new(&mut run_log, &mut console);
        execute(cli.command, &mut config, &mut sink)
    };

    if let Some(log_file) = &config.log_file {
        run_log.append_to_file(log_file)?;
    }

    let outcome = result?;
    if let Some(json_path) = &config.json_report {
        let report = RunReport {
            log: run_log.entries(),
            ..outcome.report()
        };
        write_json_to_file(&report, json_path)?;
    }

    Ok(())
}

enum Executed {
    Summarized(pipeline::SummarizeRun),
    Filled {
        template: PathBuf,
        output: PathBuf,
        outcome: payroll_cli::payroll::FillOutcome,
        summarized: Option<pipeline::SummarizeRun>,
    },
    NothingToFill(pipeline::SummarizeRun),
}

impl Executed {
    fn report(&self) -> RunReport<'_> {
        match self {
            Executed::Summarized(run) | Executed::NothingToFill(run) => RunReport {
                batch: Some(&run.report),
                summary_file: run.summary_file.as_ref().map(|p| p.display().to_string()),
                ..RunReport::default()
            },
            Executed::Filled {
                template,
                output,
                outcome,
                summarized,
            } => RunReport {
                batch: summarized.as_ref().map(|run| &run.report),
                summary_file: summarized
                    .as_ref()
                    .and_then(|run| run.summary_file.as_ref())
                    .map(|p| p.display().to_string()),
                fill: Some(FillSummary::new(template, output, outcome)),
                ..RunReport::default()
            },
        }
    }
}

fn execute<S: LogSink>(command: Command, config: &mut RunConfig, sink: &mut S) -> Result<Executed> {
    match command {
        Command::Summarize { input_dir, output } => {
            config.summary_output = output;
            let summary_path = config.summary_path(&input_dir);
            let run = pipeline::summarize_dir(&input_dir, &summary_path, sink)?;

            if run.summary_file.is_none() {
                eprintln!("No usable data found; no summary was written.");
            }
            Ok(Executed::Summarized(run))
        }
        Command::Fill {
            summary,
            template,
            output,
        } => {
            config.template_output = output;
            let output = config.template_output_path(&template);
            let outcome = pipeline::fill_from_summary_file(&summary, &template, &output, sink)?;

            Ok(Executed::Filled {
                template,
                output,
                outcome,
                summarized: None,
            })
        }
        Command::Run {
            input_dir,
            template,
            summary,
            output,
        } => {
            config.summary_output = summary;
            config.template_output = output;
            let summary_path = config.summary_path(&input_dir);
            let run = pipeline::summarize_dir(&input_dir, &summary_path, sink)?;

            let Some(table) = run.report.summary() else {
                eprintln!("No usable data found; the template was not filled.");
                return Ok(Executed::NothingToFill(run));
            };

            let output = config.template_output_path(&template);
            let outcome = pipeline::fill_from_summary(table, &template, &output, sink)?;

            Ok(Executed::Filled {
                template,
                output,
                outcome,
                summarized: Some(run),
            })
        }
    }
}
