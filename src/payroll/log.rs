use chrono::Local;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Where an entry came from: a file, a row of the template, or the run itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LogContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl LogContext {
    pub fn run() -> Self {
        Self::default()
    }

    pub fn file(name: &str) -> Self {
        Self {
            file: Some(name.to_string()),
            row: None,
        }
    }

    pub fn row(row: usize) -> Self {
        Self {
            file: None,
            row: Some(row),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub context: LogContext,
    pub message: String,
}

impl LogEntry {
    /// Single human-readable line, e.g. `[WARN] 工资1.xlsx: missing columns`.
    pub fn render(&self) -> String {
        let level = match self.level {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };

        match (&self.context.file, self.context.row) {
            (Some(file), Some(row)) => format!("[{}] {} row {}: {}", level, file, row, self.message),
            (Some(file), None) => format!("[{}] {}: {}", level, file, self.message),
            (None, Some(row)) => format!("[{}] row {}: {}", level, row, self.message),
            (None, None) => format!("[{}] {}", level, self.message),
        }
    }
}

/// Receiver for the progress and diagnostic lines the pipeline emits.
pub trait LogSink {
    fn record(&mut self, entry: LogEntry);

    fn debug(&mut self, context: LogContext, message: String) {
        self.record(LogEntry {
            level: LogLevel::Debug,
            context,
            message,
        });
    }

    fn info(&mut self, context: LogContext, message: String) {
        self.record(LogEntry {
            level: LogLevel::Info,
            context,
            message,
        });
    }

    fn warn(&mut self, context: LogContext, message: String) {
        self.record(LogEntry {
            level: LogLevel::Warn,
            context,
            message,
        });
    }

    fn error(&mut self, context: LogContext, message: String) {
        self.record(LogEntry {
            level: LogLevel::Error,
            context,
            message,
        });
    }
}

/// Collects entries in arrival order.
#[derive(Clone, Debug, Default)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }

    /// Appends every entry to `path` under a timestamped banner.
    pub fn append_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let banner = format!(
            "{}\n工资表处理日志 - {}\n{}\n",
            "=".repeat(60),
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        file.write_all(banner.as_bytes())?;

        for entry in &self.entries {
            writeln!(file, "{}", entry.render())?;
        }
        writeln!(file)?;

        Ok(())
    }
}

impl LogSink for RunLog {
    fn record(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }
}

/// Forwards entries to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&mut self, entry: LogEntry) {
        let file = entry.context.file.as_deref().unwrap_or("-");
        let row = entry.context.row.unwrap_or_default();

        match entry.level {
            LogLevel::Debug => tracing::debug!(file, row, "{}", entry.message),
            LogLevel::Info => tracing::info!(file, row, "{}", entry.message),
            LogLevel::Warn => tracing::warn!(file, row, "{}", entry.message),
            LogLevel::Error => tracing::error!(file, row, "{}", entry.message),
        }
    }
}

/// Sends each entry to two sinks.
pub struct Tee<'a, A: LogSink, B: LogSink> {
    pub first: &'a mut A,
    pub second: &'a mut B,
}

impl<'a, A: LogSink, B: LogSink> Tee<'a, A, B> {
    pub fn new(first: &'a mut A, second: &'a mut B) -> Self {
        Self { first, second }
    }
}

impl<A: LogSink, B: LogSink> LogSink for Tee<'_, A, B> {
    fn record(&mut self, entry: LogEntry) {
        self.first.record(entry.clone());
        self.second.record(entry);
    }
}
