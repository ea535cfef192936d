//! Structured logging for the speed test client
//!
//! There is no process-wide logger. A [`Logger`] is built per run and handed to
//! the executor and telemetry client; every measurement server owns its own
//! [`DiagnosticLog`], whose captured text is submitted with telemetry.

use crate::error::{AppError, Result};
use crate::models::TestOptions;
use crate::types::TelemetryLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
        }
    }

    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub logger: String,
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
    /// Compact single-line format
    Compact,
}

/// Where formatted entries go
#[derive(Debug, Clone)]
pub enum LogSink {
    /// stdout below Warn, stderr from Warn up
    Console,
    /// Discard everything
    Silent,
    /// Keep formatted lines in memory
    Buffer(Arc<Mutex<Vec<String>>>),
}

/// Logger handle passed explicitly through a run
#[derive(Debug, Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    name: String,
    sink: LogSink,
}

impl Logger {
    /// Create a console logger at Info level
    pub fn new(name: &str) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            format: LogFormat::Console,
            name: name.to_string(),
            sink: LogSink::Console,
        }
    }

    /// Create a logger that discards everything
    pub fn silent() -> Self {
        Self {
            min_level: LogLevel::Error,
            use_color: false,
            format: LogFormat::Compact,
            name: "librespeed".to_string(),
            sink: LogSink::Silent,
        }
    }

    /// Create a logger writing to an in-memory buffer, returning the buffer handle
    pub fn buffered(name: &str, min_level: LogLevel) -> (Self, Arc<Mutex<Vec<String>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let logger = Self {
            min_level,
            use_color: false,
            format: LogFormat::Compact,
            name: name.to_string(),
            sink: LogSink::Buffer(Arc::clone(&buffer)),
        };
        (logger, buffer)
    }

    /// Create a console logger configured from the run options
    pub fn with_options(name: &str, options: &TestOptions) -> Self {
        let min_level = if options.debug || options.verbose {
            LogLevel::Debug
        } else if options.output.format().is_machine_readable() {
            LogLevel::Warn
        } else {
            LogLevel::Info
        };

        Self {
            min_level,
            use_color: options.output.enable_color,
            format: if options.debug { LogFormat::Json } else { LogFormat::Compact },
            name: name.to_string(),
            sink: LogSink::Console,
        }
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        !matches!(self.sink, LogSink::Silent) && level >= self.min_level
    }

    fn write_entry(&self, entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        let output = match self.format {
            LogFormat::Console => self.format_console(&entry),
            LogFormat::Json => self.format_json(&entry),
            LogFormat::Compact => self.format_compact(&entry),
        };

        match &self.sink {
            LogSink::Console => {
                if entry.level >= LogLevel::Warn {
                    let _ = writeln!(io::stderr(), "{}", output);
                } else {
                    let _ = writeln!(io::stdout(), "{}", output);
                }
            }
            LogSink::Buffer(buffer) => {
                if let Ok(mut lines) = buffer.lock() {
                    lines.push(output);
                }
            }
            LogSink::Silent => {}
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if !entry.fields.is_empty() {
            let fields_str: Vec<String> = entry.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            output.push_str(&format!(" {{{}}}", fields_str.join(", ")));
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}", entry.message),
        }
    }

    // Compact entries read like plain CLI output: level marker only for warnings and errors.
    fn format_compact(&self, entry: &LogEntry) -> String {
        match entry.level {
            LogLevel::Warn | LogLevel::Error if self.use_color => format!(
                "{}{}{}: {}",
                entry.level.color_code(),
                entry.level.as_str(),
                LogLevel::reset_code(),
                entry.message
            ),
            LogLevel::Warn | LogLevel::Error => format!("{}: {}", entry.level.as_str(), entry.message),
            _ => entry.message.clone(),
        }
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                fields: BTreeMap::new(),
            },
        }
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
    }

    /// Finalize and write the log entry
    pub fn log(self) {
        self.logger.write_entry(self.entry);
    }
}

/// Per-server diagnostic log captured for telemetry submission
///
/// Lines are recorded according to the telemetry level of the run:
/// `warn` from Basic, `log` from Full and `verbose` only at Debug.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    level: Mutex<TelemetryLevel>,
    entries: Mutex<Vec<String>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_level(&self, level: TelemetryLevel) {
        if let Ok(mut current) = self.level.lock() {
            *current = level;
        }
    }

    pub fn level(&self) -> TelemetryLevel {
        self.level.lock().map(|l| *l).unwrap_or_default()
    }

    pub fn warn(&self, message: &str) {
        self.record(TelemetryLevel::Basic, message);
    }

    pub fn log(&self, message: &str) {
        self.record(TelemetryLevel::Full, message);
    }

    pub fn verbose(&self, message: &str) {
        self.record(TelemetryLevel::Debug, message);
    }

    fn record(&self, required: TelemetryLevel, message: &str) {
        if self.level() < required {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(format!("{}: {}", Utc::now().to_rfc3339(), message));
        }
    }

    /// Captured text, one entry per line
    pub fn render(&self) -> String {
        self.entries
            .lock()
            .map(|entries| entries.join("\n"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_buffered_logger_respects_level() {
        let (logger, buffer) = Logger::buffered("test", LogLevel::Info);
        logger.debug("hidden").log();
        logger.info("Selected server: Example").log();
        logger.error("boom").log();

        let lines = buffer.lock().unwrap().clone();
        assert_eq!(lines, vec!["Selected server: Example".to_string(), "ERROR: boom".to_string()]);
    }

    #[test]
    fn test_silent_logger_never_logs() {
        let logger = Logger::silent();
        assert!(!logger.would_log(LogLevel::Error));
    }

    #[test]
    fn test_json_format_includes_fields() {
        let (mut logger, buffer) = Logger::buffered("exec", LogLevel::Trace);
        logger.set_format(LogFormat::Json);
        logger.info("done").field("servers", 2).log();

        let line = buffer.lock().unwrap()[0].clone();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["message"], "done");
        assert_eq!(value["fields"]["servers"], 2);
        assert_eq!(value["logger"], "exec");
    }

    #[test]
    fn test_options_logger_levels() {
        let mut options = TestOptions::default();
        assert!(Logger::with_options("x", &options).would_log(LogLevel::Info));

        options.output.json = true;
        assert!(!Logger::with_options("x", &options).would_log(LogLevel::Info));

        options.debug = true;
        assert!(Logger::with_options("x", &options).would_log(LogLevel::Debug));
    }

    #[test]
    fn test_verbose_logs_debug_in_compact_format() {
        let options = TestOptions {
            verbose: true,
            ..Default::default()
        };
        let logger = Logger::with_options("x", &options);
        assert!(logger.would_log(LogLevel::Debug));
        assert_eq!(logger.format, LogFormat::Compact);
    }

    #[test]
    fn test_diagnostic_log_disabled_records_nothing() {
        let log = DiagnosticLog::new();
        log.warn("w");
        log.log("l");
        assert_eq!(log.render(), "");
    }

    #[test]
    fn test_diagnostic_log_level_gating() {
        let log = DiagnosticLog::new();
        log.set_level(TelemetryLevel::Full);
        log.warn("warned");
        log.log("logged");
        log.verbose("chatty");

        let text = log.render();
        assert!(text.contains("warned"));
        assert!(text.contains("logged"));
        assert!(!text.contains("chatty"));
        assert_eq!(text.lines().count(), 2);
    }
}
