//! Error handling for the speed test client

use std::fmt;
use thiserror::Error;

/// Phase of the per-server test sequence that produced a hard failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementPhase {
    ResolveUrl,
    IspLookup,
    PingJitter,
    Download,
    Upload,
}

impl MeasurementPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResolveUrl => "server URL resolution",
            Self::IspLookup => "IP info lookup",
            Self::PingJitter => "ping and jitter test",
            Self::Download => "download test",
            Self::Upload => "upload test",
        }
    }
}

impl fmt::Display for MeasurementPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Custom error types for the speed test client
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, JSON, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// A hard failure in one step of a server's test sequence
    #[error("{phase} failed: {message}")]
    Measurement {
        phase: MeasurementPhase,
        message: String,
    },

    /// Telemetry submission errors
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// The telemetry endpoint answered with something other than two tokens
    #[error("server returned invalid response: {0}")]
    InvalidTelemetryResponse(String),

    /// CSV/JSON rendering errors
    #[error("Output error: {0}")]
    Output(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    /// Create a new HTTP request error
    pub fn http_request<S: Into<String>>(message: S) -> Self {
        Self::HttpRequest(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new measurement error for the given phase
    pub fn measurement<S: Into<String>>(phase: MeasurementPhase, message: S) -> Self {
        Self::Measurement {
            phase,
            message: message.into(),
        }
    }

    /// Create a new telemetry error
    pub fn telemetry<S: Into<String>>(message: S) -> Self {
        Self::Telemetry(message.into())
    }

    /// Create a new output error
    pub fn output<S: Into<String>>(message: S) -> Self {
        Self::Output(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Network(_) => "NETWORK",
            Self::HttpRequest(_) => "HTTP",
            Self::Timeout(_) => "TIMEOUT",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Measurement { .. } => "TEST",
            Self::Telemetry(_) | Self::InvalidTelemetryResponse(_) => "TELEMETRY",
            Self::Output(_) => "OUTPUT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Phase of the test sequence this error came from, if any
    pub fn phase(&self) -> Option<MeasurementPhase> {
        match self {
            Self::Measurement { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) | Self::Validation(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.", msg)
            }
            Self::Network(msg) => {
                format!("Network connectivity issue: {}\n\nSuggestion: Check your internet connection and try again.", msg)
            }
            Self::HttpRequest(msg) => {
                format!("HTTP request failed: {}\n\nSuggestion: The speed test server may be down. Try another server with --server.", msg)
            }
            Self::Timeout(msg) => {
                format!("Request timed out: {}\n\nSuggestion: Check your network connection or pick a closer server.", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check the path and permissions of the JSON files you passed.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: Check the format of your server list or telemetry JSON.", msg)
            }
            Self::Measurement { phase, message } => {
                format!("The {} failed: {}\n\nSuggestion: Results from other servers were discarded. Retry, or exclude this server with --exclude.", phase, message)
            }
            Self::Telemetry(msg) | Self::InvalidTelemetryResponse(msg) => {
                format!("Could not share the result: {}\n\nSuggestion: The test results are still valid; check --telemetry-server.", msg)
            }
            Self::Output(msg) => {
                format!("Could not render the report: {}", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Check if error is recoverable (can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::HttpRequest(_) | Self::Timeout(_) | Self::Measurement { .. }
        )
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Network(_) | Self::HttpRequest(_) => 2,
            Self::Timeout(_) => 3,
            Self::Io(_) => 5,
            Self::Measurement { .. } => 6,
            Self::Telemetry(_) | Self::InvalidTelemetryResponse(_) | Self::Output(_) => 7,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Network(_) | Self::HttpRequest(_) | Self::Measurement { .. } => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Telemetry(_) | Self::InvalidTelemetryResponse(_) => {
                    format!("[{}] {}", category.magenta().bold(), message.magenta())
                }
                Self::Io(_) | Self::Output(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<csv::Error> for AppError {
    fn from(error: csv::Error) -> Self {
        Self::output(format!("CSV error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else if error.is_connect() || error.is_request() {
            Self::network(error.to_string())
        } else {
            Self::http_request(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(error: std::net::AddrParseError) -> Self {
        Self::parse(format!("IP address parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Attach a measurement phase to any error on the way out of a capability call
pub trait PhaseContext<T> {
    fn in_phase(self, phase: MeasurementPhase) -> Result<T>;
}

impl<T> PhaseContext<T> for Result<T> {
    fn in_phase(self, phase: MeasurementPhase) -> Result<T> {
        self.map_err(|e| match e {
            already @ AppError::Measurement { .. } => already,
            other => AppError::measurement(phase, other.to_string()),
        })
    }
}

/// Error reporter for structured error logging and user feedback
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose {
            eprintln!();
            eprintln!("{}", error.user_friendly_message());

            if error.is_recoverable() {
                eprintln!();
                if self.use_color {
                    use colored::Colorize;
                    eprintln!("{}", "This error might be temporary. You can try running the command again.".green());
                } else {
                    eprintln!("This error might be temporary. You can try running the command again.");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(AppError::config("x").category(), "CONFIG");
        assert_eq!(AppError::network("x").category(), "NETWORK");
        assert_eq!(AppError::measurement(MeasurementPhase::Download, "x").category(), "TEST");
        assert_eq!(AppError::InvalidTelemetryResponse("x".into()).category(), "TELEMETRY");
    }

    #[test]
    fn test_measurement_error_names_phase() {
        let err = AppError::measurement(MeasurementPhase::Upload, "connection reset");
        assert_eq!(err.to_string(), "upload test failed: connection reset");
        assert_eq!(err.phase(), Some(MeasurementPhase::Upload));
    }

    #[test]
    fn test_invalid_telemetry_response_carries_body() {
        let err = AppError::InvalidTelemetryResponse("onlyonetoken".to_string());
        assert!(err.to_string().contains("onlyonetoken"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::config("x").exit_code(), 1);
        assert_eq!(AppError::network("x").exit_code(), 2);
        assert_eq!(AppError::timeout("x").exit_code(), 3);
        assert_eq!(AppError::measurement(MeasurementPhase::PingJitter, "x").exit_code(), 6);
        assert_eq!(AppError::internal("x").exit_code(), 99);
    }

    #[test]
    fn test_in_phase_wraps_once() {
        let res: Result<()> = Err(AppError::network("refused"));
        let err = res.in_phase(MeasurementPhase::IspLookup).unwrap_err();
        assert_eq!(err.phase(), Some(MeasurementPhase::IspLookup));
        assert!(err.to_string().contains("refused"));

        let res: Result<()> = Err(err);
        let err = res.in_phase(MeasurementPhase::Download).unwrap_err();
        assert_eq!(err.phase(), Some(MeasurementPhase::IspLookup));
    }

    #[test]
    fn test_console_format_without_color() {
        let err = AppError::timeout("5s elapsed");
        assert_eq!(err.format_for_console(false), "[TIMEOUT] Timeout error: 5s elapsed");
    }
}
