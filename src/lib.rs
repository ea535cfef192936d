//! LibreSpeed speed test client
//!
//! Measures latency, jitter, download and upload throughput against one or
//! more LibreSpeed servers, builds one report per server, optionally submits
//! results for a shareable link and renders the reports as text, CSV or JSON.

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod measurement;
pub mod models;
pub mod output;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use executor::{cli_speed_test, speed_test, speed_test_with_logger, RunMode, SpeedTestExecutor};
pub use logging::{DiagnosticLog, Logger};
pub use measurement::{HttpServer, MeasurementServer, TransferOptions};
pub use models::{FlatReport, Report, ServerDefinition, TestOptions};
pub use output::{humanize_mbps, OutputCoordinator, OutputFormatterFactory};
pub use telemetry::TelemetryClient;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// One-line build description for debug output
pub fn build_info() -> String {
    format!(
        "{} v{} ({}, {}, built {})",
        PKG_NAME,
        VERSION,
        option_env!("GIT_COMMIT").unwrap_or("unknown commit"),
        option_env!("TARGET_TRIPLE").unwrap_or("unknown target"),
        option_env!("BUILD_TIME").unwrap_or("unknown time"),
    )
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Latency probes per server
    pub const PING_COUNT: u32 = 10;
    pub const DEFAULT_CONCURRENT: u32 = 3;
    pub const DEFAULT_CHUNKS: u32 = 100;
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(15);
    pub const DEFAULT_UPLOAD_SIZE_KIB: u32 = 1024;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const TELEMETRY_SERVER: &str = "https://librespeed.org";
    pub const TELEMETRY_PATH: &str = "/results/telemetry.php";
    pub const TELEMETRY_SHARE_PATH: &str = "/results/";

    /// Identification sent with every request
    pub const USER_AGENT: &str = concat!("librespeed-rs/", env!("CARGO_PKG_VERSION"));
}
