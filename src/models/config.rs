//! Test options data model and validation

use crate::models::telemetry::TelemetryServer;
use crate::types::{AppError, DistanceUnit, NetworkFamily, OutputFormat, Result, TelemetryLevel};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Output selection and rendering options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputOptions {
    /// Emit headerless CSV rows
    #[serde(default)]
    pub csv: bool,

    /// Emit a JSON array of reports
    #[serde(default)]
    pub json: bool,

    /// Emit the compact per-server text block
    #[serde(default)]
    pub simple: bool,

    /// Field delimiter for CSV output
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: u8,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            csv: false,
            json: false,
            simple: false,
            csv_delimiter: default_csv_delimiter(),
            enable_color: default_enable_color(),
        }
    }
}

impl OutputOptions {
    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_flags(self.csv, self.json, self.simple)
    }
}

/// Options for one speed test run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOptions {
    /// Skip the download test
    #[serde(default)]
    pub no_download: bool,

    /// Skip the upload test
    #[serde(default)]
    pub no_upload: bool,

    /// Display byte rates instead of bit rates
    #[serde(default)]
    pub bytes: bool,

    /// Use 1024 instead of 1000 as the unit base
    #[serde(default)]
    pub binary_base: bool,

    /// Parallel connections per transfer test
    #[serde(default = "default_concurrent")]
    pub concurrent: u32,

    /// Chunks requested per download stream
    #[serde(default = "default_chunks")]
    pub chunks: u32,

    /// Upper bound for each transfer test, in seconds
    #[serde(default = "default_duration_secs")]
    pub duration_seconds: u64,

    /// Size of the upload payload in KiB
    #[serde(default = "default_upload_size")]
    pub upload_size_kib: u32,

    /// Regenerate the upload payload per request instead of allocating it once
    #[serde(default)]
    pub no_pre_allocate: bool,

    /// Local address measurement connections bind to
    #[serde(default)]
    pub source_ip: Option<IpAddr>,

    /// Forced IP family
    #[serde(default)]
    pub network: NetworkFamily,

    /// Distance unit for the ISP lookup
    #[serde(default)]
    pub distance_unit: DistanceUnit,

    /// Telemetry target and opt-in level
    #[serde(default)]
    pub telemetry_server: TelemetryServer,

    /// Caller metadata attached to telemetry submissions
    #[serde(default)]
    pub telemetry_extra: serde_json::Value,

    /// Output selection
    #[serde(default)]
    pub output: OutputOptions,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            no_download: false,
            no_upload: false,
            bytes: false,
            binary_base: false,
            concurrent: default_concurrent(),
            chunks: default_chunks(),
            duration_seconds: default_duration_secs(),
            upload_size_kib: default_upload_size(),
            no_pre_allocate: false,
            source_ip: None,
            network: NetworkFamily::Auto,
            distance_unit: DistanceUnit::Kilometers,
            telemetry_server: TelemetryServer::default(),
            telemetry_extra: serde_json::Value::Null,
            output: OutputOptions::default(),
            verbose: false,
            debug: false,
        }
    }
}

impl TestOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Transfer duration bound as Duration
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }

    pub fn telemetry_level(&self) -> TelemetryLevel {
        self.telemetry_server.level()
    }

    /// Validate the options and return the first hard error
    pub fn validate(&self) -> Result<()> {
        if self.concurrent == 0 || self.concurrent > 32 {
            return Err(AppError::config(format!(
                "Concurrent connections must be between 1 and 32, got: {}",
                self.concurrent
            )));
        }

        if self.chunks == 0 || self.chunks > 1024 {
            return Err(AppError::config(format!(
                "Chunks must be between 1 and 1024, got: {}",
                self.chunks
            )));
        }

        if self.duration_seconds == 0 {
            return Err(AppError::config("Duration must be greater than 0"));
        }

        if self.duration_seconds > 120 {
            return Err(AppError::config("Duration cannot exceed 120 seconds"));
        }

        if self.upload_size_kib == 0 {
            return Err(AppError::config("Upload size must be greater than 0"));
        }

        if let Some(ip) = self.source_ip {
            match (self.network, ip) {
                (NetworkFamily::Ipv4, IpAddr::V6(_)) => {
                    return Err(AppError::config(format!(
                        "Source address {} is IPv6 but IPv4 was forced",
                        ip
                    )));
                }
                (NetworkFamily::Ipv6, IpAddr::V4(_)) => {
                    return Err(AppError::config(format!(
                        "Source address {} is IPv4 but IPv6 was forced",
                        ip
                    )));
                }
                _ => {}
            }
        }

        if self.telemetry_level().is_enabled() {
            self.telemetry_server.endpoint_url()?;
            self.telemetry_server.share_url()?;
        }

        if !self.output.csv_delimiter.is_ascii() {
            return Err(AppError::config("CSV delimiter must be a single ASCII character"));
        }

        Ok(())
    }

    /// Merge environment variables into these options
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(concurrent) = std::env::var("LIBRESPEED_CONCURRENT") {
            self.concurrent = concurrent.parse().map_err(|e| {
                AppError::config(format!("Invalid LIBRESPEED_CONCURRENT value '{}': {}", concurrent, e))
            })?;
        }

        if let Ok(chunks) = std::env::var("LIBRESPEED_CHUNKS") {
            self.chunks = chunks.parse().map_err(|e| {
                AppError::config(format!("Invalid LIBRESPEED_CHUNKS value '{}': {}", chunks, e))
            })?;
        }

        if let Ok(duration) = std::env::var("LIBRESPEED_DURATION") {
            self.duration_seconds = duration.parse().map_err(|e| {
                AppError::config(format!("Invalid LIBRESPEED_DURATION value '{}': {}", duration, e))
            })?;
        }

        if let Ok(size) = std::env::var("LIBRESPEED_UPLOAD_SIZE") {
            self.upload_size_kib = size.parse().map_err(|e| {
                AppError::config(format!("Invalid LIBRESPEED_UPLOAD_SIZE value '{}': {}", size, e))
            })?;
        }

        if let Ok(server) = std::env::var("LIBRESPEED_TELEMETRY_SERVER") {
            if !server.trim().is_empty() {
                self.telemetry_server.server = server.trim().to_string();
            }
        }

        if let Ok(level) = std::env::var("LIBRESPEED_TELEMETRY_LEVEL") {
            self.telemetry_server.level = level.parse()?;
        }

        if let Ok(enable_color) = std::env::var("LIBRESPEED_ENABLE_COLOR") {
            self.output.enable_color = enable_color.parse().map_err(|e| {
                AppError::config(format!("Invalid LIBRESPEED_ENABLE_COLOR value '{}': {}", enable_color, e))
            })?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_concurrent() -> u32 {
    crate::defaults::DEFAULT_CONCURRENT
}

fn default_chunks() -> u32 {
    crate::defaults::DEFAULT_CHUNKS
}

fn default_duration_secs() -> u64 {
    crate::defaults::DEFAULT_DURATION.as_secs()
}

fn default_upload_size() -> u32 {
    crate::defaults::DEFAULT_UPLOAD_SIZE_KIB
}

fn default_csv_delimiter() -> u8 {
    b','
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
