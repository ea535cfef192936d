//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::types::TelemetryLevel;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env from the current directory if present; returns whether a file was loaded
    pub fn load_env_file() -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"))
    }

    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;
        Ok(true)
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "LIBRESPEED_SERVER_JSON" => {
                if value.trim().is_empty() {
                    return Err(AppError::config("LIBRESPEED_SERVER_JSON must not be empty"));
                }
            }
            "LIBRESPEED_CONCURRENT" => {
                let n: u32 = value.parse().map_err(|e| {
                    AppError::config(format!("Invalid LIBRESPEED_CONCURRENT value '{}': {}", value, e))
                })?;
                if n == 0 || n > 32 {
                    return Err(AppError::config(format!(
                        "LIBRESPEED_CONCURRENT must be between 1 and 32, got: {}",
                        n
                    )));
                }
            }
            "LIBRESPEED_CHUNKS" => {
                let n: u32 = value.parse().map_err(|e| {
                    AppError::config(format!("Invalid LIBRESPEED_CHUNKS value '{}': {}", value, e))
                })?;
                if n == 0 || n > 1024 {
                    return Err(AppError::config(format!(
                        "LIBRESPEED_CHUNKS must be between 1 and 1024, got: {}",
                        n
                    )));
                }
            }
            "LIBRESPEED_DURATION" => {
                let secs: u64 = value.parse().map_err(|e| {
                    AppError::config(format!("Invalid LIBRESPEED_DURATION value '{}': {}", value, e))
                })?;
                if secs == 0 || secs > 120 {
                    return Err(AppError::config(format!(
                        "LIBRESPEED_DURATION must be between 1 and 120, got: {}",
                        secs
                    )));
                }
            }
            "LIBRESPEED_UPLOAD_SIZE" => {
                let kib: u32 = value.parse().map_err(|e| {
                    AppError::config(format!("Invalid LIBRESPEED_UPLOAD_SIZE value '{}': {}", value, e))
                })?;
                if kib == 0 {
                    return Err(AppError::config("LIBRESPEED_UPLOAD_SIZE must be greater than 0"));
                }
            }
            "LIBRESPEED_TELEMETRY_SERVER" => {
                url::Url::parse(value).map_err(|e| {
                    AppError::config(format!("Invalid LIBRESPEED_TELEMETRY_SERVER '{}': {}", value, e))
                })?;
            }
            "LIBRESPEED_TELEMETRY_LEVEL" => {
                value.parse::<TelemetryLevel>()?;
            }
            "LIBRESPEED_ENABLE_COLOR" => {
                value.parse::<bool>().map_err(|e| {
                    AppError::config(format!("Invalid LIBRESPEED_ENABLE_COLOR value '{}': {}", value, e))
                })?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Supported environment variables with descriptions and examples
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("LIBRESPEED_SERVER_JSON", "Server list JSON file", "./servers.json"),
            ("LIBRESPEED_CONCURRENT", "Concurrent connections per transfer test (1-32)", "3"),
            ("LIBRESPEED_CHUNKS", "Chunks per download stream (1-1024)", "100"),
            ("LIBRESPEED_DURATION", "Transfer test duration in seconds (1-120)", "15"),
            ("LIBRESPEED_UPLOAD_SIZE", "Upload payload size in KiB", "1024"),
            ("LIBRESPEED_TELEMETRY_SERVER", "Telemetry server base URL", "https://librespeed.org"),
            ("LIBRESPEED_TELEMETRY_LEVEL", "Telemetry level used with --share", "basic"),
            ("LIBRESPEED_ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<28} {}\n", var, description));
            help.push_str(&format!("  {:<28} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Warnings for currently set environment variables that fail validation
    pub fn validate_current_env() -> Vec<String> {
        let mut warnings = Vec::new();

        for (var_name, _, _) in Self::get_supported_env_vars() {
            if let Ok(value) = std::env::var(var_name) {
                if let Err(e) = Self::validate_env_var(var_name, &value) {
                    warnings.push(e.to_string());
                }
            }
        }

        warnings
    }
}
