//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Unit used by the server when computing the client/server distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
    /// Do not compute a distance
    None,
}

impl DistanceUnit {
    /// Query-string value understood by the backend's `getIP` endpoint
    pub fn as_query_value(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
            DistanceUnit::None => "NU",
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "km" | "kilometers" => Ok(DistanceUnit::Kilometers),
            "mi" | "miles" => Ok(DistanceUnit::Miles),
            "nu" | "none" => Ok(DistanceUnit::None),
            _ => Err(AppError::parse(format!("Invalid distance unit: {}", s))),
        }
    }
}

/// IP family forced for the measurement connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NetworkFamily {
    #[default]
    Auto,
    Ipv4,
    Ipv6,
}

impl FromStr for NetworkFamily {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" | "ip" => Ok(NetworkFamily::Auto),
            "4" | "ip4" | "ipv4" => Ok(NetworkFamily::Ipv4),
            "6" | "ip6" | "ipv6" => Ok(NetworkFamily::Ipv6),
            _ => Err(AppError::parse(format!("Invalid network family: {}", s))),
        }
    }
}

/// Telemetry opt-in level. The numeric value orders the levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryLevel {
    #[default]
    Disabled = 0,
    Basic = 1,
    Full = 2,
    Debug = 3,
}

impl TelemetryLevel {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Submission happens for any level above zero
    pub fn is_enabled(&self) -> bool {
        self.as_u8() > 0
    }
}

impl FromStr for TelemetryLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "disabled" | "" => Ok(TelemetryLevel::Disabled),
            "basic" => Ok(TelemetryLevel::Basic),
            "full" => Ok(TelemetryLevel::Full),
            "debug" => Ok(TelemetryLevel::Debug),
            _ => Err(AppError::parse(format!("Invalid telemetry level: {}", s))),
        }
    }
}

impl fmt::Display for TelemetryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TelemetryLevel::Disabled => "disabled",
            TelemetryLevel::Basic => "basic",
            TelemetryLevel::Full => "full",
            TelemetryLevel::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// Final output format, resolved from the output flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Simple,
    /// Interactive progress output only
    Default,
}

impl OutputFormat {
    /// CSV wins over JSON, JSON wins over simple text.
    pub fn from_flags(csv: bool, json: bool, simple: bool) -> Self {
        if csv {
            OutputFormat::Csv
        } else if json {
            OutputFormat::Json
        } else if simple {
            OutputFormat::Simple
        } else {
            OutputFormat::Default
        }
    }

    /// Machine-readable formats suppress human-facing console text
    pub fn is_machine_readable(&self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Json)
    }
}
