//! Telemetry target configuration and submission payload

use crate::error::{AppError, Result};
use crate::types::TelemetryLevel;
use serde::{Deserialize, Serialize};
use url::Url;

/// Where telemetry is submitted and where shared results are browsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryServer {
    #[serde(rename = "telemetryLevel", default)]
    pub level: TelemetryLevel,
    pub server: String,
    pub path: String,
    #[serde(rename = "shareURL")]
    pub share: String,
}

impl Default for TelemetryServer {
    fn default() -> Self {
        Self {
            level: TelemetryLevel::Disabled,
            server: crate::defaults::TELEMETRY_SERVER.to_string(),
            path: crate::defaults::TELEMETRY_PATH.to_string(),
            share: crate::defaults::TELEMETRY_SHARE_PATH.to_string(),
        }
    }
}

impl TelemetryServer {
    pub fn level(&self) -> TelemetryLevel {
        self.level
    }

    /// Load a telemetry target from a JSON file
    pub fn from_json_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::io(format!("Failed to read telemetry JSON '{}': {}", path.display(), e))
        })?;
        let server: TelemetryServer = serde_json::from_str(&content)?;
        Ok(server)
    }

    fn base(&self) -> Result<Url> {
        let raw = if self.server.starts_with("//") {
            format!("https:{}", self.server)
        } else {
            self.server.clone()
        };
        Url::parse(&raw)
            .map_err(|e| AppError::config(format!("Invalid telemetry server '{}': {}", self.server, e)))
    }

    /// Submission endpoint: `server` joined with `path`
    pub fn endpoint_url(&self) -> Result<Url> {
        Ok(self.base()?.join(&self.path)?)
    }

    /// Base URL of the share page, before the result id is attached
    pub fn share_url(&self) -> Result<Url> {
        Ok(self.base()?.join(&self.share)?)
    }
}

/// Provenance attached to a telemetry submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryExtra {
    #[serde(rename = "server")]
    pub server_name: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null", default)]
    pub extra: serde_json::Value,
}

impl TelemetryExtra {
    pub fn new(server_name: &str, extra: serde_json::Value) -> Self {
        Self {
            server_name: server_name.to_string(),
            extra,
        }
    }
}

/// Interpret caller metadata: JSON when it parses, otherwise a plain string
pub fn parse_extra(raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}
