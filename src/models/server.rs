//! LibreSpeed server list entries

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// One entry of a LibreSpeed server list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDefinition {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub server: String,
    #[serde(rename = "dlURL", default = "default_download_path")]
    pub download_path: String,
    #[serde(rename = "ulURL", default = "default_upload_path")]
    pub upload_path: String,
    #[serde(rename = "pingURL", default = "default_ping_path")]
    pub ping_path: String,
    #[serde(rename = "getIpURL", default = "default_get_ip_path")]
    pub get_ip_path: String,
    #[serde(rename = "sponsorName", default)]
    pub sponsor_name: String,
    #[serde(rename = "sponsorURL", default)]
    pub sponsor_url: String,
}

impl ServerDefinition {
    /// A server using the standard LibreSpeed backend layout
    pub fn custom(id: i64, url: &str) -> Self {
        Self {
            id,
            name: format!("Custom server ({})", url),
            server: url.to_string(),
            download_path: default_download_path(),
            upload_path: default_upload_path(),
            ping_path: default_ping_path(),
            get_ip_path: default_get_ip_path(),
            sponsor_name: String::new(),
            sponsor_url: String::new(),
        }
    }

    /// Canonical base URL of the server
    pub fn base_url(&self) -> Result<Url> {
        let raw = if self.server.starts_with("//") {
            format!("https:{}", self.server)
        } else {
            self.server.clone()
        };
        let mut url = Url::parse(&raw)
            .map_err(|e| AppError::parse(format!("Invalid server URL '{}': {}", self.server, e)))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Sponsor line, empty when the server has no sponsor
    pub fn sponsor(&self) -> String {
        if self.sponsor_name.is_empty() {
            return String::new();
        }
        if self.sponsor_url.is_empty() {
            return self.sponsor_name.clone();
        }

        let sponsor_url = if self.sponsor_url.contains("://") {
            self.sponsor_url.clone()
        } else {
            format!("https://{}", self.sponsor_url.trim_start_matches("//"))
        };
        format!("{} @ {}", self.sponsor_name, sponsor_url)
    }

    /// Load a server list from a JSON file
    pub fn load_list(path: &Path) -> Result<Vec<ServerDefinition>> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::io(format!("Failed to read server list '{}': {}", path.display(), e))
        })?;
        Self::parse_list(&content)
    }

    /// Parse a server list from JSON text
    pub fn parse_list(content: &str) -> Result<Vec<ServerDefinition>> {
        let servers: Vec<ServerDefinition> = serde_json::from_str(content)?;
        Ok(servers)
    }
}

fn default_download_path() -> String {
    "backend/garbage.php".to_string()
}

fn default_upload_path() -> String {
    "backend/empty.php".to_string()
}

fn default_ping_path() -> String {
    "backend/empty.php".to_string()
}

fn default_get_ip_path() -> String {
    "backend/getIP.php".to_string()
}
