//! Command-line interface definition

use crate::types::{DistanceUnit, TelemetryLevel};
use clap::{ArgAction, Parser};
use std::net::IpAddr;
use std::path::PathBuf;

/// Speed test client for LibreSpeed servers
#[derive(Parser, Debug, Clone)]
#[command(name = "librespeed-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// LibreSpeed server list JSON file
    #[arg(long, value_name = "FILE")]
    pub server_json: Option<PathBuf>,

    /// Custom server base URL using the standard backend layout (repeatable)
    #[arg(long = "server-url", value_name = "URL", action = ArgAction::Append)]
    pub server_urls: Vec<String>,

    /// Only test the servers with these ids (repeatable)
    #[arg(long = "server", value_name = "ID", action = ArgAction::Append)]
    pub servers: Vec<i64>,

    /// Skip the servers with these ids (repeatable)
    #[arg(long = "exclude", value_name = "ID", action = ArgAction::Append)]
    pub exclude: Vec<i64>,

    /// Print the server list and exit
    #[arg(long)]
    pub list: bool,

    /// Do not run the download test
    #[arg(long)]
    pub no_download: bool,

    /// Do not run the upload test
    #[arg(long)]
    pub no_upload: bool,

    /// Display byte rates instead of Mbps
    #[arg(long)]
    pub bytes: bool,

    /// Use 1024 instead of 1000 as unit base with --bytes
    #[arg(long)]
    pub mebibytes: bool,

    /// Concurrent HTTP connections per transfer test
    #[arg(long, value_name = "N")]
    pub concurrent: Option<u32>,

    /// Chunks requested per download stream
    #[arg(long, value_name = "N")]
    pub chunks: Option<u32>,

    /// Upper bound for each transfer test in seconds
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<u64>,

    /// Upload payload size in KiB
    #[arg(long, value_name = "KIB")]
    pub upload_size: Option<u32>,

    /// Regenerate the upload payload for every request
    #[arg(long)]
    pub no_pre_allocate: bool,

    /// Local address to bind measurement connections to
    #[arg(long, value_name = "IP")]
    pub source: Option<IpAddr>,

    /// Force IPv4
    #[arg(short = '4', long, conflicts_with = "ipv6")]
    pub ipv4: bool,

    /// Force IPv6
    #[arg(short = '6', long)]
    pub ipv6: bool,

    /// Distance unit reported by the ISP lookup (km, mi, NU)
    #[arg(long, value_name = "UNIT")]
    pub distance: Option<DistanceUnit>,

    /// Print the compact per-server result block
    #[arg(long)]
    pub simple: bool,

    /// Print results as headerless CSV rows
    #[arg(long)]
    pub csv: bool,

    /// Print results as a JSON array
    #[arg(long)]
    pub json: bool,

    /// Field delimiter for CSV output
    #[arg(long, value_name = "CHAR", default_value_t = ',')]
    pub csv_delimiter: char,

    /// Print the CSV header row and exit
    #[arg(long)]
    pub csv_header: bool,

    /// Submit results and print a share link
    #[arg(long)]
    pub share: bool,

    /// Telemetry level (disabled, basic, full, debug)
    #[arg(long, value_name = "LEVEL")]
    pub telemetry_level: Option<TelemetryLevel>,

    /// Telemetry target JSON file
    #[arg(long, value_name = "FILE")]
    pub telemetry_json: Option<PathBuf>,

    /// Telemetry server base URL
    #[arg(long, value_name = "URL")]
    pub telemetry_server: Option<String>,

    /// Telemetry submission path
    #[arg(long, value_name = "PATH")]
    pub telemetry_path: Option<String>,

    /// Share page path
    #[arg(long, value_name = "PATH")]
    pub telemetry_share: Option<String>,

    /// Extra metadata submitted with telemetry (JSON or plain text)
    #[arg(long, value_name = "DATA")]
    pub telemetry_extra: Option<String>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print the supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.csv_header || self.env_help {
            return Ok(());
        }

        if self.server_json.is_none()
            && self.server_urls.is_empty()
            && std::env::var_os("LIBRESPEED_SERVER_JSON").is_none()
        {
            return Err("Must specify servers via --server-json or --server-url".to_string());
        }

        if !self.csv_delimiter.is_ascii() {
            return Err(format!(
                "CSV delimiter must be a single ASCII character, got: '{}'",
                self.csv_delimiter
            ));
        }

        if !self.share
            && (self.telemetry_json.is_some()
                || self.telemetry_server.is_some()
                || self.telemetry_extra.is_some())
        {
            return Err("Telemetry options require --share".to_string());
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
