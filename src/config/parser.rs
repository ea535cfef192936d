//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    models::{parse_extra, ServerDefinition, TelemetryServer, TestOptions},
    types::{NetworkFamily, TelemetryLevel},
};
use std::path::PathBuf;

/// Everything a run needs: options plus the servers to test
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub options: TestOptions,
    pub servers: Vec<ServerDefinition>,
}

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Build the complete run configuration
    pub fn parse(&self) -> Result<RunConfig> {
        EnvManager::load_env_file()?;
        self.parse_without_env_file()
    }

    /// Same as [`parse`](Self::parse) without reading `.env`
    pub fn parse_without_env_file(&self) -> Result<RunConfig> {
        let mut options = TestOptions::default();
        options.merge_from_env()?;
        self.apply_cli_overrides(&mut options)?;
        self.apply_telemetry(&mut options)?;

        let servers = self.load_servers()?;
        if servers.is_empty() {
            return Err(AppError::config("No servers left to test after filtering"));
        }

        options.validate()?;

        Ok(RunConfig { options, servers })
    }

    /// Apply CLI argument overrides to the options
    fn apply_cli_overrides(&self, options: &mut TestOptions) -> Result<()> {
        let cli = &self.cli;

        options.no_download = cli.no_download;
        options.no_upload = cli.no_upload;
        options.bytes = cli.bytes;
        options.binary_base = cli.mebibytes;
        options.no_pre_allocate = cli.no_pre_allocate;
        options.source_ip = cli.source;

        if let Some(concurrent) = cli.concurrent {
            options.concurrent = concurrent;
        }
        if let Some(chunks) = cli.chunks {
            options.chunks = chunks;
        }
        if let Some(duration) = cli.duration {
            options.duration_seconds = duration;
        }
        if let Some(size) = cli.upload_size {
            options.upload_size_kib = size;
        }
        if let Some(unit) = cli.distance {
            options.distance_unit = unit;
        }

        options.network = if cli.ipv4 {
            NetworkFamily::Ipv4
        } else if cli.ipv6 {
            NetworkFamily::Ipv6
        } else {
            NetworkFamily::Auto
        };

        options.output.csv = cli.csv;
        options.output.json = cli.json;
        options.output.simple = cli.simple;
        options.output.csv_delimiter = csv_delimiter_byte(cli.csv_delimiter)?;
        if cli.color || cli.no_color {
            options.output.enable_color = cli.use_colors();
        } else {
            options.output.enable_color = options.output.enable_color && cli.use_colors();
        }

        options.verbose = cli.verbose;
        options.debug = cli.debug;
        Ok(())
    }

    /// Telemetry is only active with `--share`; the level defaults to basic then
    fn apply_telemetry(&self, options: &mut TestOptions) -> Result<()> {
        let cli = &self.cli;

        if let Some(path) = &cli.telemetry_json {
            let env_level = options.telemetry_server.level;
            options.telemetry_server = TelemetryServer::from_json_file(path)?;
            if !options.telemetry_server.level.is_enabled() {
                options.telemetry_server.level = env_level;
            }
        }
        if let Some(server) = &cli.telemetry_server {
            options.telemetry_server.server = server.clone();
        }
        if let Some(path) = &cli.telemetry_path {
            options.telemetry_server.path = path.clone();
        }
        if let Some(share) = &cli.telemetry_share {
            options.telemetry_server.share = share.clone();
        }

        options.telemetry_server.level = if cli.share {
            match cli.telemetry_level {
                Some(level) => level,
                None if options.telemetry_server.level.is_enabled() => options.telemetry_server.level,
                None => TelemetryLevel::Basic,
            }
        } else {
            TelemetryLevel::Disabled
        };

        if let Some(extra) = &cli.telemetry_extra {
            options.telemetry_extra = parse_extra(extra);
        }
        Ok(())
    }

    /// Servers from the list file and custom URLs, filtered by id
    fn load_servers(&self) -> Result<Vec<ServerDefinition>> {
        let cli = &self.cli;
        let mut servers = Vec::new();

        let list_path = cli
            .server_json
            .clone()
            .or_else(|| std::env::var_os("LIBRESPEED_SERVER_JSON").map(PathBuf::from));
        if let Some(path) = list_path {
            servers.extend(ServerDefinition::load_list(&path)?);
        }

        let next_id = servers.iter().map(|s| s.id).max().unwrap_or(0);
        for (offset, url) in cli.server_urls.iter().enumerate() {
            let server = ServerDefinition::custom(next_id + 1 + offset as i64, url);
            server.base_url()?;
            servers.push(server);
        }

        if !cli.servers.is_empty() {
            servers.retain(|s| cli.servers.contains(&s.id));
        }
        if !cli.exclude.is_empty() {
            servers.retain(|s| !cli.exclude.contains(&s.id));
        }

        Ok(servers)
    }
}

fn csv_delimiter_byte(delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(AppError::config(format!(
            "CSV delimiter must be a single ASCII character, got: '{}'",
            delimiter
        )))
    }
}

/// Convenience function to load the run configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<RunConfig> {
    ConfigParser::new(cli).parse()
}

/// Configuration summary for debug output
pub fn display_config_summary(config: &RunConfig) -> String {
    let options = &config.options;
    let mut summary = Vec::new();

    summary.push(format!("Servers: {}", config.servers.len()));
    summary.push(format!("Concurrent: {}", options.concurrent));
    summary.push(format!("Chunks: {}", options.chunks));
    summary.push(format!("Duration: {}s", options.duration_seconds));
    summary.push(format!("Upload size: {} KiB", options.upload_size_kib));
    summary.push(format!("Distance unit: {}", options.distance_unit.as_query_value()));
    summary.push(format!("Telemetry level: {}", options.telemetry_level()));
    summary.push(format!("Color Output: {}", options.output.enable_color));

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DistanceUnit;
    use clap::Parser;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &[
        "LIBRESPEED_SERVER_JSON",
        "LIBRESPEED_CONCURRENT",
        "LIBRESPEED_CHUNKS",
        "LIBRESPEED_DURATION",
        "LIBRESPEED_UPLOAD_SIZE",
        "LIBRESPEED_TELEMETRY_SERVER",
        "LIBRESPEED_TELEMETRY_LEVEL",
        "LIBRESPEED_ENABLE_COLOR",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    fn server_list_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": 1, "name": "One", "server": "https://one.example.net/"}},
                {{"id": 2, "name": "Two", "server": "https://two.example.net/"}},
                {{"id": 3, "name": "Three", "server": "https://three.example.net/"}}
            ]"#
        )
        .unwrap();
        file
    }

    fn parse(args: &[&str]) -> Result<RunConfig> {
        let mut full = vec!["librespeed-cli"];
        full.extend_from_slice(args);
        ConfigParser::new(Cli::parse_from(full)).parse_without_env_file()
    }

    #[test]
    fn test_cli_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let config = parse(&[
            "--server-url", "https://speed.example.net/",
            "--concurrent", "8",
            "--duration", "5",
            "--distance", "NU",
            "--no-upload",
            "--csv-delimiter", "|",
            "-6",
        ])
        .unwrap();

        assert_eq!(config.options.concurrent, 8);
        assert_eq!(config.options.duration_seconds, 5);
        assert_eq!(config.options.distance_unit, DistanceUnit::None);
        assert!(config.options.no_upload);
        assert_eq!(config.options.output.csv_delimiter, b'|');
        assert_eq!(config.options.network, NetworkFamily::Ipv6);
        assert_eq!(config.servers.len(), 1);
    }

    #[test]
    fn test_env_then_cli_precedence() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        std::env::set_var("LIBRESPEED_CONCURRENT", "6");
        std::env::set_var("LIBRESPEED_CHUNKS", "20");

        let config = parse(&["--server-url", "https://a.example/", "--chunks", "40"]).unwrap();
        assert_eq!(config.options.concurrent, 6);
        assert_eq!(config.options.chunks, 40);

        clear_env();
    }

    #[test]
    fn test_server_filters() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let file = server_list_file();
        let path = file.path().to_str().unwrap();

        let config = parse(&["--server-json", path, "--server", "1", "--server", "3"]).unwrap();
        let ids: Vec<i64> = config.servers.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let config = parse(&["--server-json", path, "--exclude", "2"]).unwrap();
        let ids: Vec<i64> = config.servers.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);

        assert!(parse(&["--server-json", path, "--server", "42"]).is_err());
    }

    #[test]
    fn test_custom_urls_follow_list_ids() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let file = server_list_file();
        let path = file.path().to_str().unwrap();

        let config = parse(&["--server-json", path, "--server-url", "https://custom.example/"]).unwrap();
        assert_eq!(config.servers.len(), 4);
        assert_eq!(config.servers[3].id, 4);
    }

    #[test]
    fn test_telemetry_requires_share() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        std::env::set_var("LIBRESPEED_TELEMETRY_LEVEL", "full");

        let config = parse(&["--server-url", "https://a.example/"]).unwrap();
        assert_eq!(config.options.telemetry_level(), TelemetryLevel::Disabled);

        let config = parse(&["--server-url", "https://a.example/", "--share"]).unwrap();
        assert_eq!(config.options.telemetry_level(), TelemetryLevel::Full);

        clear_env();
        let config = parse(&[
            "--server-url", "https://a.example/",
            "--share",
            "--telemetry-extra", "lab run",
        ])
        .unwrap();
        assert_eq!(config.options.telemetry_level(), TelemetryLevel::Basic);
        assert_eq!(config.options.telemetry_extra, serde_json::json!("lab run"));
    }

    #[test]
    fn test_telemetry_json_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"telemetryLevel": "debug", "server": "https://results.example.org", "path": "/t.php", "shareURL": "/s/"}}"#
        )
        .unwrap();

        let config = parse(&[
            "--server-url", "https://a.example/",
            "--share",
            "--telemetry-json", file.path().to_str().unwrap(),
        ])
        .unwrap();

        let telemetry = &config.options.telemetry_server;
        assert_eq!(telemetry.level, TelemetryLevel::Debug);
        assert_eq!(telemetry.endpoint_url().unwrap().as_str(), "https://results.example.org/t.php");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        assert!(parse(&["--server-url", "https://a.example/", "--concurrent", "0"]).is_err());
        assert!(parse(&["--server-url", "not a url"]).is_err());
        assert!(parse(&["--server-url", "https://a.example/", "--csv-delimiter", "é"]).is_err());
    }

    #[test]
    fn test_display_config_summary() {
        let config = RunConfig {
            options: TestOptions::default(),
            servers: vec![ServerDefinition::custom(1, "https://a.example/")],
        };
        let summary = display_config_summary(&config);
        assert!(summary.contains("Servers: 1"));
        assert!(summary.contains("Telemetry level: disabled"));
    }
}
