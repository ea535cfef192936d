//! Soft configuration checks
//!
//! Hard rules live in [`TestOptions::validate`]; the checks here only produce
//! warnings for combinations that are legal but probably not what was meant.

use crate::{
    config::env::EnvManager,
    error::Result,
    models::{ServerDefinition, TestOptions},
};
use std::collections::HashSet;

/// Collects warnings about a run configuration
#[derive(Debug, Default)]
pub struct ConfigValidator {
    warnings: Vec<String>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every check and return the warnings
    pub fn check(mut self, options: &TestOptions, servers: &[ServerDefinition]) -> Vec<String> {
        self.check_output(options);
        self.check_transfers(options);
        self.check_telemetry(options);
        self.check_servers(servers);
        self.warnings.extend(EnvManager::validate_current_env());
        self.warnings
    }

    fn check_output(&mut self, options: &TestOptions) {
        let output = &options.output;
        if output.csv && output.json {
            self.warnings
                .push("Both --csv and --json requested; only CSV is printed".to_string());
        }
        if output.simple && (output.csv || output.json) {
            self.warnings
                .push("--simple is ignored with CSV or JSON output".to_string());
        }
        if options.bytes && output.format().is_machine_readable() {
            self.warnings
                .push("--bytes has no visible effect with CSV or JSON output".to_string());
        }
        if options.binary_base && !options.bytes {
            self.warnings
                .push("--mebibytes has no effect without --bytes".to_string());
        }
    }

    fn check_transfers(&mut self, options: &TestOptions) {
        if options.no_download && options.no_upload {
            self.warnings
                .push("Download and upload are both disabled; only latency is measured".to_string());
        }
        if options.duration_seconds < 5 && !(options.no_download && options.no_upload) {
            self.warnings.push(format!(
                "Transfer duration of {}s may be too short for a stable result",
                options.duration_seconds
            ));
        }
        if options.concurrent > 16 {
            self.warnings.push(format!(
                "{} concurrent connections may saturate the local machine before the link",
                options.concurrent
            ));
        }
    }

    fn check_telemetry(&mut self, options: &TestOptions) {
        if !options.telemetry_level().is_enabled() && !options.telemetry_extra.is_null() {
            self.warnings
                .push("Telemetry extra data is ignored while telemetry is disabled".to_string());
        }
    }

    fn check_servers(&mut self, servers: &[ServerDefinition]) {
        let mut seen = HashSet::new();
        for server in servers {
            if !seen.insert(server.id) {
                self.warnings
                    .push(format!("Server id {} appears more than once", server.id));
            }
        }
    }
}

/// Validate hard rules, then return soft warnings
pub fn validate_config(options: &TestOptions, servers: &[ServerDefinition]) -> Result<Vec<String>> {
    options.validate()?;
    Ok(ConfigValidator::new().check(options, servers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TelemetryLevel;

    fn servers() -> Vec<ServerDefinition> {
        vec![ServerDefinition::custom(1, "https://a.example/")]
    }

    #[test]
    fn test_default_config_has_no_option_warnings() {
        let mut validator = ConfigValidator::new();
        validator.check_output(&TestOptions::default());
        validator.check_transfers(&TestOptions::default());
        validator.check_telemetry(&TestOptions::default());
        assert!(validator.warnings.is_empty());
    }

    #[test]
    fn test_csv_and_json_warning() {
        let mut options = TestOptions::default();
        options.output.csv = true;
        options.output.json = true;
        options.bytes = true;

        let mut validator = ConfigValidator::new();
        validator.check_output(&options);
        assert!(validator.warnings.iter().any(|w| w.contains("only CSV")));
        assert!(validator.warnings.iter().any(|w| w.contains("--bytes")));
    }

    #[test]
    fn test_extra_without_telemetry_warning() {
        let mut options = TestOptions::default();
        options.telemetry_extra = serde_json::json!({"tag": "lab"});

        let mut validator = ConfigValidator::new();
        validator.check_telemetry(&options);
        assert_eq!(validator.warnings.len(), 1);

        options.telemetry_server.level = TelemetryLevel::Basic;
        let mut validator = ConfigValidator::new();
        validator.check_telemetry(&options);
        assert!(validator.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_server_ids() {
        let mut list = servers();
        list.push(ServerDefinition::custom(1, "https://b.example/"));

        let mut validator = ConfigValidator::new();
        validator.check_servers(&list);
        assert_eq!(validator.warnings, vec!["Server id 1 appears more than once".to_string()]);
    }

    #[test]
    fn test_validate_config_rejects_hard_errors() {
        let options = TestOptions {
            chunks: 0,
            ..Default::default()
        };
        assert!(validate_config(&options, &servers()).is_err());
    }
}
