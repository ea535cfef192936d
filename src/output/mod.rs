//! Report rendering
//!
//! One output format is active per run. CSV wins over JSON and JSON wins over
//! the text formats. CSV and JSON are rendered once for the whole report
//! collection; the text formats are rendered per server as results arrive.

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter, PerformanceLevel};
pub use formatter::{FormattingOptions, OutputFormatter, PlainFormatter};

use crate::{
    error::{AppError, Result},
    logging::Logger,
    models::{FlatReport, Report, ServerDefinition, TestOptions},
    types::OutputFormat,
};

/// Convert Mbps into a byte rate string with bytes/s, KB/s, MB/s or GB/s
pub fn humanize_mbps(mbps: f64, binary_base: bool) -> String {
    let base = if binary_base { 1024.0 } else { 1000.0 };
    let val = mbps / 8.0;

    if val < 1.0 {
        let kb = val * base;
        if kb < 1.0 {
            format!("{:.2} bytes/s", kb * base)
        } else {
            format!("{:.2} KB/s", kb)
        }
    } else if val > base {
        format!("{:.2} GB/s", val / base)
    } else {
        format!("{:.2} MB/s", val)
    }
}

/// Headerless CSV rows, one per report, in collection order
pub fn render_csv(reports: &[Report], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .from_writer(Vec::new());

    for report in reports {
        writer.serialize(report.flat())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::output(format!("Failed to flush CSV output: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::output(format!("CSV output is not UTF-8: {}", e)))
}

/// The CSV header row alone
pub fn csv_header(delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(FlatReport::HEADERS)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::output(format!("Failed to flush CSV output: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::output(format!("CSV output is not UTF-8: {}", e)))
}

/// The full report collection as one JSON array
pub fn render_json(reports: &[Report]) -> Result<String> {
    serde_json::to_string(reports)
        .map_err(|e| AppError::output(format!("Failed to encode JSON output: {}", e)))
}

/// Output formatting factory
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    pub fn create_formatter(options: FormattingOptions) -> Box<dyn OutputFormatter> {
        if options.enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    pub fn from_test_options(options: &TestOptions) -> Box<dyn OutputFormatter> {
        Self::create_formatter(FormattingOptions {
            enable_color: options.output.enable_color,
            bytes: options.bytes,
            binary_base: options.binary_base,
        })
    }
}

/// Chooses what is printed for a run
pub struct OutputCoordinator {
    format: OutputFormat,
    csv_delimiter: u8,
    formatter: Box<dyn OutputFormatter>,
}

impl OutputCoordinator {
    pub fn new(format: OutputFormat, csv_delimiter: u8, formatter: Box<dyn OutputFormatter>) -> Self {
        Self {
            format,
            csv_delimiter,
            formatter,
        }
    }

    pub fn from_options(options: &TestOptions) -> Self {
        Self::new(
            options.output.format(),
            options.output.csv_delimiter,
            OutputFormatterFactory::from_test_options(options),
        )
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Text printed right after one server finished, if any
    pub fn server_result(&self, report: &Report) -> Option<String> {
        match self.format {
            OutputFormat::Simple => Some(self.formatter.format_simple(report)),
            OutputFormat::Default => Some(self.formatter.format_summary(report)),
            OutputFormat::Csv | OutputFormat::Json => None,
        }
    }

    /// Separator between servers; machine-readable output gets none
    pub fn separator(&self) -> Option<String> {
        if self.format.is_machine_readable() {
            None
        } else {
            Some(self.formatter.format_separator())
        }
    }

    /// Text printed once all servers finished. Rendering failures are logged and yield nothing.
    pub fn final_output(&self, reports: &[Report], logger: &Logger) -> Option<String> {
        let rendered = match self.format {
            OutputFormat::Csv => render_csv(reports, self.csv_delimiter),
            OutputFormat::Json => render_json(reports).map(|json| json + "\n"),
            OutputFormat::Simple | OutputFormat::Default => return None,
        };

        match rendered {
            Ok(text) => Some(text),
            Err(e) => {
                logger
                    .error("Error generating report output")
                    .error_info(&e)
                    .log();
                None
            }
        }
    }

    pub fn server_list(&self, servers: &[ServerDefinition]) -> String {
        self.formatter.format_server_list(servers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use crate::models::{IspInfo, Measurements};
    use proptest::prelude::*;
    use url::Url;

    fn report(name: &str, ping: f64) -> Report {
        let measurements = Measurements {
            ping,
            jitter: 0.5,
            download: 100.0,
            upload: 50.0,
            bytes_received: 10,
            bytes_sent: 20,
        };
        Report::new(
            name,
            &Url::parse("https://speed.example.net/").unwrap(),
            &IspInfo::from_plain("192.0.2.1"),
            &measurements,
            String::new(),
        )
    }

    #[test]
    fn test_humanize_examples() {
        assert_eq!(humanize_mbps(4.0, false), "500.00 KB/s");
        assert_eq!(humanize_mbps(16000.0, false), "2.00 GB/s");
        assert_eq!(humanize_mbps(8.0, false), "1.00 MB/s");
        assert!(humanize_mbps(0.001, false).ends_with("bytes/s"));
        assert_eq!(humanize_mbps(0.001, false), "125.00 bytes/s");
    }

    #[test]
    fn test_humanize_boundary_stays_in_mb() {
        assert_eq!(humanize_mbps(8000.0, false), "1000.00 MB/s");
        assert_eq!(humanize_mbps(8192.0, true), "1024.00 MB/s");
        assert_eq!(humanize_mbps(4.0, true), "512.00 KB/s");
    }

    proptest! {
        #[test]
        fn test_humanize_has_one_unit(mbps in 0.0f64..1.0e7, binary in any::<bool>()) {
            let text = humanize_mbps(mbps, binary);
            let units = ["bytes/s", "KB/s", "MB/s", "GB/s"];
            prop_assert_eq!(units.iter().filter(|u| text.ends_with(*u)).count(), 1);
        }
    }

    #[test]
    fn test_csv_rows_preserve_order_without_header() {
        let reports = vec![report("First", 300.0), report("Second", 1.0)];
        let csv = render_csv(&reports, b',').unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(",First,"));
        assert!(lines[1].contains(",Second,"));
        assert!(!csv.contains("Server Name"));
    }

    #[test]
    fn test_csv_custom_delimiter_and_header() {
        let csv = render_csv(&[report("Only", 2.0)], b';').unwrap();
        assert!(csv.contains(";Only;https://speed.example.net/;2.0;"));

        let header = csv_header(b',').unwrap();
        assert_eq!(
            header.trim_end(),
            "Timestamp,Server Name,Address,Ping,Jitter,Download,Upload,Bytes Received,Bytes Sent,Share,IP"
        );
    }

    #[test]
    fn test_json_array_length() {
        let reports = vec![report("A", 1.0), report("B", 2.0), report("C", 3.0)];
        let json = render_json(&reports).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2]["server"]["name"], "C");
        assert!(parsed[0]["client"].get("readme").is_none());
    }

    #[test]
    fn test_coordinator_csv_wins_over_json() {
        let mut options = TestOptions::default();
        options.output.csv = true;
        options.output.json = true;
        options.output.enable_color = false;

        let coordinator = OutputCoordinator::from_options(&options);
        let (logger, _) = Logger::buffered("test", LogLevel::Info);
        let output = coordinator.final_output(&[report("A", 1.0)], &logger).unwrap();

        assert_eq!(coordinator.format(), OutputFormat::Csv);
        assert!(!output.trim_start().starts_with('['));
        assert!(coordinator.server_result(&report("A", 1.0)).is_none());
        assert!(coordinator.separator().is_none());
    }

    #[test]
    fn test_coordinator_text_formats_have_no_final_output() {
        let mut options = TestOptions::default();
        options.output.simple = true;
        options.output.enable_color = false;

        let coordinator = OutputCoordinator::from_options(&options);
        assert!(coordinator.final_output(&[report("A", 1.0)], &Logger::silent()).is_none());
        assert!(coordinator
            .server_result(&report("A", 1.0))
            .unwrap()
            .starts_with("Ping:\t1.00 ms"));
    }
}
