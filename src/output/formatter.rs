//! Core formatting traits and the plain text implementation

use super::humanize_mbps;
use crate::models::{Report, ServerDefinition};
use std::fmt::Write as _;

/// Per-server text rendering
pub trait OutputFormatter {
    /// Compact block printed with `--simple`
    fn format_simple(&self, report: &Report) -> String;

    /// Interactive summary, including the share link when present
    fn format_summary(&self, report: &Report) -> String;

    /// Line printed between servers in multi-server runs
    fn format_separator(&self) -> String;

    /// Listing printed by `--list`
    fn format_server_list(&self, servers: &[ServerDefinition]) -> String;

    /// Render a throughput value honouring the byte display options
    fn format_rate(&self, mbps: f64) -> String;
}

/// Configuration options for formatting
#[derive(Debug, Clone, Default)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Show byte rates instead of Mbps
    pub bytes: bool,
    /// 1024 instead of 1000 as unit base
    pub binary_base: bool,
}

/// Plain text formatter for scripts and non-tty output
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_simple(&self, report: &Report) -> String {
        let mut output = format!(
            "Ping:\t{:.2} ms\tJitter:\t{:.2} ms\nDownload rate:\t{}\nUpload rate:\t{}",
            report.ping,
            report.jitter,
            self.format_rate(report.download),
            self.format_rate(report.upload)
        );
        if !report.share.is_empty() {
            let _ = write!(output, "\nShare your result: {}", report.share);
        }
        output
    }

    fn format_summary(&self, report: &Report) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "Ping: {:.2} ms\tJitter: {:.2} ms", report.ping, report.jitter);
        let _ = writeln!(output, "Download rate: {}", self.format_rate(report.download));
        let _ = write!(output, "Upload rate: {}", self.format_rate(report.upload));
        if !report.share.is_empty() {
            let _ = write!(output, "\nShare your result: {}", report.share);
        }
        output
    }

    fn format_separator(&self) -> String {
        String::new()
    }

    fn format_server_list(&self, servers: &[ServerDefinition]) -> String {
        let mut output = String::new();
        for server in servers {
            let _ = write!(output, "{}: {} ({})", server.id, server.name, server.server);
            let sponsor = server.sponsor();
            if !sponsor.is_empty() {
                let _ = write!(output, " [{}]", sponsor);
            }
            output.push('\n');
        }
        output
    }

    fn format_rate(&self, mbps: f64) -> String {
        if self.options.bytes {
            humanize_mbps(mbps, self.options.binary_base)
        } else {
            format!("{:.2} Mbps", mbps)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IspInfo, Measurements};
    use url::Url;

    fn report(share: &str) -> Report {
        let measurements = Measurements {
            ping: 12.344,
            jitter: 1.5,
            download: 4.0,
            upload: 93.456,
            bytes_received: 1_000,
            bytes_sent: 2_000,
        };
        Report::new(
            "Test",
            &Url::parse("https://speed.example.net/").unwrap(),
            &IspInfo::from_plain("192.0.2.1"),
            &measurements,
            share.to_string(),
        )
    }

    #[test]
    fn test_simple_block_in_mbps() {
        let formatter = PlainFormatter::new(FormattingOptions::default());
        assert_eq!(
            formatter.format_simple(&report("")),
            "Ping:\t12.34 ms\tJitter:\t1.50 ms\nDownload rate:\t4.00 Mbps\nUpload rate:\t93.46 Mbps"
        );
    }

    #[test]
    fn test_simple_block_with_share_link() {
        let formatter = PlainFormatter::new(FormattingOptions::default());
        let output = formatter.format_simple(&report("https://librespeed.org/results/?id=abc"));
        assert!(output.ends_with("\nShare your result: https://librespeed.org/results/?id=abc"));
    }

    #[test]
    fn test_simple_block_in_bytes() {
        let formatter = PlainFormatter::new(FormattingOptions {
            bytes: true,
            ..Default::default()
        });
        let output = formatter.format_simple(&report(""));
        assert!(output.contains("Download rate:\t500.00 KB/s"));
    }

    #[test]
    fn test_summary_share_line() {
        let formatter = PlainFormatter::new(FormattingOptions::default());
        assert!(!formatter.format_summary(&report("")).contains("Share"));
        assert!(formatter
            .format_summary(&report("https://librespeed.org/results/?id=x"))
            .ends_with("Share your result: https://librespeed.org/results/?id=x"));
    }

    #[test]
    fn test_server_list() {
        let mut server = ServerDefinition::custom(3, "https://speed.example.net/");
        server.name = "Example".to_string();
        let formatter = PlainFormatter::new(FormattingOptions::default());
        assert_eq!(
            formatter.format_server_list(&[server]),
            "3: Example (https://speed.example.net/)\n"
        );
    }
}
