//! Colored formatter for interactive terminals

use super::formatter::{FormattingOptions, OutputFormatter, PlainFormatter};
use crate::models::{Report, ServerDefinition};
use colored::*;
use std::fmt::Write as _;

/// Latency classification for color coding
#[derive(Debug, Clone, PartialEq)]
pub enum PerformanceLevel {
    Excellent,  // < 20ms
    Good,       // 20-50ms
    Fair,       // 50-150ms
    Poor,       // >= 150ms
}

impl PerformanceLevel {
    /// Determine performance level from ping in milliseconds
    pub fn from_ping(ping_ms: f64) -> Self {
        if ping_ms < 20.0 {
            Self::Excellent
        } else if ping_ms < 50.0 {
            Self::Good
        } else if ping_ms < 150.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Red,
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub label: Color,
    pub throughput: Color,
    pub link: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            label: Color::Blue,
            throughput: Color::Magenta,
            link: Color::Cyan,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme,
        }
    }

    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn label(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold().color(self.color_scheme.label)
        } else {
            text.normal()
        }
    }

    fn ping_colored(&self, ping_ms: f64) -> ColoredString {
        let formatted = format!("{:.2} ms", ping_ms);
        self.colorize(&formatted, PerformanceLevel::from_ping(ping_ms).color())
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_simple(&self, report: &Report) -> String {
        self.plain_formatter.format_simple(report)
    }

    fn format_summary(&self, report: &Report) -> String {
        let label = |text: &str| self.label(text);
        let mut output = String::new();

        let _ = writeln!(
            output,
            "{} {}\t{} {}",
            label("Ping:"),
            self.ping_colored(report.ping),
            label("Jitter:"),
            self.colorize(&format!("{:.2} ms", report.jitter), self.color_scheme.muted)
        );
        let _ = writeln!(
            output,
            "{} {}",
            label("Download rate:"),
            self.colorize(&self.format_rate(report.download), self.color_scheme.throughput)
        );
        let _ = write!(
            output,
            "{} {}",
            label("Upload rate:"),
            self.colorize(&self.format_rate(report.upload), self.color_scheme.throughput)
        );
        if !report.share.is_empty() {
            let _ = write!(
                output,
                "\n{} {}",
                label("Share your result:"),
                self.colorize(&report.share, self.color_scheme.link)
            );
        }
        output
    }

    fn format_separator(&self) -> String {
        self.colorize(&"-".repeat(40), self.color_scheme.muted).to_string()
    }

    fn format_server_list(&self, servers: &[ServerDefinition]) -> String {
        let mut output = String::new();
        for server in servers {
            let _ = write!(
                output,
                "{}: {} {}",
                self.bold(&server.id.to_string()),
                server.name,
                self.colorize(&format!("({})", server.server), self.color_scheme.muted)
            );
            let sponsor = server.sponsor();
            if !sponsor.is_empty() {
                let _ = write!(output, " [{}]", sponsor);
            }
            output.push('\n');
        }
        output
    }

    fn format_rate(&self, mbps: f64) -> String {
        self.plain_formatter.format_rate(mbps)
    }
}
