//! Terminal progress and statistics display

use crate::{
    error::AppError,
    models::{AggregateRecord, Config, Summary, TestConfiguration, ThroughputSample},
    stats::ResultSet,
};
use colored::*;
use std::fmt::Write as _;
use std::path::Path;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            muted: Color::BrightBlack,
        }
    }
}

/// Prints run progress and per-configuration statistics
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    enable_color: bool,
    verbose: bool,
    color_scheme: ColorScheme,
}

impl ConsoleReporter {
    pub fn new(enable_color: bool, verbose: bool) -> Self {
        Self {
            enable_color,
            verbose,
            color_scheme: ColorScheme::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.enable_color, config.verbose)
    }

    pub fn with_color_scheme(mut self, color_scheme: ColorScheme) -> Self {
        self.color_scheme = color_scheme;
        self
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    pub fn format_configuration_header(&self, configuration: &TestConfiguration) -> String {
        let title = format!("--- Testing Buffer Size: {} bytes ---", configuration.buffer_size);
        format!("\n{}", self.colorize(&title, self.color_scheme.header))
    }

    pub fn format_run_started(&self, configuration: &TestConfiguration, run: u32, total: u32) -> String {
        format!(
            "Running {} test - Buffer Size: {} bytes - Run {}/{}",
            configuration.protocol, configuration.buffer_size, run, total
        )
    }

    pub fn format_run_succeeded(&self, run: u32, sample: &ThroughputSample) -> String {
        let mut line = format!(
            "Throughput for run {}: {}",
            run,
            self.colorize(&format!("{:.2} Mbits/sec", sample.receiver_mbps), self.color_scheme.success)
        );

        if self.verbose {
            let _ = write!(line, " (sender {:.2} Mbits/sec)", sample.sender_mbps);
            if let Some(change) = sample.bitrate_change_mbps {
                let _ = write!(line, " (bitrate change {:+.1} Mb/s)", change);
            }
        }
        line
    }

    pub fn format_run_failed(&self, run: u32, error: &AppError) -> String {
        let message = format!("Error in run {}: {}", run, error);
        self.colorize(&message, self.color_scheme.warning).to_string()
    }

    /// Statistics block for one configuration
    pub fn format_record(&self, record: &AggregateRecord) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "\n{}", self.bold("Test Statistics:"));

        if record.is_zero_filled() {
            let _ = writeln!(
                output,
                "{}",
                self.colorize(
                    &format!("no successful runs ({} attempted), statistics zero-filled", record.attempted_runs),
                    self.color_scheme.error
                )
            );
        } else if record.failed_runs() > 0 {
            let _ = writeln!(
                output,
                "{}",
                self.colorize(
                    &format!("{} of {} runs failed", record.failed_runs(), record.attempted_runs),
                    self.color_scheme.warning
                )
            );
        }

        self.write_summary(&mut output, "", &record.throughput, "Mbits/sec");

        if self.verbose {
            self.write_summary(&mut output, "Sender ", &record.sender, "Mbits/sec");
            if let Some(change) = &record.bitrate_change {
                self.write_summary(&mut output, "Bitrate Change ", change, "Mb/s");
            }
        }

        output.trim_end().to_string()
    }

    fn write_summary(&self, output: &mut String, prefix: &str, summary: &Summary, unit: &str) {
        for (label, value) in [
            ("Min", summary.min),
            ("Max", summary.max),
            ("Mean", summary.mean),
            ("Std", summary.std_dev),
        ] {
            let _ = writeln!(
                output,
                "{}{}: {}",
                prefix,
                label,
                self.colorize(&format!("{:.2} {}", value, unit), self.color_scheme.info)
            );
        }
    }

    /// Closing summary after the report is written
    pub fn format_session_summary(&self, results: &ResultSet, report_path: &Path) -> String {
        let mut output = String::new();
        let _ = writeln!(
            output,
            "\nResults saved to {}",
            self.bold(&report_path.display().to_string())
        );

        let zero_filled = results.zero_filled().count();
        if zero_filled > 0 {
            let _ = writeln!(
                output,
                "{}",
                self.colorize(
                    &format!("{} of {} configurations had no successful runs", zero_filled, results.len()),
                    self.color_scheme.warning
                )
            );
        }

        if self.verbose {
            if let Some(best) = results.best() {
                let _ = writeln!(
                    output,
                    "{}",
                    self.colorize(
                        &format!("Best: {} at {:.2} Mbits/sec mean", best.configuration.name(), best.mean()),
                        self.color_scheme.muted
                    )
                );
            }
        }

        output.trim_end().to_string()
    }

    pub fn configuration_started(&self, configuration: &TestConfiguration) {
        println!("{}", self.format_configuration_header(configuration));
    }

    pub fn run_started(&self, configuration: &TestConfiguration, run: u32, total: u32) {
        println!("{}", self.format_run_started(configuration, run, total));
    }

    pub fn run_succeeded(&self, run: u32, sample: &ThroughputSample) {
        println!("{}", self.format_run_succeeded(run, sample));
    }

    pub fn run_failed(&self, run: u32, error: &AppError) {
        println!("{}", self.format_run_failed(run, error));
    }

    pub fn print_record(&self, record: &AggregateRecord) {
        println!("{}", self.format_record(record));
    }

    pub fn print_session_summary(&self, results: &ResultSet, report_path: &Path) {
        println!("{}", self.format_session_summary(results, report_path));
    }
}
