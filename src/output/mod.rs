//! Result output: the CSV report file and the terminal progress display

mod console;
mod report;

pub use console::{ColorScheme, ConsoleReporter};
pub use report::{ReportWriter, BITRATE_COLUMNS, REPORT_COLUMNS};

/// Render a number in its shortest round-trip form
pub fn format_number(value: f64) -> String {
    value.to_string()
}

/// Render a sample list as `v1;v2;...`
pub fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|&v| format_number(v))
        .collect::<Vec<_>>()
        .join(";")
}
