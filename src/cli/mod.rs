//! Command-line interface definition

use crate::{logging::LogFormat, types::Protocol};
use clap::Parser;
use std::path::PathBuf;

/// Network Throughput Tester - repeated iperf3 measurements summarised into CSV
#[derive(Parser, Debug, Clone)]
#[command(name = "ntt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Protocol to test
    #[arg(value_enum, ignore_case = true)]
    pub protocol: Protocol,

    /// Address of the iperf3 server
    pub server: String,

    /// UDP target bandwidth in Mbit/s [default: 30]
    #[arg(short, long, value_name = "MBPS")]
    pub bandwidth: Option<u32>,

    /// Runs per buffer size [default: 10]
    #[arg(short = 'n', long)]
    pub count: Option<u32>,

    /// Buffer sizes in bytes: comma list of N or start:end:step (end exclusive) [default: 1000]
    #[arg(short = 'l', long, value_name = "LIST")]
    pub buffer_sizes: Option<String>,

    /// Test duration in seconds passed to iperf3 (-t)
    #[arg(short = 't', long, value_name = "SECS", value_parser = parse_seconds)]
    pub duration: Option<u64>,

    /// Kill a run that takes longer than this many seconds
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub timeout: Option<u64>,

    /// Write the report to this file instead of a generated name
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory for generated report names [default: iperf3_results]
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to the iperf3 binary [default: iperf3]
    #[arg(long, value_name = "PATH")]
    pub iperf_path: Option<String>,

    /// Read the wireless link bitrate with iwconfig before and after each run
    #[arg(long)]
    pub bitrate_probe: bool,

    /// Wireless interface queried by --bitrate-probe
    #[arg(long, value_name = "IFACE")]
    pub interface: Option<String>,

    /// Log line format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

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
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.server.trim().is_empty() {
            return Err("Server address cannot be empty".to_string());
        }

        if self.bandwidth == Some(0) {
            return Err("Bandwidth must be greater than 0".to_string());
        }

        if self.count == Some(0) {
            return Err("Count must be greater than 0".to_string());
        }

        if let Some(sizes) = &self.buffer_sizes {
            crate::models::config::parse_buffer_sizes(sizes).map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Explicit color choice from the flags, `None` when neither flag is set
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        self.color_override().unwrap_or_else(supports_color)
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Configuration Summary:\n");
        summary.push_str(&format!("  Protocol: {}\n", self.protocol));
        summary.push_str(&format!("  Server: {}\n", self.server));
        if let Some(bandwidth) = self.bandwidth {
            summary.push_str(&format!("  Bandwidth: {} Mbit/s\n", bandwidth));
        }
        if let Some(count) = self.count {
            summary.push_str(&format!("  Test count: {}\n", count));
        }
        if let Some(sizes) = &self.buffer_sizes {
            summary.push_str(&format!("  Buffer sizes: {}\n", sizes));
        }
        if let Some(duration) = self.duration {
            summary.push_str(&format!("  Duration: {}s\n", duration));
        }
        if let Some(timeout) = self.timeout {
            summary.push_str(&format!("  Timeout: {}s\n", timeout));
        }
        if let Some(output) = &self.output {
            summary.push_str(&format!("  Output file: {}\n", output.display()));
        }
        summary.push_str(&format!("  Bitrate probe: {}\n", self.bitrate_probe));
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        summary
    }
}

/// Parse a positive number of seconds
fn parse_seconds(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 86_400 {
                Err("Duration cannot exceed 86400 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
pub fn supports_color() -> bool {
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

    // Default to true on Unix-like systems, false on Windows
    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_LOCK;

    #[test]
    fn test_cli_parsing_basic() {
        let cli = Cli::parse_from(&["ntt", "TCP", "192.168.1.24"]);
        assert_eq!(cli.protocol, Protocol::Tcp);
        assert_eq!(cli.server, "192.168.1.24");
        assert_eq!(cli.bandwidth, None);
        assert_eq!(cli.count, None);
        assert!(!cli.verbose);
        assert!(!cli.debug);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_protocol_is_case_insensitive() {
        let cli = Cli::parse_from(&["ntt", "udp", "10.0.0.2", "--bandwidth", "50"]);
        assert_eq!(cli.protocol, Protocol::Udp);
        assert_eq!(cli.bandwidth, Some(50));
    }

    #[test]
    fn test_invalid_protocol_rejected() {
        assert!(Cli::try_parse_from(&["ntt", "SCTP", "10.0.0.2"]).is_err());
        assert!(Cli::try_parse_from(&["ntt", "TCP"]).is_err());
        assert!(Cli::try_parse_from(&["ntt"]).is_err());
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from(&[
            "ntt",
            "UDP",
            "10.0.0.2",
            "--bandwidth", "1000",
            "--count", "5",
            "--buffer-sizes", "1000:15000:2000",
            "--duration", "5",
            "--timeout", "30",
            "--output", "out.csv",
            "--output-dir", "reports",
            "--iperf-path", "/opt/iperf3",
            "--bitrate-probe",
            "--interface", "wlan0",
            "--log-format", "json",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.bandwidth, Some(1000));
        assert_eq!(cli.count, Some(5));
        assert_eq!(cli.buffer_sizes.as_deref(), Some("1000:15000:2000"));
        assert_eq!(cli.duration, Some(5));
        assert_eq!(cli.timeout, Some(30));
        assert_eq!(cli.output, Some(PathBuf::from("out.csv")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("reports")));
        assert_eq!(cli.iperf_path.as_deref(), Some("/opt/iperf3"));
        assert!(cli.bitrate_probe);
        assert_eq!(cli.interface.as_deref(), Some("wlan0"));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(cli.debug);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_short_options() {
        let cli = Cli::parse_from(&["ntt", "UDP", "h", "-b", "40", "-n", "3", "-l", "1400", "-t", "2", "-o", "r.csv"]);
        assert_eq!(cli.bandwidth, Some(40));
        assert_eq!(cli.count, Some(3));
        assert_eq!(cli.buffer_sizes.as_deref(), Some("1400"));
        assert_eq!(cli.duration, Some(2));
        assert_eq!(cli.output, Some(PathBuf::from("r.csv")));
    }

    #[test]
    fn test_interface_parses_on_its_own() {
        // Probing may be enabled from the environment instead
        let cli = Cli::try_parse_from(&["ntt", "TCP", "h", "--interface", "wlan0"]).unwrap();
        assert_eq!(cli.interface.as_deref(), Some("wlan0"));
        assert!(!cli.bitrate_probe);
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_seconds("5"), Ok(5));
        assert_eq!(parse_seconds("86400"), Ok(86_400));
        assert!(parse_seconds("0").is_err());
        assert!(parse_seconds("86401").is_err());
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("+5").is_err());
        assert!(parse_seconds("0x10").is_err());
        assert!(parse_seconds("1.5").is_err());
    }

    #[test]
    fn test_cli_validation() {
        let cli = Cli::parse_from(&["ntt", "TCP", "h", "--color", "--no-color"]);
        assert!(cli.validate().unwrap_err().contains("--color"));

        let cli = Cli::parse_from(&["ntt", "TCP", " "]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(&["ntt", "UDP", "h", "--bandwidth", "0"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(&["ntt", "TCP", "h", "--count", "0"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(&["ntt", "TCP", "h", "--buffer-sizes", "10:5:1"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_use_colors_method() {
        let cli = Cli::parse_from(&["ntt", "TCP", "h", "--color"]);
        assert!(cli.use_colors());
        assert_eq!(cli.color_override(), Some(true));

        let cli = Cli::parse_from(&["ntt", "TCP", "h", "--no-color"]);
        assert!(!cli.use_colors());

        let cli = Cli::parse_from(&["ntt", "TCP", "h"]);
        assert_eq!(cli.color_override(), None);
    }

    #[test]
    fn test_color_support_detection() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        std::env::set_var("NO_COLOR", "1");
        assert!(!supports_color());
        std::env::remove_var("NO_COLOR");

        std::env::set_var("FORCE_COLOR", "1");
        let forced = supports_color();
        std::env::remove_var("FORCE_COLOR");
        if std::env::var("TERM").as_deref() != Ok("dumb") {
            assert!(forced);
        }
    }

    #[test]
    fn test_config_summary() {
        let cli = Cli::parse_from(&["ntt", "UDP", "10.0.0.2", "--bandwidth", "50", "--count", "3"]);
        let summary = cli.get_config_summary();

        assert!(summary.contains("Protocol: UDP"));
        assert!(summary.contains("Server: 10.0.0.2"));
        assert!(summary.contains("Bandwidth: 50 Mbit/s"));
        assert!(summary.contains("Test count: 3"));
        assert!(!summary.contains("Timeout"));
    }
}
