//! Configuration data model and validation

use crate::defaults;
use crate::logging::LogFormat;
use crate::models::metrics::TestConfiguration;
use crate::types::{AppError, Protocol, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Protocol under test
    #[serde(default = "default_protocol")]
    pub protocol: Protocol,

    /// Address of the iperf3 server
    #[serde(default)]
    pub server: String,

    /// UDP target bandwidth in Mbit/s
    #[serde(default = "default_bandwidth")]
    pub bandwidth_mbps: u32,

    /// Payload lengths to test, in bytes
    #[serde(default = "default_buffer_sizes")]
    pub buffer_sizes: Vec<u32>,

    /// Number of runs per configuration
    #[serde(default = "default_test_count")]
    pub test_count: u32,

    /// Per-run test duration forwarded to the tool
    #[serde(default)]
    pub duration_seconds: Option<u64>,

    /// Per-run timeout; runs are unbounded when absent
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Path or name of the iperf3 binary
    #[serde(default = "default_iperf_path")]
    pub iperf_path: String,

    /// Directory for generated report files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Fixed report path, overrides the generated file name
    #[serde(default)]
    pub output_file: Option<PathBuf>,

    /// Probe the wireless link bitrate around each run
    #[serde(default = "default_bitrate_probe")]
    pub bitrate_probe: bool,

    /// Wireless interface queried by the bitrate probe, all when absent
    #[serde(default)]
    pub interface: Option<String>,

    /// Log line format
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            server: String::new(),
            bandwidth_mbps: default_bandwidth(),
            buffer_sizes: default_buffer_sizes(),
            test_count: default_test_count(),
            duration_seconds: None,
            timeout_seconds: None,
            iperf_path: default_iperf_path(),
            output_dir: default_output_dir(),
            output_file: None,
            bitrate_probe: default_bitrate_probe(),
            interface: None,
            log_format: default_log_format(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for a protocol and server, defaults elsewhere
    pub fn for_target<S: Into<String>>(protocol: Protocol, server: S) -> Self {
        Self {
            protocol,
            server: server.into(),
            ..Self::default()
        }
    }

    /// Get the per-run timeout as Duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        let server = self.server.trim();
        if server.is_empty() {
            return Err(AppError::validation("Server address cannot be empty"));
        }
        if server.chars().any(char::is_whitespace) {
            return Err(AppError::validation(format!("Server address '{}' must not contain whitespace", self.server)));
        }

        if self.iperf_path.trim().is_empty() {
            return Err(AppError::validation("iperf3 path cannot be empty"));
        }

        if self.buffer_sizes.is_empty() {
            return Err(AppError::validation("At least one buffer size is required"));
        }

        for &size in &self.buffer_sizes {
            if size == 0 {
                return Err(AppError::validation("Buffer size must be greater than 0"));
            }
            if size > defaults::MAX_BUFFER_SIZE {
                return Err(AppError::validation(format!(
                    "Buffer size {} exceeds the iperf3 maximum of {} bytes",
                    size,
                    defaults::MAX_BUFFER_SIZE
                )));
            }
            if self.protocol == Protocol::Udp && size > defaults::MAX_UDP_BUFFER_SIZE {
                return Err(AppError::validation(format!(
                    "UDP buffer size {} exceeds the maximum datagram payload of {} bytes",
                    size,
                    defaults::MAX_UDP_BUFFER_SIZE
                )));
            }
        }

        if self.protocol == Protocol::Udp && self.bandwidth_mbps == 0 {
            return Err(AppError::validation("UDP bandwidth must be greater than 0"));
        }

        if self.test_count == 0 {
            return Err(AppError::validation("Test count must be greater than 0"));
        }

        if self.test_count > defaults::MAX_TEST_COUNT {
            return Err(AppError::validation(format!("Test count cannot exceed {}", defaults::MAX_TEST_COUNT)));
        }

        if self.duration_seconds == Some(0) {
            return Err(AppError::validation("Duration must be greater than 0"));
        }

        if self.timeout_seconds == Some(0) {
            return Err(AppError::validation("Timeout must be greater than 0"));
        }

        if self.interface.is_some() && !self.bitrate_probe {
            return Err(AppError::validation(
                "An interface was given but bitrate probing is off; enable it with --bitrate-probe or BITRATE_PROBE=true",
            ));
        }

        Ok(())
    }

    /// Build the test matrix in buffer size order
    pub fn create_test_configurations(&self) -> Vec<TestConfiguration> {
        self.buffer_sizes
            .iter()
            .map(|&size| {
                TestConfiguration::new(self.protocol, size, self.bandwidth_mbps)
                    .with_duration(self.duration_seconds)
            })
            .collect()
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("IPERF3_PATH") {
            let path = path.trim();
            if !path.is_empty() {
                self.iperf_path = path.to_string();
            }
        }

        if let Ok(sizes) = std::env::var("BUFFER_SIZES") {
            self.buffer_sizes = parse_buffer_sizes(&sizes)?;
        }

        if let Ok(count) = std::env::var("TEST_COUNT") {
            self.test_count = count.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TEST_COUNT value '{}': {}", count, e)))?;
        }

        if let Ok(bandwidth) = std::env::var("BANDWIDTH_MBPS") {
            self.bandwidth_mbps = bandwidth.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid BANDWIDTH_MBPS value '{}': {}", bandwidth, e)))?;
        }

        if let Ok(dir) = std::env::var("OUTPUT_DIR") {
            let dir = dir.trim();
            if !dir.is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        if let Ok(probe) = std::env::var("BITRATE_PROBE") {
            self.bitrate_probe = probe.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid BITRATE_PROBE value '{}': {}", probe, e)))?;
        }

        Ok(())
    }
}

/// Parse a comma-separated list of buffer sizes.
///
/// Each item is either a single size (`1400`) or a `start:end:step` range
/// whose end is exclusive (`1000:15000:2000`).
pub fn parse_buffer_sizes(value: &str) -> Result<Vec<u32>> {
    let mut sizes = Vec::new();

    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if item.contains(':') {
            let parts: Vec<&str> = item.split(':').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(AppError::parse(format!(
                    "Invalid buffer size range '{}': expected start:end:step", item
                )));
            }
            let start: u32 = parts[0].parse()?;
            let end: u32 = parts[1].parse()?;
            let step: u32 = parts[2].parse()?;
            if step == 0 {
                return Err(AppError::parse(format!("Invalid buffer size range '{}': step must be greater than 0", item)));
            }
            if start >= end {
                return Err(AppError::parse(format!("Invalid buffer size range '{}': start must be below end", item)));
            }
            sizes.extend((start..end).step_by(step as usize));
        } else {
            sizes.push(item.parse::<u32>()
                .map_err(|e| AppError::parse(format!("Invalid buffer size '{}': {}", item, e)))?);
        }
    }

    if sizes.is_empty() {
        return Err(AppError::parse("No buffer sizes given"));
    }

    Ok(sizes)
}

// Default value functions for serde
fn default_protocol() -> Protocol {
    Protocol::Tcp
}

fn default_bandwidth() -> u32 {
    defaults::DEFAULT_BANDWIDTH_MBPS
}

fn default_buffer_sizes() -> Vec<u32> {
    defaults::DEFAULT_BUFFER_SIZES.to_vec()
}

fn default_test_count() -> u32 {
    defaults::DEFAULT_TEST_COUNT
}

fn default_iperf_path() -> String {
    defaults::DEFAULT_IPERF_BINARY.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_OUTPUT_DIR)
}

fn default_bitrate_probe() -> bool {
    defaults::DEFAULT_BITRATE_PROBE
}

fn default_log_format() -> LogFormat {
    LogFormat::Console
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}
