//! Configuration validation utilities and rules

use crate::{
    error::Result,
    models::Config,
    types::Protocol,
};
use colored::*;
use std::net::IpAddr;

/// iperf3 runs for 10 seconds unless told otherwise
const IPERF_DEFAULT_DURATION_SECS: u64 = 10;

/// Largest UDP payload that fits a 1500 byte Ethernet MTU without fragmentation
const UDP_UNFRAGMENTED_PAYLOAD: u32 = 1472;

/// Configuration validator with advisory rules on top of [`Config::validate`]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run the hard checks, then collect warnings for risky but legal settings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_server(&config.server));
        warnings.extend(Self::validate_bandwidth(config));
        warnings.extend(Self::validate_buffer_sizes(config));
        warnings.extend(Self::validate_run_settings(config));
        warnings.extend(Self::validate_bitrate_probe(config));

        Ok(warnings)
    }

    fn validate_server(server: &str) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if let Ok(ip) = server.trim().parse::<IpAddr>() {
            if ip.is_loopback() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Server {} is a loopback address, results reflect the local stack only", ip),
                ));
            } else if ip.is_unspecified() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Server {} is the unspecified address", ip),
                ));
            }
        }

        warnings
    }

    fn validate_bandwidth(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        match config.protocol {
            Protocol::Udp if config.bandwidth_mbps > 10_000 => {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!(
                        "UDP bandwidth of {} Mbit/s is very high and will likely cause heavy packet loss",
                        config.bandwidth_mbps
                    ),
                ));
            }
            Protocol::Tcp if config.bandwidth_mbps != crate::defaults::DEFAULT_BANDWIDTH_MBPS => {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Bandwidth of {} Mbit/s is ignored for TCP tests", config.bandwidth_mbps),
                ));
            }
            _ => {}
        }

        warnings
    }

    fn validate_buffer_sizes(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        match config.protocol {
            Protocol::Udp => {
                let fragmented: Vec<String> = config
                    .buffer_sizes
                    .iter()
                    .filter(|&&size| size > UDP_UNFRAGMENTED_PAYLOAD)
                    .map(u32::to_string)
                    .collect();
                if !fragmented.is_empty() {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Info,
                        format!(
                            "UDP buffer sizes above {} bytes will be IP-fragmented on a 1500 byte MTU: {}",
                            UDP_UNFRAGMENTED_PAYLOAD,
                            fragmented.join(", ")
                        ),
                    ));
                }
            }
            Protocol::Tcp => {
                if let Some(&largest) = config.buffer_sizes.iter().max() {
                    if largest > 128 * 1024 {
                        warnings.push(ValidationWarning::new(
                            ValidationLevel::Info,
                            format!("Large buffer size of {} bytes may exceed socket buffer limits", largest),
                        ));
                    }
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        if config.buffer_sizes.iter().any(|size| !seen.insert(size)) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Buffer size list contains duplicates, those configurations will be measured twice".to_string(),
            ));
        }

        warnings
    }

    fn validate_run_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.test_count == 1 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "A single run per configuration always yields a standard deviation of 0".to_string(),
            ));
        } else if config.test_count < 3 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Test count of {} may not provide reliable statistics (recommended: >= 3)",
                    config.test_count
                ),
            ));
        } else if config.test_count > 100 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("High test count of {} will increase execution time", config.test_count),
            ));
        }

        let duration = config.duration_seconds.unwrap_or(IPERF_DEFAULT_DURATION_SECS);
        if let Some(timeout) = config.timeout_seconds {
            if timeout <= duration {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!(
                        "Timeout of {}s does not exceed the {}s test duration, most runs will time out",
                        timeout, duration
                    ),
                ));
            }
        }

        let total_runs = config.buffer_sizes.len() as u64 * config.test_count as u64;
        let estimated_minutes = total_runs * duration / 60;
        if total_runs > 500 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Configuration will perform {} runs (about {} minutes)",
                    total_runs, estimated_minutes
                ),
            ));
        } else if total_runs > 100 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Configuration will perform {} runs", total_runs),
            ));
        }

        warnings
    }

    fn validate_bitrate_probe(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.bitrate_probe && !cfg!(target_os = "linux") {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Bitrate probing relies on iwconfig, which is only available on Linux".to_string(),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
