//! Type definitions and aliases

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Transport protocol exercised by a benchmark run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Protocol {
    /// TCP throughput test (iperf3 default mode)
    #[value(name = "TCP")]
    #[serde(rename = "TCP")]
    Tcp,
    /// UDP throughput test, rate limited by the configured bandwidth
    #[value(name = "UDP")]
    #[serde(rename = "UDP")]
    Udp,
}

impl Protocol {
    /// Upper-case name used in logs, file names and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }

    /// Whether the tool should be rate limited with a bandwidth flag
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Protocol::Udp)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            other => Err(AppError::parse(format!("Invalid protocol: {} (expected TCP or UDP)", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parsing() {
        assert_eq!("TCP".parse::<Protocol>().unwrap(), Protocol::Tcp);
        assert_eq!("udp".parse::<Protocol>().unwrap(), Protocol::Udp);
        assert_eq!(" Udp ".parse::<Protocol>().unwrap(), Protocol::Udp);
        assert!("SCTP".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_protocol_display() {
        assert_eq!(Protocol::Tcp.to_string(), "TCP");
        assert_eq!(Protocol::Udp.as_str(), "UDP");
        assert!(Protocol::Udp.is_rate_limited());
        assert!(!Protocol::Tcp.is_rate_limited());
    }

    #[test]
    fn test_protocol_serde() {
        assert_eq!(serde_json::to_string(&Protocol::Udp).unwrap(), "\"UDP\"");
        let parsed: Protocol = serde_json::from_str("\"TCP\"").unwrap();
        assert_eq!(parsed, Protocol::Tcp);
    }
}
