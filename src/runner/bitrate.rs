//! Wireless link bitrate probing via `iwconfig`

use super::command::run_command;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static BIT_RATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Bit Rate[=:]\s*(\d+(?:\.\d+)?)\s*Mb/s").ok());

/// Source of the current link-layer bitrate (Mb/s)
#[async_trait]
pub trait BitrateProbe: Send + Sync {
    async fn read_bitrate(&self) -> Result<f64>;
}

/// Extract the first `Bit Rate=<x> Mb/s` figure from iwconfig output
pub fn parse_bitrate(output: &str) -> Option<f64> {
    BIT_RATE
        .as_ref()?
        .captures(output)
        .and_then(|captures| captures[1].parse().ok())
}

/// Reads the bitrate from `iwconfig [interface]`
#[derive(Debug, Clone)]
pub struct IwconfigProbe {
    program: String,
    interface: Option<String>,
    timeout: Duration,
}

impl IwconfigProbe {
    pub fn new() -> Self {
        Self {
            program: "iwconfig".to_string(),
            interface: None,
            timeout: Duration::from_secs(5),
        }
    }

    /// Restrict the query to one interface
    pub fn with_interface<S: Into<String>>(mut self, interface: S) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// Use a different iwconfig binary
    pub fn with_program<S: Into<String>>(mut self, program: S) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for IwconfigProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BitrateProbe for IwconfigProbe {
    async fn read_bitrate(&self) -> Result<f64> {
        let args: Vec<String> = self.interface.iter().cloned().collect();
        let output = run_command(&self.program, &args, Some(self.timeout)).await?;

        if !output.success {
            return Err(AppError::tool_invocation(format!(
                "{} exited unsuccessfully: {}",
                self.program,
                output.stderr.trim()
            )));
        }

        // iwconfig prints the interface table on stdout and "no wireless
        // extensions" lines on stderr
        parse_bitrate(&output.stdout)
            .ok_or_else(|| AppError::tool_output(format!("No 'Bit Rate' found in {} output", self.program)))
    }
}
