//! iperf3 client invocation and JSON report parsing

use super::command::{command_line, run_command};
use super::{BenchmarkTool, ToolReport};
use crate::error::{AppError, Result};
use crate::models::{Config, TestConfiguration};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BITS_PER_MEGABIT: f64 = 1_000_000.0;

/// The subset of `iperf3 -J` output the runner relies on
#[derive(Debug, Deserialize)]
struct IperfJson {
    #[serde(default)]
    end: Option<IperfEnd>,
    /// Present when iperf3 itself reports a failure
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IperfEnd {
    #[serde(default)]
    sum_sent: Option<IperfSum>,
    #[serde(default)]
    sum_received: Option<IperfSum>,
}

#[derive(Debug, Deserialize)]
struct IperfSum {
    bits_per_second: Option<f64>,
}

/// Extract sender and receiver throughput (Mbit/s) from an iperf3 JSON report
pub fn parse_report(json: &str) -> Result<ToolReport> {
    let report: IperfJson = serde_json::from_str(json)
        .map_err(|e| AppError::tool_output(format!("Malformed iperf3 JSON: {}", e)))?;

    if let Some(error) = report.error {
        return Err(AppError::tool_output(format!("iperf3 reported: {}", error)));
    }

    let end = report.end
        .ok_or_else(|| AppError::tool_output("iperf3 report has no 'end' section"))?;

    let sender_mbps = throughput_mbps(end.sum_sent.as_ref(), "sum_sent")?;
    let receiver_mbps = throughput_mbps(end.sum_received.as_ref(), "sum_received")?;

    Ok(ToolReport {
        sender_mbps,
        receiver_mbps,
    })
}

fn throughput_mbps(sum: Option<&IperfSum>, field: &str) -> Result<f64> {
    let bits_per_second = sum
        .and_then(|s| s.bits_per_second)
        .ok_or_else(|| AppError::tool_output(format!("iperf3 report is missing end.{}.bits_per_second", field)))?;

    if !bits_per_second.is_finite() || bits_per_second < 0.0 {
        return Err(AppError::tool_output(format!(
            "iperf3 reported an invalid end.{}.bits_per_second: {}",
            field, bits_per_second
        )));
    }

    Ok(bits_per_second / BITS_PER_MEGABIT)
}

/// Best-effort error message from a failed iperf3 run
fn failure_message(stdout: &str, stderr: &str) -> String {
    if let Ok(IperfJson { error: Some(error), .. }) = serde_json::from_str::<IperfJson>(stdout) {
        return error;
    }

    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }

    let stdout = stdout.trim();
    if stdout.is_empty() {
        "no output".to_string()
    } else {
        stdout.chars().take(200).collect()
    }
}

/// Runs the external `iperf3` binary in client mode
#[derive(Debug, Clone)]
pub struct Iperf3Tool {
    program: String,
    server: String,
    timeout: Option<Duration>,
}

impl Iperf3Tool {
    /// Create a tool targeting `server`
    pub fn new<P: Into<String>, S: Into<String>>(program: P, server: S) -> Self {
        Self {
            program: program.into(),
            server: server.into(),
            timeout: None,
        }
    }

    /// Create a tool from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.iperf_path.clone(), config.server.trim()).with_timeout(config.timeout())
    }

    /// Bound every invocation by a timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Client-mode argument list for one configuration
    pub fn command_args(&self, configuration: &TestConfiguration) -> Vec<String> {
        let mut args = vec!["-c".to_string(), self.server.clone()];

        if configuration.protocol.is_rate_limited() {
            args.push("-u".to_string());
            args.push("-b".to_string());
            args.push(format!("{}M", configuration.bandwidth_mbps));
        }

        args.push("-l".to_string());
        args.push(configuration.buffer_size.to_string());

        if let Some(seconds) = configuration.duration_seconds {
            args.push("-t".to_string());
            args.push(seconds.to_string());
        }

        args.push("-J".to_string());
        args
    }
}

#[async_trait]
impl BenchmarkTool for Iperf3Tool {
    async fn run(&self, configuration: &TestConfiguration) -> Result<ToolReport> {
        let args = self.command_args(configuration);
        let output = run_command(&self.program, &args, self.timeout).await?;

        if !output.success {
            let status = output.exit_code
                .map(|code| format!("exit status {}", code))
                .unwrap_or_else(|| "terminated by signal".to_string());
            return Err(AppError::tool_invocation(format!(
                "iperf3 failed ({}): {}",
                status,
                failure_message(&output.stdout, &output.stderr)
            )));
        }

        parse_report(&output.stdout)
    }

    fn describe(&self, configuration: &TestConfiguration) -> String {
        command_line(&self.program, &self.command_args(configuration))
    }
}
