//! Child process execution shared by the benchmark tool and the bitrate probe

use crate::error::{AppError, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured result of a finished child process
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Render a program and its arguments as a single line for logs
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a program to completion and capture its output.
///
/// Without a timeout the call waits for as long as the child runs. With one,
/// the child is killed once the timeout elapses.
pub async fn run_command(program: &str, args: &[String], timeout: Option<Duration>) -> Result<CommandOutput> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, command.output())
            .await
            .map_err(|_| AppError::timeout(format!(
                "'{}' did not finish within {}s",
                program,
                limit.as_secs()
            )))?,
        None => command.output().await,
    }
    .map_err(|e| AppError::tool_invocation(format!("Failed to start '{}': {}", program, e)))?;

    Ok(CommandOutput {
        exit_code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
