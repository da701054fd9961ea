//! Measurement runner: repeated benchmark tool invocations per configuration
//!
//! Runs are strictly sequential. A run that fails for any reason is logged
//! and skipped; the remaining runs still execute and nothing is retried.

pub mod bitrate;
pub mod command;
pub mod iperf;

pub use bitrate::{BitrateProbe, IwconfigProbe};
pub use iperf::Iperf3Tool;

use crate::{
    error::{AppError, Result},
    logging::RunLogger,
    models::{AggregateRecord, TestConfiguration, ThroughputSample},
    output::ConsoleReporter,
    stats::Aggregator,
};
use async_trait::async_trait;

/// Throughput figures extracted from one tool invocation (Mbit/s)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolReport {
    pub sender_mbps: f64,
    pub receiver_mbps: f64,
}

/// An external benchmarking tool
#[async_trait]
pub trait BenchmarkTool: Send + Sync {
    /// Perform one measurement of `configuration`
    async fn run(&self, configuration: &TestConfiguration) -> Result<ToolReport>;

    /// Human-readable form of the invocation, for logs
    fn describe(&self, configuration: &TestConfiguration) -> String;
}

/// A run that produced no sample
#[derive(Debug)]
pub struct RunFailure {
    /// 1-based run number
    pub run: u32,
    pub error: AppError,
}

/// Everything collected for one configuration
#[derive(Debug)]
pub struct RunOutcome {
    pub configuration: TestConfiguration,
    pub attempted_runs: u32,
    /// Successful samples in invocation order
    pub samples: Vec<ThroughputSample>,
    pub failures: Vec<RunFailure>,
}

impl RunOutcome {
    pub fn success_count(&self) -> usize {
        self.samples.len()
    }

    pub fn all_failed(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Drives a benchmark tool through repeated runs of each configuration
pub struct MeasurementRunner {
    tool: Box<dyn BenchmarkTool>,
    probe: Option<Box<dyn BitrateProbe>>,
    logger: RunLogger,
    console: Option<ConsoleReporter>,
}

impl MeasurementRunner {
    /// Create a runner without bitrate probing or console progress
    pub fn new(tool: Box<dyn BenchmarkTool>, logger: RunLogger) -> Self {
        Self {
            tool,
            probe: None,
            logger,
            console: None,
        }
    }

    /// Probe the link bitrate before and after every run
    pub fn with_probe(mut self, probe: Box<dyn BitrateProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Print per-run progress to the terminal
    pub fn with_console(mut self, console: ConsoleReporter) -> Self {
        self.console = Some(console);
        self
    }

    /// Invoke the tool `runs` times for `configuration`
    pub async fn run(&self, configuration: &TestConfiguration, runs: u32) -> RunOutcome {
        let correlation_id = self.logger.log_configuration_start(configuration, runs).await;
        self.run_correlated(&correlation_id, configuration, runs).await
    }

    /// Run, aggregate and log one configuration
    pub async fn measure(&self, configuration: &TestConfiguration, runs: u32) -> AggregateRecord {
        let correlation_id = self.logger.log_configuration_start(configuration, runs).await;
        let outcome = self.run_correlated(&correlation_id, configuration, runs).await;
        let record = Aggregator::aggregate(outcome);
        self.logger.log_configuration_complete(&correlation_id, &record).await;
        record
    }

    async fn run_correlated(&self, correlation_id: &str, configuration: &TestConfiguration, runs: u32) -> RunOutcome {
        let mut samples = Vec::with_capacity(runs as usize);
        let mut failures = Vec::new();

        for run in 1..=runs {
            if let Some(console) = &self.console {
                console.run_started(configuration, run, runs);
            }
            self.logger
                .log_invocation(correlation_id, run, runs, &self.tool.describe(configuration))
                .await;

            let before = self.probe_bitrate(correlation_id, run).await;
            let result = self.tool.run(configuration).await;
            let after = match (&result, before) {
                (Ok(_), Some(_)) => self.probe_bitrate(correlation_id, run).await,
                _ => None,
            };

            match result {
                Ok(report) => {
                    let change = before.zip(after).map(|(before, after)| after - before);
                    let sample = ThroughputSample::new(report.receiver_mbps, report.sender_mbps)
                        .with_bitrate_change(change);

                    self.logger.log_sample(correlation_id, run, &sample).await;
                    if let Some(console) = &self.console {
                        console.run_succeeded(run, &sample);
                    }
                    samples.push(sample);
                }
                Err(error) => {
                    self.logger.log_run_failure(correlation_id, run, &error).await;
                    if let Some(console) = &self.console {
                        console.run_failed(run, &error);
                    }
                    failures.push(RunFailure { run, error });
                }
            }
        }

        RunOutcome {
            configuration: configuration.clone(),
            attempted_runs: runs,
            samples,
            failures,
        }
    }

    async fn probe_bitrate(&self, correlation_id: &str, run: u32) -> Option<f64> {
        let probe = self.probe.as_ref()?;
        match probe.read_bitrate().await {
            Ok(bitrate) => Some(bitrate),
            Err(error) => {
                self.logger.log_probe_failure(correlation_id, run, &error).await;
                None
            }
        }
    }
}
