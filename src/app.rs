//! Main application orchestration and execution

use crate::{
    config::{display_config_summary, validate_config},
    error::Result,
    log_debug, log_info, log_warn,
    logging::{ErrorEventLogger, Logger, LoggerFactory},
    models::Config,
    output::{ConsoleReporter, ReportWriter},
    runner::{BenchmarkTool, BitrateProbe, Iperf3Tool, IwconfigProbe, MeasurementRunner},
    stats::ResultSet,
};
use std::path::PathBuf;

/// What a finished session produced
#[derive(Debug)]
pub struct SessionReport {
    pub results: ResultSet,
    pub report_path: PathBuf,
}

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
    runner: MeasurementRunner,
    writer: ReportWriter,
    console: ConsoleReporter,
    logger: Logger,
    error_logger: ErrorEventLogger,
}

impl App {
    /// Create an application that drives the real iperf3 binary
    pub async fn new(config: Config) -> Self {
        let tool = Box::new(Iperf3Tool::from_config(&config));
        let probe: Option<Box<dyn BitrateProbe>> = config.bitrate_probe.then(|| {
            let probe = match &config.interface {
                Some(interface) => IwconfigProbe::new().with_interface(interface.as_str()),
                None => IwconfigProbe::new(),
            };
            Box::new(probe) as Box<dyn BitrateProbe>
        });
        Self::with_tool(config, tool, probe).await
    }

    /// Create an application around any benchmark tool and optional probe
    pub async fn with_tool(
        config: Config,
        tool: Box<dyn BenchmarkTool>,
        probe: Option<Box<dyn BitrateProbe>>,
    ) -> Self {
        let factory = LoggerFactory::new(config.clone());
        let console = ConsoleReporter::from_config(&config);

        let mut runner = MeasurementRunner::new(tool, factory.create_run_logger().await)
            .with_console(console.clone());
        if let Some(probe) = probe {
            runner = runner.with_probe(probe);
        }

        Self {
            writer: ReportWriter::from_config(&config),
            logger: factory.create_logger("APP").await,
            error_logger: factory.create_error_logger().await,
            runner,
            console,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Measure every configuration, then write the report.
    ///
    /// Failed runs never abort the session; only a report write failure does.
    pub async fn run(&self) -> Result<SessionReport> {
        let warnings = validate_config(&self.config)?;

        if self.config.debug {
            println!("\nConfiguration Summary:");
            println!("{}", display_config_summary(&self.config));
        }

        if !warnings.is_empty() {
            println!("\nConfiguration Warnings:");
            for warning in &warnings {
                println!("  {}", warning.format(self.config.enable_color));
            }
        }

        let configurations = self.config.create_test_configurations();
        log_info!(
            self.logger,
            "Starting {} test against {}: {} configuration(s), {} run(s) each",
            self.config.protocol,
            self.config.server,
            configurations.len(),
            self.config.test_count
        );

        let mut results = ResultSet::new();
        for configuration in &configurations {
            self.console.configuration_started(configuration);

            let record = self.runner.measure(configuration, self.config.test_count).await;
            self.console.print_record(&record);
            results.push(record);
        }

        let zero_filled = results.zero_filled().count();
        if zero_filled > 0 {
            log_warn!(
                self.logger,
                "{} of {} configuration(s) had no successful runs",
                zero_filled,
                results.len()
            );
        }

        let report_path = match self.writer.write(results.records()) {
            Ok(path) => path,
            Err(error) => {
                self.error_logger.log_error(&error, Some("Writing report")).await;
                return Err(error);
            }
        };
        log_debug!(self.logger, "Report written to {}", report_path.display());

        self.console.print_session_summary(&results, &report_path);

        Ok(SessionReport { results, report_path })
    }
}
