//! Structured logging for measurement sessions
//!
//! Every line carries the session id. The lines written while one
//! configuration is measured also share a correlation id, so the runs of a
//! configuration can be followed through the log as a group.

use crate::error::AppError;
use crate::models::{AggregateRecord, Config, TestConfiguration, ThroughputSample};
use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Severity of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn color(&self) -> Color {
        match self {
            LogLevel::Debug => Color::Cyan,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    /// Lowest level printed: debug with `--debug`, info with `--verbose`,
    /// otherwise only warnings and errors
    pub fn threshold(config: &Config) -> Self {
        if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        }
    }
}

/// One structured log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub logger: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// `file:line` of the call site, set by the `log_*!` macros
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// One JSON object per line
    Json,
    /// Compact single-line format
    Compact,
}

#[derive(Debug, Default)]
struct SessionContext {
    session_id: Option<String>,
    correlation_id: Option<String>,
}

/// Named logger writing warnings and errors to stderr, the rest to stdout
pub struct Logger {
    name: String,
    min_level: LogLevel,
    format: LogFormat,
    use_color: bool,
    with_location: bool,
    context: Arc<RwLock<SessionContext>>,
}

impl Logger {
    pub fn with_config(name: &str, config: &Config) -> Self {
        Self {
            name: name.to_string(),
            min_level: LogLevel::threshold(config),
            format: config.log_format,
            use_color: config.enable_color,
            with_location: config.debug,
            context: Arc::new(RwLock::new(SessionContext::default())),
        }
    }

    pub async fn set_session_id(&self, session_id: String) {
        self.context.write().await.session_id = Some(session_id);
    }

    /// Open a correlation scope; lines without an explicit id inherit it
    pub async fn begin_correlation(&self) -> String {
        let correlation_id = Uuid::new_v4().simple().to_string();
        self.context.write().await.correlation_id = Some(correlation_id.clone());
        correlation_id
    }

    /// Close the scope opened by `begin_correlation`. Other ids are ignored.
    pub async fn end_correlation(&self, correlation_id: &str) {
        let mut context = self.context.write().await;
        if context.correlation_id.as_deref() == Some(correlation_id) {
            context.correlation_id = None;
        }
    }

    fn entry<S: Into<String>>(&self, level: LogLevel, message: S) -> EntryBuilder<'_> {
        EntryBuilder {
            logger: self,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                logger: self.name.clone(),
                message: message.into(),
                correlation_id: None,
                fields: BTreeMap::new(),
                location: None,
            },
        }
    }

    pub fn debug<S: Into<String>>(&self, message: S) -> EntryBuilder<'_> {
        self.entry(LogLevel::Debug, message)
    }

    pub fn info<S: Into<String>>(&self, message: S) -> EntryBuilder<'_> {
        self.entry(LogLevel::Info, message)
    }

    pub fn warn<S: Into<String>>(&self, message: S) -> EntryBuilder<'_> {
        self.entry(LogLevel::Warn, message)
    }

    pub fn error<S: Into<String>>(&self, message: S) -> EntryBuilder<'_> {
        self.entry(LogLevel::Error, message)
    }

    async fn emit(&self, mut entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }

        {
            let context = self.context.read().await;
            if let Some(session_id) = &context.session_id {
                entry.fields.insert("session_id".to_string(), session_id.clone().into());
            }
            if entry.correlation_id.is_none() {
                entry.correlation_id = context.correlation_id.clone();
            }
        }

        let line = self.render(&entry);
        if entry.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr(), "{}", line);
        } else {
            let _ = writeln!(io::stdout(), "{}", line);
        }
    }

    /// Render an entry in the configured format
    pub fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.render_console(entry),
            LogFormat::Json => serde_json::to_string(entry).unwrap_or_else(|_| {
                serde_json::json!({ "level": entry.level.as_str(), "message": entry.message }).to_string()
            }),
            LogFormat::Compact => format!(
                "{} {} {}: {}",
                entry.timestamp.format("%H:%M:%S"),
                &entry.level.as_str()[..1],
                entry.logger,
                entry.message
            ),
        }
    }

    fn render_console(&self, entry: &LogEntry) -> String {
        let level = format!("{:>5}", entry.level.as_str());
        let level = if self.use_color {
            level.color(entry.level.color()).to_string()
        } else {
            level
        };

        let mut line = format!(
            "{} {} [{}] {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            level,
            entry.logger,
            entry.message
        );

        if let Some(id) = &entry.correlation_id {
            line.push_str(&format!(" [{}]", id.get(..8).unwrap_or(id.as_str())));
        }

        if !entry.fields.is_empty() {
            let fields: Vec<String> = entry.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            line.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        if self.with_location {
            if let Some(location) = &entry.location {
                line.push_str(&format!(" @ {}", location));
            }
        }

        line
    }
}

/// Adds fields to a pending log line
pub struct EntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl EntryBuilder<'_> {
    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32) -> Self {
        self.entry.location = Some(format!("{}:{}", file, line));
        self
    }

    pub fn configuration(self, configuration: &TestConfiguration) -> Self {
        self.field("protocol", configuration.protocol.as_str())
            .field("buffer_size", configuration.buffer_size)
            .field("bandwidth_mbps", configuration.bandwidth_mbps)
            .field("duration_seconds", configuration.duration_seconds)
    }

    pub fn sample(self, sample: &ThroughputSample) -> Self {
        self.field("receiver_mbps", sample.receiver_mbps)
            .field("sender_mbps", sample.sender_mbps)
            .field("bitrate_change_mbps", sample.bitrate_change_mbps)
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
    }

    pub async fn log(self) {
        self.logger.emit(self.entry).await;
    }
}

/// Events of the measurement loop, one correlation id per configuration
pub struct RunLogger {
    logger: Logger,
}

impl RunLogger {
    pub fn new(config: &Config) -> Self {
        Self { logger: Logger::with_config("RUN", config) }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Returns the correlation id for the configuration's remaining events
    pub async fn log_configuration_start(&self, configuration: &TestConfiguration, runs: u32) -> String {
        let correlation_id = self.logger.begin_correlation().await;

        self.logger
            .info(format!("Testing {} with {} run(s)", configuration.name(), runs))
            .correlation_id(&correlation_id)
            .configuration(configuration)
            .field("runs", runs)
            .log()
            .await;

        correlation_id
    }

    pub async fn log_invocation(&self, correlation_id: &str, run: u32, total: u32, command_line: &str) {
        self.logger
            .debug(format!("Run {}/{}: {}", run, total, command_line))
            .correlation_id(correlation_id)
            .field("run", run)
            .log()
            .await;
    }

    pub async fn log_sample(&self, correlation_id: &str, run: u32, sample: &ThroughputSample) {
        self.logger
            .info(format!("Run {} throughput: {:.2} Mbits/sec", run, sample.receiver_mbps))
            .correlation_id(correlation_id)
            .field("run", run)
            .sample(sample)
            .log()
            .await;
    }

    pub async fn log_run_failure(&self, correlation_id: &str, run: u32, error: &AppError) {
        self.logger
            .warn(format!("Run {} skipped: {}", run, error))
            .correlation_id(correlation_id)
            .field("run", run)
            .error_info(error)
            .log()
            .await;
    }

    pub async fn log_probe_failure(&self, correlation_id: &str, run: u32, error: &AppError) {
        self.logger
            .warn(format!("Bitrate probe failed around run {}: {}", run, error))
            .correlation_id(correlation_id)
            .field("run", run)
            .error_info(error)
            .log()
            .await;
    }

    /// Logs the aggregate and closes the configuration's correlation scope
    pub async fn log_configuration_complete(&self, correlation_id: &str, record: &AggregateRecord) {
        let name = record.configuration.name();

        let builder = if record.is_zero_filled() {
            self.logger.warn(format!(
                "No successful runs for {} ({} attempted); statistics zero-filled",
                name, record.attempted_runs
            ))
        } else {
            self.logger
                .info(format!(
                    "{}: mean={:.2} Mbits/sec over {}/{} runs",
                    name,
                    record.mean(),
                    record.samples.len(),
                    record.attempted_runs
                ))
                .field("min_mbps", record.min())
                .field("max_mbps", record.max())
                .field("mean_mbps", record.mean())
                .field("std_mbps", record.std_dev())
        };

        builder
            .correlation_id(correlation_id)
            .configuration(&record.configuration)
            .field("attempted_runs", record.attempted_runs)
            .field("sample_count", record.samples.len())
            .log()
            .await;

        self.logger.end_correlation(correlation_id).await;
    }
}

/// Logs errors that end the session
pub struct ErrorEventLogger {
    logger: Logger,
}

impl ErrorEventLogger {
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn log_error(&self, error: &AppError, context: Option<&str>) {
        let message = match context {
            Some(context) => format!("{}: {}", context, error),
            None => error.to_string(),
        };

        let mut builder = self.logger.error(message).error_info(error).field("exit_code", error.exit_code());
        if let Some(context) = context {
            builder = builder.field("context", context);
        }
        builder.log().await;
    }
}

/// Hands out loggers that share one session id
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name, &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_run_logger(&self) -> RunLogger {
        RunLogger { logger: self.create_logger("RUN").await }
    }

    pub async fn create_error_logger(&self) -> ErrorEventLogger {
        ErrorEventLogger { logger: self.create_logger("ERR").await }
    }
}

/// Logging macros that record the call site
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(format!($($arg)*))
            .location(file!(), line!())
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(format!($($arg)*))
            .location(file!(), line!())
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(format!($($arg)*))
            .location(file!(), line!())
            .log()
            .await
    };
}
