//! Network Throughput Tester
//!
//! Drives repeated `iperf3` client runs for a set of protocol / buffer size /
//! bandwidth configurations, summarises the measured throughput of each
//! configuration and writes the summaries to a CSV report.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod runner;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{AggregateRecord, Config, Summary, TestConfiguration, ThroughputSample};
pub use runner::{BenchmarkTool, BitrateProbe, Iperf3Tool, IwconfigProbe, MeasurementRunner, RunOutcome};
pub use stats::{Aggregator, ResultSet};
pub use output::{ConsoleReporter, ReportWriter};
pub use types::Protocol;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_TEST_COUNT: u32 = 10;
    pub const DEFAULT_BANDWIDTH_MBPS: u32 = 30;
    pub const DEFAULT_BUFFER_SIZES: &[u32] = &[1000];
    pub const DEFAULT_IPERF_BINARY: &str = "iperf3";
    pub const DEFAULT_OUTPUT_DIR: &str = "iperf3_results";
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const DEFAULT_BITRATE_PROBE: bool = false;

    /// iperf3 refuses UDP payloads larger than this
    pub const MAX_UDP_BUFFER_SIZE: u32 = 65_507;
    /// iperf3's MAX_BLOCKSIZE
    pub const MAX_BUFFER_SIZE: u32 = 1024 * 1024;
    pub const MAX_TEST_COUNT: u32 = 1000;
}
