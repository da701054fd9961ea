//! Measurement data models: configurations, samples and aggregated records

use crate::types::Protocol;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// One point of the test matrix: what a single tool invocation measures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestConfiguration {
    /// Transport protocol
    pub protocol: Protocol,

    /// Payload length in bytes of each write the tool performs
    pub buffer_size: u32,

    /// Target bandwidth in Mbit/s, only forwarded for rate limited protocols
    pub bandwidth_mbps: u32,

    /// Optional test duration in seconds (tool default when absent)
    pub duration_seconds: Option<u64>,
}

impl TestConfiguration {
    /// Create a configuration with the tool's default duration
    pub fn new(protocol: Protocol, buffer_size: u32, bandwidth_mbps: u32) -> Self {
        Self {
            protocol,
            buffer_size,
            bandwidth_mbps,
            duration_seconds: None,
        }
    }

    /// Set the test duration
    pub fn with_duration(mut self, seconds: Option<u64>) -> Self {
        self.duration_seconds = seconds;
        self
    }

    /// Human-readable name for logs and console output
    pub fn name(&self) -> String {
        if self.protocol.is_rate_limited() {
            format!("{} {}B @ {}M", self.protocol, self.buffer_size, self.bandwidth_mbps)
        } else {
            format!("{} {}B", self.protocol, self.buffer_size)
        }
    }
}

/// A single successful measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputSample {
    /// Throughput seen by the receiving side (Mbit/s), the primary figure
    pub receiver_mbps: f64,

    /// Throughput reported by the sending side (Mbit/s)
    pub sender_mbps: f64,

    /// Link bitrate after the run minus before it (Mb/s), when probed
    pub bitrate_change_mbps: Option<f64>,

    /// When the run finished
    pub timestamp: DateTime<Utc>,
}

impl ThroughputSample {
    /// Create a sample without a bitrate measurement
    pub fn new(receiver_mbps: f64, sender_mbps: f64) -> Self {
        Self {
            receiver_mbps,
            sender_mbps,
            bitrate_change_mbps: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a link bitrate change
    pub fn with_bitrate_change(mut self, change_mbps: Option<f64>) -> Self {
        self.bitrate_change_mbps = change_mbps;
        self
    }
}

/// Descriptive statistics of a sequence of values
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    pub count: usize,
}

impl Summary {
    /// Calculate statistics from a sequence of values.
    ///
    /// An empty sequence yields all-zero statistics rather than an error and
    /// a single value has a standard deviation of zero.
    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();

        if count == 0 {
            return Self::empty();
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        // Rounding in the sum can push the mean a few ulps outside [min, max]
        let mean = (values.iter().sum::<f64>() / count as f64).max(min).min(max);

        let std_dev = if count > 1 {
            let sum_squared_diff: f64 = values
                .iter()
                .map(|&x| (x - mean).powi(2))
                .sum();
            (sum_squared_diff / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        Self {
            min,
            max,
            mean,
            std_dev,
            count,
        }
    }

    /// All-zero statistics
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no values contributed
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Aggregated result of all runs of one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    /// Configuration these samples were measured with
    pub configuration: TestConfiguration,

    /// Successful samples in invocation order
    pub samples: Vec<ThroughputSample>,

    /// Number of invocations attempted
    pub attempted_runs: u32,

    /// Statistics over the receiver throughput
    pub throughput: Summary,

    /// Statistics over the sender throughput
    pub sender: Summary,

    /// Statistics over the link bitrate changes, when any were probed
    pub bitrate_change: Option<Summary>,
}

impl AggregateRecord {
    /// Receiver throughput values in invocation order
    pub fn throughput_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.receiver_mbps).collect()
    }

    /// Sender throughput values in invocation order
    pub fn sender_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.sender_mbps).collect()
    }

    /// Probed bitrate changes, skipping samples without one
    pub fn bitrate_change_values(&self) -> Vec<f64> {
        self.samples.iter().filter_map(|s| s.bitrate_change_mbps).collect()
    }

    pub fn min(&self) -> f64 {
        self.throughput.min
    }

    pub fn max(&self) -> f64 {
        self.throughput.max
    }

    pub fn mean(&self) -> f64 {
        self.throughput.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.throughput.std_dev
    }

    /// Number of runs that produced no sample
    pub fn failed_runs(&self) -> u32 {
        self.attempted_runs.saturating_sub(self.samples.len() as u32)
    }

    /// True when every run failed and the statistics are zero-filled
    pub fn is_zero_filled(&self) -> bool {
        self.samples.is_empty()
    }
}
