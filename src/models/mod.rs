//! Data models and structures for the network throughput tester

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use metrics::{AggregateRecord, Summary, TestConfiguration, ThroughputSample};
