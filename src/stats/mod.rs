//! Aggregation of throughput samples into per-configuration statistics

use crate::{
    models::metrics::{AggregateRecord, Summary, TestConfiguration, ThroughputSample},
    runner::RunOutcome,
};

/// Turns the samples of one configuration into an [`AggregateRecord`]
pub struct Aggregator;

impl Aggregator {
    /// Aggregate the outcome of a measurement runner
    pub fn aggregate(outcome: RunOutcome) -> AggregateRecord {
        Self::aggregate_samples(outcome.configuration, outcome.samples, outcome.attempted_runs)
    }

    /// Aggregate samples collected for `configuration`.
    ///
    /// With no samples every statistic is zero; callers distinguish that case
    /// through [`AggregateRecord::is_zero_filled`].
    pub fn aggregate_samples(
        configuration: TestConfiguration,
        samples: Vec<ThroughputSample>,
        attempted_runs: u32,
    ) -> AggregateRecord {
        let receiver: Vec<f64> = samples.iter().map(|s| s.receiver_mbps).collect();
        let sender: Vec<f64> = samples.iter().map(|s| s.sender_mbps).collect();
        let changes: Vec<f64> = samples.iter().filter_map(|s| s.bitrate_change_mbps).collect();

        AggregateRecord {
            configuration,
            attempted_runs,
            throughput: Summary::from_values(&receiver),
            sender: Summary::from_values(&sender),
            bitrate_change: (!changes.is_empty()).then(|| Summary::from_values(&changes)),
            samples,
        }
    }
}

/// All records of one session, in configuration order
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<AggregateRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AggregateRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AggregateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any record carries link bitrate statistics
    pub fn has_bitrate_data(&self) -> bool {
        self.records.iter().any(|r| r.bitrate_change.is_some())
    }

    /// Records whose every run failed
    pub fn zero_filled(&self) -> impl Iterator<Item = &AggregateRecord> {
        self.records.iter().filter(|r| r.is_zero_filled())
    }

    /// Record with the highest mean receiver throughput, ignoring zero-filled ones
    pub fn best(&self) -> Option<&AggregateRecord> {
        self.records
            .iter()
            .filter(|r| !r.is_zero_filled())
            .max_by(|a, b| a.mean().total_cmp(&b.mean()))
    }

    /// Total number of successful samples across all records
    pub fn total_samples(&self) -> usize {
        self.records.iter().map(|r| r.samples.len()).sum()
    }
}

impl From<Vec<AggregateRecord>> for ResultSet {
    fn from(records: Vec<AggregateRecord>) -> Self {
        Self { records }
    }
}

impl IntoIterator for ResultSet {
    type Item = AggregateRecord;
    type IntoIter = std::vec::IntoIter<AggregateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}


#[cfg(test)]
mod comprehensive_tests;
