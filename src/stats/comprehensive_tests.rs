//! Property-based and edge case tests for throughput statistics

use super::Aggregator;
use crate::{
    models::metrics::{Summary, TestConfiguration, ThroughputSample},
    types::Protocol,
};
use proptest::collection::vec;
use proptest::prelude::*;

/// Property-based test generators
mod generators {
    use super::*;

    /// Throughput figures in a realistic Mbit/s range
    pub fn throughput() -> impl Strategy<Value = f64> {
        0.0f64..10_000.0
    }

    pub fn throughput_vectors() -> impl Strategy<Value = Vec<f64>> {
        vec(throughput(), 1..200)
    }

    pub fn configurations() -> impl Strategy<Value = TestConfiguration> {
        (
            prop_oneof![Just(Protocol::Tcp), Just(Protocol::Udp)],
            1u32..65_507,
            1u32..10_000,
        )
            .prop_map(|(protocol, buffer_size, bandwidth)| {
                TestConfiguration::new(protocol, buffer_size, bandwidth)
            })
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

mod property_tests {
    use super::*;

    proptest! {
        /// min <= mean <= max for any non-empty input
        #[test]
        fn mean_between_min_max(values in generators::throughput_vectors()) {
            let summary = Summary::from_values(&values);
            prop_assert!(summary.min <= summary.mean);
            prop_assert!(summary.mean <= summary.max);
            prop_assert_eq!(summary.count, values.len());
        }

        /// Reordering the input does not change any statistic
        #[test]
        fn statistics_independent_of_order(
            (original, shuffled) in generators::throughput_vectors()
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            let a = Summary::from_values(&original);
            let b = Summary::from_values(&shuffled);
            prop_assert_eq!(a.min, b.min);
            prop_assert_eq!(a.max, b.max);
            prop_assert!(approx_eq(a.mean, b.mean));
            prop_assert!(approx_eq(a.std_dev, b.std_dev));
        }

        #[test]
        fn standard_deviation_non_negative(values in generators::throughput_vectors()) {
            let summary = Summary::from_values(&values);
            prop_assert!(summary.std_dev >= 0.0);
            prop_assert!(summary.std_dev.is_finite());
        }

        #[test]
        fn single_value_has_zero_deviation(value in generators::throughput()) {
            let summary = Summary::from_values(&[value]);
            prop_assert_eq!(summary.std_dev, 0.0);
            prop_assert_eq!(summary.min, value);
            prop_assert_eq!(summary.max, value);
            prop_assert_eq!(summary.mean, value);
        }

        /// Aggregation keeps every sample, in order, for any configuration
        #[test]
        fn aggregate_preserves_samples(
            configuration in generators::configurations(),
            values in vec(generators::throughput(), 0..50),
            extra_failures in 0u32..5,
        ) {
            let samples: Vec<ThroughputSample> = values
                .iter()
                .map(|&v| ThroughputSample::new(v, v))
                .collect();
            let attempted = values.len() as u32 + extra_failures;
            let record = Aggregator::aggregate_samples(configuration.clone(), samples, attempted);

            prop_assert_eq!(&record.configuration, &configuration);
            prop_assert_eq!(record.throughput_values(), values.clone());
            prop_assert_eq!(record.failed_runs(), extra_failures);
            prop_assert_eq!(record.is_zero_filled(), values.is_empty());
        }
    }
}

mod edge_case_tests {
    use super::*;

    #[test]
    fn test_empty_input_is_all_zero() {
        let summary = Summary::from_values(&[]);
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.max, 0.0);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.count, 0);
    }

    #[test]
    fn test_identical_values() {
        let summary = Summary::from_values(&[94.3; 10]);
        assert_eq!(summary.min, 94.3);
        assert_eq!(summary.max, 94.3);
        assert!(approx_eq(summary.mean, 94.3));
        assert!(summary.std_dev < 1e-9);
    }

    #[test]
    fn test_two_values() {
        let summary = Summary::from_values(&[1.0, 3.0]);
        assert_eq!(summary.mean, 2.0);
        assert!((summary.std_dev - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_throughput_runs_are_not_failures() {
        // A run that reports 0 bit/s is a real measurement
        let samples = vec![ThroughputSample::new(0.0, 0.0), ThroughputSample::new(10.0, 10.0)];
        let record = Aggregator::aggregate_samples(
            TestConfiguration::new(Protocol::Udp, 1400, 50),
            samples,
            2,
        );
        assert!(!record.is_zero_filled());
        assert_eq!(record.min(), 0.0);
        assert_eq!(record.mean(), 5.0);
    }

    #[test]
    fn test_large_values() {
        let summary = Summary::from_values(&[1e12, 1e12 + 2.0]);
        assert_eq!(summary.min, 1e12);
        assert!(summary.mean >= summary.min && summary.mean <= summary.max);
        assert!(summary.std_dev.is_finite());
    }
}
