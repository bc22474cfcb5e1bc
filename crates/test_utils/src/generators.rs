//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating measurements that land in a
//! known band.

use proptest::prelude::*;

use domain_vitals::{Metric, MetricSample, Rating};

/// Strategy for any tracked metric
pub fn metric_strategy() -> impl Strategy<Value = Metric> {
    proptest::sample::select(Metric::ALL.to_vec())
}

/// Strategy for any rating band
pub fn rating_strategy() -> impl Strategy<Value = Rating> {
    prop_oneof![
        Just(Rating::Good),
        Just(Rating::NeedsImprovement),
        Just(Rating::Poor),
    ]
}

/// Strategy for a value of `metric` inside `band`
pub fn value_in_band(metric: Metric, band: Rating) -> BoxedStrategy<f64> {
    let t = metric.thresholds();
    match band {
        Rating::Good => (0.0..t.good).boxed(),
        Rating::NeedsImprovement => (t.good..=t.poor).boxed(),
        Rating::Poor => (t.poor * 1.0001 + f64::EPSILON..t.poor * 10.0 + 1.0).boxed(),
    }
}

/// Strategy for a metric, a band, and a value in that band
pub fn banded_sample_strategy() -> impl Strategy<Value = (Metric, Rating, f64)> {
    (metric_strategy(), rating_strategy())
        .prop_flat_map(|(metric, band)| value_in_band(metric, band).prop_map(move |v| (metric, band, v)))
}

/// Strategy for a batch of valid samples
pub fn samples_strategy(max: usize) -> impl Strategy<Value = Vec<MetricSample>> {
    prop::collection::vec(
        (metric_strategy(), 0.0f64..10_000.0).prop_map(|(m, v)| MetricSample::new(m.name(), v)),
        1..=max,
    )
}
