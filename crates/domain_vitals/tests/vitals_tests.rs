//! Tests for domain_vitals

use proptest::prelude::*;

use domain_vitals::{
    overall_status, rate, summarize, Metric, MetricSample, Rating, VitalsError,
};
use test_utils::{banded_sample_strategy, metric_strategy, rating_strategy, samples_strategy};

// ============================================================================
// Threshold Tests
// ============================================================================

mod threshold_tests {
    use super::*;

    #[test]
    fn test_good_boundary_is_not_good_for_every_metric() {
        for metric in Metric::ALL {
            let t = metric.thresholds();
            assert_eq!(
                rate(metric, t.good).unwrap(),
                Rating::NeedsImprovement,
                "{} at good threshold",
                metric
            );
        }
    }

    #[test]
    fn test_poor_boundary_is_not_poor_for_every_metric() {
        for metric in Metric::ALL {
            let t = metric.thresholds();
            assert_eq!(rate(metric, t.poor).unwrap(), Rating::NeedsImprovement);
        }
    }

    #[test]
    fn test_fid_bands() {
        assert_eq!(rate(Metric::Fid, 99.9).unwrap(), Rating::Good);
        assert_eq!(rate(Metric::Fid, 150.0).unwrap(), Rating::NeedsImprovement);
        assert_eq!(rate(Metric::Fid, 301.0).unwrap(), Rating::Poor);
    }

    #[test]
    fn test_cls_bands() {
        assert_eq!(rate(Metric::Cls, 0.05).unwrap(), Rating::Good);
        assert_eq!(rate(Metric::Cls, 0.1).unwrap(), Rating::NeedsImprovement);
        assert_eq!(rate(Metric::Cls, 0.25).unwrap(), Rating::NeedsImprovement);
        assert_eq!(rate(Metric::Cls, 0.26).unwrap(), Rating::Poor);
    }

    #[test]
    fn test_inp_bands() {
        assert_eq!(rate(Metric::Inp, 0.0).unwrap(), Rating::Good);
        assert_eq!(rate(Metric::Inp, 200.0).unwrap(), Rating::NeedsImprovement);
        assert_eq!(rate(Metric::Inp, 800.0).unwrap(), Rating::Poor);
    }
}

// ============================================================================
// Aggregation Tests
// ============================================================================

mod aggregation_tests {
    use super::*;

    #[test]
    fn test_any_poor_is_poor() {
        let ratings = [Rating::Good, Rating::Poor, Rating::NeedsImprovement];
        assert_eq!(overall_status(&ratings), Rating::Poor);
    }

    #[test]
    fn test_all_good_is_good() {
        let ratings = [Rating::Good, Rating::Good];
        assert_eq!(overall_status(&ratings), Rating::Good);
    }

    #[test]
    fn test_mixed_is_needs_improvement() {
        let ratings = [Rating::Good, Rating::NeedsImprovement];
        assert_eq!(overall_status(&ratings), Rating::NeedsImprovement);
    }

    #[test]
    fn test_empty_is_good() {
        let ratings: [Rating; 0] = [];
        assert_eq!(overall_status(&ratings), Rating::Good);
    }
}

// ============================================================================
// Summary Tests
// ============================================================================

mod summary_tests {
    use super::*;

    #[test]
    fn test_summarize_rates_each_metric() {
        let samples = vec![
            MetricSample::new("LCP", 2100.0),
            MetricSample::new("cls", 0.3),
            MetricSample::new("INP", 250.0),
        ];

        let summary = summarize(&samples).unwrap();

        assert_eq!(summary.ratings.len(), 3);
        assert_eq!(summary.overall, Rating::Poor);
        let cls = summary
            .ratings
            .iter()
            .find(|r| r.metric == Metric::Cls)
            .unwrap();
        assert_eq!(cls.rating, Rating::Poor);
    }

    #[test]
    fn test_summarize_keeps_latest_duplicate() {
        let samples = vec![
            MetricSample::new("LCP", 5000.0),
            MetricSample::new("LCP", 1200.0),
        ];

        let summary = summarize(&samples).unwrap();

        assert_eq!(summary.ratings.len(), 1);
        assert_eq!(summary.ratings[0].value, 1200.0);
        assert_eq!(summary.overall, Rating::Good);
    }

    #[test]
    fn test_summarize_unknown_metric() {
        let samples = vec![MetricSample::new("FPS", 60.0)];
        let result = summarize(&samples);
        assert_eq!(result, Err(VitalsError::UnknownMetric("FPS".to_string())));
    }

    #[test]
    fn test_summary_serialization() {
        let summary = summarize(&[MetricSample::new("TTFB", 900.0)]).unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["overall"], "needs-improvement");
        assert_eq!(json["ratings"][0]["metric"], "TTFB");
        assert_eq!(json["ratings"][0]["rating"], "needs-improvement");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_rating_is_monotonic(metric in metric_strategy(), a in 0.0f64..10_000.0, b in 0.0f64..10_000.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let rank = |r: Rating| match r {
            Rating::Good => 0,
            Rating::NeedsImprovement => 1,
            Rating::Poor => 2,
        };
        prop_assert!(rank(rate(metric, low).unwrap()) <= rank(rate(metric, high).unwrap()));
    }

    #[test]
    fn prop_overall_poor_iff_any_poor(ratings in prop::collection::vec(rating_strategy(), 0..8)) {
        let overall = overall_status(&ratings);
        prop_assert_eq!(overall == Rating::Poor, ratings.contains(&Rating::Poor));
        prop_assert_eq!(overall == Rating::Good, ratings.iter().all(|r| *r == Rating::Good));
    }

    #[test]
    fn prop_banded_values_rate_into_their_band((metric, band, value) in banded_sample_strategy()) {
        prop_assert_eq!(rate(metric, value).unwrap(), band);
    }

    #[test]
    fn prop_summary_rates_every_distinct_metric(samples in samples_strategy(12)) {
        let summary = summarize(&samples).unwrap();
        let mut distinct: Vec<&str> = samples.iter().map(|s| s.name.as_str()).collect();
        distinct.sort_unstable();
        distinct.dedup();

        prop_assert_eq!(summary.ratings.len(), distinct.len());
        prop_assert_eq!(summary.overall, overall_status(summary.ratings.iter().map(|r| &r.rating)));
    }
}
