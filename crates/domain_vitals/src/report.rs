//! Summaries of a batch of measurements

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::VitalsError;
use crate::metric::Metric;
use crate::rating::{overall_status, rate, Rating};

/// A raw measurement as posted by the frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
}

impl MetricSample {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A measurement with its band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedMetric {
    pub metric: Metric,
    pub value: f64,
    pub rating: Rating,
}

/// Ratings for a page plus the aggregated status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsSummary {
    pub ratings: Vec<RatedMetric>,
    pub overall: Rating,
}

/// Rates every sample and aggregates the result
///
/// When a metric is reported more than once the last sample wins, matching
/// how the browser reports updated values for the same page view.
pub fn summarize(samples: &[MetricSample]) -> Result<VitalsSummary, VitalsError> {
    let mut latest: BTreeMap<Metric, RatedMetric> = BTreeMap::new();

    for sample in samples {
        let metric: Metric = sample.name.parse()?;
        let rating = rate(metric, sample.value)?;
        latest.insert(
            metric,
            RatedMetric {
                metric,
                value: sample.value,
                rating,
            },
        );
    }

    let ratings: Vec<RatedMetric> = latest.into_values().collect();
    let overall = overall_status(ratings.iter().map(|r| &r.rating));

    debug!(metrics = ratings.len(), overall = %overall, "Summarized web vitals");

    Ok(VitalsSummary { ratings, overall })
}
