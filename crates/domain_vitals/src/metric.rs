//! Tracked metrics and their thresholds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VitalsError;

/// A web-vitals metric reported by the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Metric {
    /// Largest Contentful Paint (ms)
    Lcp,
    /// First Input Delay (ms)
    Fid,
    /// Cumulative Layout Shift (unitless)
    Cls,
    /// Interaction to Next Paint (ms)
    Inp,
    /// First Contentful Paint (ms)
    Fcp,
    /// Time to First Byte (ms)
    Ttfb,
}

/// Band boundaries for a metric
///
/// `good` is exclusive and `poor` is inclusive: a value equal to `good`
/// already needs improvement, a value equal to `poor` is not yet poor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub good: f64,
    pub poor: f64,
}

impl Metric {
    /// All tracked metrics
    pub const ALL: [Metric; 6] = [
        Metric::Lcp,
        Metric::Fid,
        Metric::Cls,
        Metric::Inp,
        Metric::Fcp,
        Metric::Ttfb,
    ];

    /// Returns the band boundaries for this metric
    pub fn thresholds(&self) -> Thresholds {
        match self {
            Metric::Lcp => Thresholds { good: 2500.0, poor: 4000.0 },
            Metric::Fid => Thresholds { good: 100.0, poor: 300.0 },
            Metric::Cls => Thresholds { good: 0.1, poor: 0.25 },
            Metric::Inp => Thresholds { good: 200.0, poor: 500.0 },
            Metric::Fcp => Thresholds { good: 1800.0, poor: 3000.0 },
            Metric::Ttfb => Thresholds { good: 800.0, poor: 1800.0 },
        }
    }

    /// Short name as reported by the browser
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Lcp => "LCP",
            Metric::Fid => "FID",
            Metric::Cls => "CLS",
            Metric::Inp => "INP",
            Metric::Fcp => "FCP",
            Metric::Ttfb => "TTFB",
        }
    }

    /// Unit of the raw measurement
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Cls => "score",
            _ => "ms",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = VitalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VitalsError::UnknownMetric(s.to_string()))
    }
}
