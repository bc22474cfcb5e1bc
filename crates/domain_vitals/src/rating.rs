//! Rating of individual measurements and page-level aggregation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VitalsError;
use crate::metric::Metric;

/// Quality band of a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    Good,
    NeedsImprovement,
    Poor,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Good => "good",
            Rating::NeedsImprovement => "needs-improvement",
            Rating::Poor => "poor",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rates a single measurement
///
/// # Errors
///
/// Returns `VitalsError::InvalidValue` for NaN, infinite or negative input.
pub fn rate(metric: Metric, value: f64) -> Result<Rating, VitalsError> {
    if !value.is_finite() || value < 0.0 {
        return Err(VitalsError::InvalidValue {
            metric: metric.name().to_string(),
            value,
        });
    }

    let thresholds = metric.thresholds();
    let rating = if value < thresholds.good {
        Rating::Good
    } else if value <= thresholds.poor {
        Rating::NeedsImprovement
    } else {
        Rating::Poor
    };
    Ok(rating)
}

/// Aggregates ratings into the overall page status
///
/// Poor if any rating is poor, good only if every rating is good,
/// needs-improvement otherwise. No ratings at all counts as good.
pub fn overall_status<'a, I>(ratings: I) -> Rating
where
    I: IntoIterator<Item = &'a Rating>,
{
    let mut all_good = true;
    for rating in ratings {
        match rating {
            Rating::Poor => return Rating::Poor,
            Rating::NeedsImprovement => all_good = false,
            Rating::Good => {}
        }
    }
    if all_good {
        Rating::Good
    } else {
        Rating::NeedsImprovement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcp_boundaries() {
        assert_eq!(rate(Metric::Lcp, 2499.0).unwrap(), Rating::Good);
        assert_eq!(rate(Metric::Lcp, 2500.0).unwrap(), Rating::NeedsImprovement);
        assert_eq!(rate(Metric::Lcp, 4000.0).unwrap(), Rating::NeedsImprovement);
        assert_eq!(rate(Metric::Lcp, 4000.1).unwrap(), Rating::Poor);
    }

    #[test]
    fn test_rejects_nan() {
        assert!(rate(Metric::Cls, f64::NAN).is_err());
        assert!(rate(Metric::Cls, -0.5).is_err());
        assert!(rate(Metric::Fid, f64::INFINITY).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rating::NeedsImprovement.to_string(), "needs-improvement");
    }
}
