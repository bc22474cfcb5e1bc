//! Web Vitals Domain
//!
//! Classifies field measurements reported by the single-page frontend into
//! the three standard bands and aggregates them into an overall page status.
//!
//! # Bands
//!
//! ```text
//! value < good          -> Good
//! good <= value <= poor -> NeedsImprovement
//! value > poor          -> Poor
//! ```

pub mod metric;
pub mod rating;
pub mod report;
pub mod error;

pub use metric::{Metric, Thresholds};
pub use rating::{Rating, rate, overall_status};
pub use report::{MetricSample, RatedMetric, VitalsSummary, summarize};
pub use error::VitalsError;
