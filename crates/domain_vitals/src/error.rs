//! Vitals domain errors

use thiserror::Error;

/// Errors raised while rating web vitals
#[derive(Debug, Error, PartialEq)]
pub enum VitalsError {
    /// The metric name is not one of the tracked vitals
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// The measurement cannot be rated
    #[error("Invalid value for {metric}: {value}")]
    InvalidValue {
        metric: String,
        value: f64,
    },
}
