//! Web vitals DTOs

use domain_vitals::MetricSample;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct VitalsReportRequest {
    #[validate(length(min = 1, max = 64, message = "between 1 and 64 metrics required"))]
    pub metrics: Vec<MetricSample>,
    /// Page the measurements were taken on
    #[validate(length(max = 2048))]
    pub page: Option<String>,
}
