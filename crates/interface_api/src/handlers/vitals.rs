//! Web vitals handler

use axum::{extract::rejection::JsonRejection, Json};
use serde_json::json;
use tracing::info;
use validator::Validate;

use domain_actions::Envelope;
use domain_vitals::summarize;

use crate::dto::vitals::VitalsReportRequest;
use crate::error::ApiError;

/// Rates a batch of field measurements
pub async fn report_vitals(
    payload: Result<Json<VitalsReportRequest>, JsonRejection>,
) -> Result<Json<Envelope>, ApiError> {
    let Json(report) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    report.validate()?;

    let summary = summarize(&report.metrics)?;

    info!(
        page = report.page.as_deref().unwrap_or("-"),
        metrics = summary.ratings.len(),
        overall = %summary.overall,
        "Web vitals reported"
    );

    Ok(Json(Envelope::data(json!({
        "ratings": summary.ratings,
        "overall": summary.overall,
    }))))
}
