//! API error handling
//!
//! Every error leaves the server as a failure envelope
//! `{ success: false, error, timestamp }` with the matching status code.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use core_kernel::PortError;
use domain_actions::{ActionError, Envelope};
use domain_vitals::VitalsError;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Rate limit exceeded, please try again later")]
    RateLimited { retry_after_secs: u64 },

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let mut response = (status, Json(Envelope::failure(self.to_string()))).into_response();

        if let ApiError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<ActionError> for ApiError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::UnknownFunction(_) => ApiError::NotFound(err.to_string()),
            ActionError::UnsupportedAction { .. }
            | ActionError::MissingField { .. }
            | ActionError::InvalidPayload(_) => ApiError::BadRequest(err.to_string()),
            ActionError::Gateway(PortError::RateLimited { retry_after_secs }) => {
                ApiError::RateLimited { retry_after_secs }
            }
            ActionError::Gateway(PortError::PaymentRequired { message }) => {
                ApiError::PaymentRequired(message)
            }
            ActionError::Gateway(other) => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<VitalsError> for ApiError {
    fn from(err: VitalsError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(_: AuthError) -> Self {
        ApiError::Unauthorized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_errors_map_to_status() {
        let cases = [
            (ActionError::UnknownFunction("x".into()), StatusCode::NOT_FOUND),
            (ActionError::unsupported("f", "a"), StatusCode::BAD_REQUEST),
            (ActionError::missing_field("a", "b"), StatusCode::BAD_REQUEST),
            (ActionError::InvalidPayload("bad".into()), StatusCode::BAD_REQUEST),
            (
                ActionError::Gateway(PortError::RateLimited { retry_after_secs: 5 }),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ActionError::Gateway(PortError::PaymentRequired { message: "out".into() }),
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                ActionError::Gateway(PortError::Unauthorized { message: "key".into() }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ActionError::Gateway(PortError::unavailable("gateway")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited { retry_after_secs: 30 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "30");
    }
}
