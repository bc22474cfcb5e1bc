//! AI function handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Extension, Json,
};
use tracing::info;

use domain_actions::{ActionRequest, Envelope};

use crate::auth::Claims;
use crate::dto::functions::FunctionListResponse;
use crate::middleware::request_id;
use crate::{error::ApiError, AppState};

/// Runs one action of a catalog function
///
/// The body is `{ action, ...fields }`; the reply is the success envelope
/// echoing the action.
pub async fn invoke_function(
    State(state): State<AppState>,
    Path(function): Path<String>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<Envelope>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let context = claims.context()?.with_request_id(request_id(&headers));

    let outcome = state.dispatcher.dispatch(&function, request, &context).await?;

    info!(
        function = %outcome.function,
        action = %outcome.action,
        parse_error = outcome.parse_error,
        "Function invoked"
    );

    Ok(Json(Envelope::success(outcome.action, outcome.data)))
}

/// Lists catalog functions and their actions
pub async fn list_functions(State(state): State<AppState>) -> Json<FunctionListResponse> {
    Json(FunctionListResponse::from(state.dispatcher.catalog()))
}
