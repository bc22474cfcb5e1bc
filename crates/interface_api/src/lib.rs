//! HTTP API Layer
//!
//! This crate provides the REST API for the CRM's AI functions and web
//! vitals reporting using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: function invocation, vitals, health
//! - **Middleware**: JWT tenant authentication, audit logging, request ids
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: every failure is a `{ success: false, error }` envelope
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(dispatcher, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_actions::ActionDispatcher;

use crate::config::ApiConfig;
use crate::handlers::{functions, health, vitals};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: ActionDispatcher,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `dispatcher` - Action dispatcher bound to a completion gateway
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(dispatcher: ActionDispatcher, config: ApiConfig) -> Router {
    let state = AppState { dispatcher, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/v1/vitals", post(vitals::report_vitals));

    // AI function routes
    let function_routes = Router::new()
        .route("/", get(functions::list_functions))
        .route("/:function", post(functions::invoke_function))
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/functions/v1", function_routes)
        // Applied innermost-first so the stack is (outer -> inner):
        // CORS, set request id, trace, propagate request id.
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
