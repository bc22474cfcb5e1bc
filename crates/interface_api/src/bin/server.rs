//! Open CRM Core - API Server Binary
//!
//! This binary starts the HTTP API serving the CRM's AI functions and web
//! vitals reporting.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! LLM_GATEWAY_API_KEY=... cargo run --bin crm-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_GATEWAY_URL=https://gateway.example/v1 API_LOG_FORMAT=json cargo run --bin crm-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! * `API_GATEWAY_URL` - Base URL of the chat-completions gateway
//! * `API_GATEWAY_API_KEY` - Gateway key (falls back to `LLM_GATEWAY_API_KEY`)
//! * `API_GATEWAY_MODEL` - Model name (default: gpt-4o-mini)
//! * `API_GATEWAY_TIMEOUT_SECS` - Per-request timeout (default: 60)
//! * `API_GATEWAY_MAX_RETRIES` - Retries on transient failures (default: 2)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::CircuitBreakerConfig;
use domain_actions::{ActionCatalog, ActionDispatcher};
use infra_gateway::{ChatGateway, GatewayConfig};
use interface_api::config::{ApiConfig, LogFormat};
use interface_api::create_router;

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, builds the gateway client,
/// and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The gateway client cannot be built (e.g. no API key)
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        gateway = %config.gateway_url,
        model = %config.gateway_model,
        "Starting Open CRM Core API Server"
    );

    let gateway = ChatGateway::new(gateway_config(&config))
        .context("failed to build completion gateway client")?;
    let dispatcher = ActionDispatcher::new(ActionCatalog::standard(), Arc::new(gateway));

    tracing::info!(functions = dispatcher.catalog().len(), "Action catalog loaded");

    let app = create_router(dispatcher, config.clone());

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn gateway_config(config: &ApiConfig) -> GatewayConfig {
    GatewayConfig::new(config.gateway_url.clone(), config.gateway_api_key.clone())
        .model(config.gateway_model.clone())
        .timeout_secs(config.gateway_timeout_secs)
        .max_retries(config.gateway_max_retries)
        .circuit_breaker(Some(CircuitBreakerConfig::default()))
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// In-flight requests complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
