//! Completion Gateway Adapter
//!
//! Implements `domain_actions::CompletionPort` against an OpenAI-compatible
//! chat-completions endpoint.
//!
//! # Error Mapping
//!
//! - 429 -> `PortError::RateLimited` (never retried)
//! - 402 -> `PortError::PaymentRequired` (never retried)
//! - 401/403 -> `PortError::Unauthorized`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Other -> `PortError::Internal`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_gateway::{ChatGateway, GatewayConfig};
//!
//! let gateway = ChatGateway::new(GatewayConfig::new("https://llm.example.com/v1", api_key))?;
//! let dispatcher = ActionDispatcher::new(ActionCatalog::standard(), Arc::new(gateway));
//! ```

pub mod config;
pub mod circuit_breaker;
pub mod client;
pub mod wire;

pub use config::GatewayConfig;
pub use circuit_breaker::CircuitBreaker;
pub use client::ChatGateway;
