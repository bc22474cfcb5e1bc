//! Completion gateway port
//!
//! The dispatcher only knows this trait. The production adapter lives in
//! `infra_gateway`; tests use the stub from `test_utils`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, HealthCheckable, PortError};

/// A single-turn chat completion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    /// Opaque end-user tag forwarded to the gateway for abuse tracking
    pub end_user: Option<String>,
}

/// Token accounting reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The gateway's reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionResponse {
    /// Text of the first choice
    pub content: String,
    pub model: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: None,
            usage: None,
        }
    }
}

/// Port to a hosted language model
#[async_trait]
pub trait CompletionPort: DomainPort + HealthCheckable {
    /// Sends one completion request
    ///
    /// # Errors
    ///
    /// Upstream failures are reported as `PortError`; notably
    /// `RateLimited` for HTTP 429 and `PaymentRequired` for HTTP 402.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, PortError>;
}
