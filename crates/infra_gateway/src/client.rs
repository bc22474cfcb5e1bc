//! HTTP adapter for the chat-completions gateway

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
use domain_actions::{CompletionPort, CompletionRequest, CompletionResponse};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::GatewayConfig;
use crate::wire::{ChatMessage, ChatRequest, ChatResponse};

const SERVICE_NAME: &str = "completion-gateway";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;
const SLOW_HEALTH_CHECK: Duration = Duration::from_secs(5);

/// Chat-completions gateway client
#[derive(Debug)]
pub struct ChatGateway {
    config: GatewayConfig,
    client: Client,
    circuit_breaker: Option<CircuitBreaker>,
}

impl ChatGateway {
    /// Creates the adapter
    ///
    /// # Errors
    ///
    /// Returns `PortError::Validation` for an empty API key and
    /// `PortError::Internal` if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, PortError> {
        if config.api_key.trim().is_empty() {
            return Err(PortError::validation_field(
                "Gateway API key cannot be empty",
                "api_key",
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::internal(format!("Failed to create HTTP client: {}", e)))?;

        let circuit_breaker = config.circuit_breaker.clone().map(CircuitBreaker::new);

        Ok(Self {
            config,
            client,
            circuit_breaker,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<CompletionResponse, PortError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            user: request.end_user.as_deref(),
        };

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(map_status(response).await);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PortError::transformation(format!("Invalid gateway response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PortError::transformation("Gateway returned no choices"))?;

        Ok(CompletionResponse {
            content,
            model: parsed.model,
            usage: parsed.usage,
        })
    }

    fn map_transport_error(&self, error: reqwest::Error) -> PortError {
        if error.is_timeout() {
            PortError::Timeout {
                operation: "chat_completion".to_string(),
                duration_ms: self.config.timeout_secs * 1000,
            }
        } else if error.is_connect() {
            PortError::Connection {
                message: format!("Cannot reach {}", SERVICE_NAME),
                source: Some(Box::new(error)),
            }
        } else {
            PortError::Internal {
                message: error.to_string(),
                source: Some(Box::new(error)),
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.config.retry_delay_ms.saturating_mul(1u64 << attempt.min(16)))
    }
}

/// Maps a non-success gateway response to a port error
async fn map_status(response: Response) -> PortError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    match status {
        StatusCode::TOO_MANY_REQUESTS => PortError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        StatusCode::PAYMENT_REQUIRED => PortError::PaymentRequired {
            message: if body.is_empty() {
                "Gateway credits exhausted".to_string()
            } else {
                body
            },
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized {
            message: format!("Gateway rejected credentials ({})", status.as_u16()),
        },
        s if s.is_server_error() => PortError::unavailable(format!("{} ({})", SERVICE_NAME, s.as_u16())),
        s => PortError::internal(format!("Gateway returned {}: {}", s.as_u16(), body)),
    }
}

impl DomainPort for ChatGateway {}

#[async_trait]
impl CompletionPort for ChatGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, PortError> {
        if let Some(cb) = &self.circuit_breaker {
            if !cb.is_available().await {
                warn!("Circuit open, rejecting completion request");
                return Err(PortError::unavailable(SERVICE_NAME));
            }
        }

        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            match self.send_once(&request).await {
                Ok(response) => {
                    if let Some(cb) = &self.circuit_breaker {
                        cb.record_success();
                    }
                    info!(
                        attempts = attempt + 1,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        model = ?response.model,
                        "Completion succeeded"
                    );
                    return Ok(response);
                }
                Err(error) if error.is_retryable() => {
                    if let Some(cb) = &self.circuit_breaker {
                        cb.record_failure().await;
                    }
                    if attempt >= self.config.max_retries {
                        warn!(attempts = attempt + 1, error = %error, "Completion failed, retries exhausted");
                        return Err(error);
                    }
                    let delay = self.backoff(attempt);
                    debug!(attempt, delay_ms = delay.as_millis() as u64, error = %error, "Retrying completion");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(error = %error, "Completion failed");
                    return Err(error);
                }
            }
        }
    }
}

#[async_trait]
impl HealthCheckable for ChatGateway {
    async fn health_check(&self) -> HealthCheckResult {
        if let Some(cb) = &self.circuit_breaker {
            if cb.is_open() {
                return HealthCheckResult::new(SERVICE_NAME, AdapterHealth::Unhealthy, 0)
                    .with_message("circuit open");
            }
        }

        let started = Instant::now();
        let response = self
            .client
            .get(self.config.models_url())
            .bearer_auth(&self.config.api_key)
            .send()
            .await;
        let latency = started.elapsed();
        let latency_ms = latency.as_millis() as u64;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let status = if latency > SLOW_HEALTH_CHECK {
                    AdapterHealth::Degraded
                } else {
                    AdapterHealth::Healthy
                };
                HealthCheckResult::new(SERVICE_NAME, status, latency_ms)
            }
            Ok(resp) => HealthCheckResult::new(SERVICE_NAME, AdapterHealth::Unhealthy, latency_ms)
                .with_message(format!("status {}", resp.status().as_u16())),
            Err(e) => HealthCheckResult::new(SERVICE_NAME, AdapterHealth::Unhealthy, latency_ms)
                .with_message(e.to_string()),
        }
    }
}
