//! Gateway configuration

use core_kernel::CircuitBreakerConfig;

/// Settings for [`crate::ChatGateway`]
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL up to and including the API version, e.g. `https://llm.example.com/v1`
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Extra attempts after the first for retryable failures
    pub max_retries: u32,
    /// Backoff base; attempt `n` waits `retry_delay_ms * 2^n`
    pub retry_delay_ms: u64,
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn retry_delay_ms(mut self, delay: u64) -> Self {
        self.retry_delay_ms = delay;
        self
    }

    pub fn circuit_breaker(mut self, config: Option<CircuitBreakerConfig>) -> Self {
        self.circuit_breaker = config;
        self
    }

    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn models_url(&self) -> String {
        format!("{}/models", self.base_url.trim_end_matches('/'))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
            max_retries: 2,
            retry_delay_ms: 500,
            circuit_breaker: Some(CircuitBreakerConfig::default()),
        }
    }
}
