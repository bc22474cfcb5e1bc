//! API configuration

use serde::Deserialize;

/// Environment variable accepted as a fallback for the gateway key
pub const GATEWAY_KEY_FALLBACK_VAR: &str = "LLM_GATEWAY_API_KEY";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Log level
    pub log_level: String,
    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
    /// Base URL of the OpenAI-compatible completion gateway
    pub gateway_url: String,
    /// Gateway bearer key
    #[serde(default)]
    pub gateway_api_key: String,
    /// Model requested from the gateway
    pub gateway_model: String,
    /// Per-request gateway timeout in seconds
    pub gateway_timeout_secs: u64,
    /// Retries for transient gateway failures
    pub gateway_max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            gateway_url: "https://api.openai.com/v1".to_string(),
            gateway_api_key: String::new(),
            gateway_model: "gpt-4o-mini".to_string(),
            gateway_timeout_secs: 60,
            gateway_max_retries: 2,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    ///
    /// Unset variables take their default. An empty gateway key falls back
    /// to `LLM_GATEWAY_API_KEY`.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::with_prefix("API"))
    }

    /// Loads configuration from an explicit environment source
    ///
    /// A variable that is set but does not parse is an error, never a
    /// silent fallback to the default.
    pub fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let mut loaded: Self = config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", defaults.port)?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_expiration_secs", defaults.jwt_expiration_secs)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "pretty")?
            .set_default("gateway_url", defaults.gateway_url)?
            .set_default("gateway_api_key", defaults.gateway_api_key)?
            .set_default("gateway_model", defaults.gateway_model)?
            .set_default("gateway_timeout_secs", defaults.gateway_timeout_secs)?
            .set_default("gateway_max_retries", defaults.gateway_max_retries)?
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()?;

        if loaded.gateway_api_key.trim().is_empty() {
            if let Ok(key) = std::env::var(GATEWAY_KEY_FALLBACK_VAR) {
                loaded.gateway_api_key = key;
            }
        }

        Ok(loaded)
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
