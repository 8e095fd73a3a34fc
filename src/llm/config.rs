//! LLM client configuration

use std::time::Duration;

/// Default completion endpoint of the local model server
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/llm";

/// Configuration for the LLM client
#[derive(Clone, Debug)]
pub struct LlmConfig {
    /// Completion endpoint (`POST`); `{endpoint}/health` is probed at startup
    pub endpoint: String,

    /// Maximum tokens to generate per response
    pub max_tokens: u32,

    /// Temperature for sampling (0.0 = deterministic, 1.0+ = creative)
    pub temperature: f32,

    /// Timeout for a completion request
    pub request_timeout: Duration,

    /// Timeout for the startup health probe
    pub health_timeout: Duration,

    /// Name the assistant speaks under in prompts
    pub assistant_name: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_tokens: 150,
            temperature: 0.7,
            request_timeout: Duration::from_secs(30),
            health_timeout: Duration::from_secs(5),
            assistant_name: "JARVIS".to_string(),
        }
    }
}

impl LlmConfig {
    /// Create a new configuration for the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the health probe timeout
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Set the assistant name used in prompts
    pub fn with_assistant_name(mut self, name: impl Into<String>) -> Self {
        self.assistant_name = name.into();
        self
    }

    /// URL of the health check
    pub fn health_url(&self) -> String {
        format!("{}/health", self.endpoint.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.max_tokens, 150);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.assistant_name, "JARVIS");
    }

    #[test]
    fn test_builder_pattern() {
        let config = LlmConfig::new("http://127.0.0.1:9000/v1/")
            .with_max_tokens(64)
            .with_temperature(0.2)
            .with_assistant_name("FRIDAY");

        assert_eq!(config.max_tokens, 64);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.assistant_name, "FRIDAY");
        assert_eq!(config.health_url(), "http://127.0.0.1:9000/v1/health");
    }
}
