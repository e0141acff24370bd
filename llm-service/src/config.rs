//! Per-role model configuration.
//!
//! Two roles exist, matching the two Ollama endpoints the crate wraps:
//!
//! - **Generation** → the chat/completion model answering questions
//! - **Embedding**  → the embedding model vectorizing question text
//!
//! Values come from the application's configuration layer; this crate
//! only validates them.

use crate::error::{ConfigError, validate_http_endpoint, validate_range_f32};

/// Configuration for a single Ollama model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// Model identifier string (e.g. `"qwen2.5:7b-instruct"`).
    pub model: String,

    /// Inference endpoint, e.g. `http://localhost:11434`.
    pub endpoint: String,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 = deterministic).
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Builds a config for the given model/endpoint with no sampling
    /// overrides and the default client timeout.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            endpoint: endpoint.into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: None,
        }
    }

    /// Validates endpoint shape, model name, and sampling ranges.
    ///
    /// # Errors
    /// Returns [`ConfigError`] variants wrapped in [`crate::LlmError::Config`].
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_http_endpoint("OLLAMA_URL", self.endpoint.trim())?;
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_bad_endpoint() {
        let cfg = LlmModelConfig::new("localhost:11434", "qwen2.5:7b-instruct");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_model() {
        let cfg = LlmModelConfig::new("http://localhost:11434", "  ");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_temperature() {
        let mut cfg = LlmModelConfig::new("http://localhost:11434", "qwen2.5:7b-instruct");
        cfg.temperature = Some(5.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_sane_config() {
        let mut cfg = LlmModelConfig::new("http://localhost:11434", "qwen2.5:7b-instruct");
        cfg.temperature = Some(0.7);
        cfg.top_p = Some(0.9);
        cfg.max_tokens = Some(2000);
        assert!(cfg.validate().is_ok());
    }
}
