//! Ollama client: non-streaming generation, embeddings, health probe.
//!
//! The client is constructed once from an [`LlmModelConfig`], reuses a
//! single `reqwest::Client` with the configured timeout, and is meant to
//! be wrapped in an `Arc` and shared across all in-flight requests.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::LlmModelConfig;
use crate::error::{LlmError, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A single non-streaming completion with token-usage counters.
///
/// Ollama only reports `prompt_eval_count`/`eval_count` when the backend
/// provides them; absent counters default to 0 rather than failing.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generated text (trimmed).
    pub text: String,
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens produced by the model.
    pub completion_tokens: u32,
}

/// A serializable health snapshot for one probed endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model the client is configured for.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured probe latency in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable detail.
    pub message: String,
}

/// Thin client for one Ollama model role (generation or embedding).
pub struct OllamaClient {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    timeout: Duration,
    url_generate: String,
    url_embed: String,
    url_tags: String,
}

impl OllamaClient {
    /// Creates a new client from the given config.
    ///
    /// # Errors
    /// - [`LlmError::Config`] if the config fails validation
    /// - [`LlmError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self> {
        cfg.validate()?;

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let base = cfg.endpoint.trim().trim_end_matches('/').to_string();
        let url_generate = format!("{base}/api/generate");
        let url_embed = format!("{base}/api/embed");
        let url_tags = format!("{base}/api/tags");

        Ok(Self {
            client,
            cfg,
            timeout,
            url_generate,
            url_embed,
            url_tags,
        })
    }

    /// Configured model identifier.
    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    /// Configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Performs a **non-streaming** generation request via `/api/generate`.
    ///
    /// Mapped options: `num_predict` ← `max_tokens`, `temperature`,
    /// `top_p`, all from the client's config.
    ///
    /// # Errors
    /// - [`LlmError::Timeout`] when the configured timeout elapses
    /// - [`LlmError::HttpStatus`] for non-2xx responses
    /// - [`LlmError::Transport`] / [`LlmError::Decode`] otherwise
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str) -> Result<Completion> {
        let body = GenerateRequest::from_cfg(&self.cfg, prompt);

        debug!("POST {}", self.url_generate);
        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let resp = self.check_status(resp, &self.url_generate).await?;

        let out: GenerateResponse = resp.json().await.map_err(|e| {
            LlmError::Decode(format!("serde error: {e}; ensure `stream=false` is used"))
        })?;

        Ok(Completion {
            text: out.response.trim().to_string(),
            prompt_tokens: out.prompt_eval_count.unwrap_or(0),
            completion_tokens: out.eval_count.unwrap_or(0),
        })
    }

    /// Retrieves an embedding vector via `/api/embed`.
    ///
    /// The endpoint accepts a single `input` string and may answer with
    /// either `embedding` (legacy) or `embeddings: [[..]]`.
    ///
    /// # Errors
    /// Same failure modes as [`OllamaClient::generate`].
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        let body = EmbedRequest {
            model: &self.cfg.model,
            input,
        };

        debug!("POST {}", self.url_embed);
        let resp = self
            .client
            .post(&self.url_embed)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let resp = self.check_status(resp, &self.url_embed).await?;

        let out: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Decode(format!("serde error: {e}")))?;

        if let Some(v) = out.embedding {
            return Ok(v);
        }
        if let Some(vs) = out.embeddings {
            if let Some(first) = vs.into_iter().next() {
                return Ok(first);
            }
        }
        Err(LlmError::Decode("no embedding returned".to_string()))
    }

    /// Best-effort health probe against `GET /api/tags`.
    ///
    /// Never fails: every error is folded into `ok=false` with a message,
    /// which is the shape a `/health` endpoint wants.
    pub async fn health(&self) -> HealthSnapshot {
        let started = Instant::now();
        let result = self.client.get(&self.url_tags).send().await;
        let latency_ms = started.elapsed().as_millis();

        match result {
            Ok(resp) if resp.status().is_success() => HealthSnapshot {
                endpoint: self.cfg.endpoint.clone(),
                model: self.cfg.model.clone(),
                ok: true,
                latency_ms,
                message: "reachable".to_string(),
            },
            Ok(resp) => {
                let status = resp.status();
                warn!(%status, "ollama health probe returned non-2xx");
                HealthSnapshot {
                    endpoint: self.cfg.endpoint.clone(),
                    model: self.cfg.model.clone(),
                    ok: false,
                    latency_ms,
                    message: format!("HTTP {status}"),
                }
            }
            Err(e) => {
                warn!(error = %e, "ollama health probe failed");
                HealthSnapshot {
                    endpoint: self.cfg.endpoint.clone(),
                    model: self.cfg.model.clone(),
                    ok: false,
                    latency_ms,
                    message: e.to_string(),
                }
            }
        }
    }

    fn map_transport(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Transport(e)
        }
    }

    async fn check_status(&self, resp: reqwest::Response, url: &str) -> Result<reqwest::Response> {
        let status: StatusCode = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        let snippet = text.chars().take(240).collect::<String>();
        Err(LlmError::HttpStatus {
            status,
            url: url.to_string(),
            snippet,
        })
    }
}

/* ==========================
HTTP payloads & options
========================== */

/// Request body for `/api/generate` (non-streaming).
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

impl<'a> GenerateRequest<'a> {
    fn from_cfg(cfg: &'a LlmModelConfig, prompt: &'a str) -> Self {
        let options = GenerateOptions {
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            num_predict: cfg.max_tokens,
        };

        Self {
            model: &cfg.model,
            prompt,
            stream: false,
            options: Some(options),
        }
    }
}

/// Subset of Ollama `options`.
#[derive(Debug, Default, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Response body for `/api/generate`.
///
/// Usage counters are optional: not every backend reports them.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

/// Request body for `/api/embed`.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response body for `/api/embed` (new and legacy field names).
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Option<Vec<f32>>,
    embeddings: Option<Vec<Vec<f32>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_rejects_invalid_endpoint() {
        let cfg = LlmModelConfig::new("not-a-url", "qwen2.5:7b-instruct");
        assert!(OllamaClient::new(cfg).is_err());
    }

    #[test]
    fn generate_response_parses_usage_counters() {
        let json = r#"{"response":" hello ","prompt_eval_count":12,"eval_count":34}"#;
        let out: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(out.prompt_eval_count, Some(12));
        assert_eq!(out.eval_count, Some(34));
    }

    #[test]
    fn generate_response_tolerates_missing_counters() {
        let json = r#"{"response":"hello"}"#;
        let out: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(out.prompt_eval_count, None);
        assert_eq!(out.eval_count, None);
    }

    #[test]
    fn embed_response_accepts_both_shapes() {
        let legacy: EmbedResponse = serde_json::from_str(r#"{"embedding":[0.1,0.2]}"#).unwrap();
        assert_eq!(legacy.embedding.unwrap().len(), 2);

        let nested: EmbedResponse =
            serde_json::from_str(r#"{"embeddings":[[0.1,0.2,0.3]]}"#).unwrap();
        assert_eq!(nested.embeddings.unwrap()[0].len(), 3);
    }

    #[test]
    fn generate_request_serializes_options() {
        let mut cfg = LlmModelConfig::new("http://localhost:11434", "m");
        cfg.temperature = Some(0.7);
        cfg.max_tokens = Some(2000);
        let body = GenerateRequest::from_cfg(&cfg, "hi");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 2000);
        assert!(json["options"].get("top_p").is_none());
    }
}
