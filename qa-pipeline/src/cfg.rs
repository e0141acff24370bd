//! Environment-driven configuration for the whole QA stack.
//!
//! Everything is read once at startup into [`QaConfig`] and then
//! converted into the per-component configs. Variables:
//!
//! - `OLLAMA_URL` = Ollama endpoint (required)
//! - `OLLAMA_MODEL` = generation model (required)
//! - `EMBEDDING_MODEL` = embedding model (required)
//! - `EMBEDDING_DIM` = embedding vector size (required)
//! - `QDRANT_URL` = Qdrant endpoint (required)
//! - `QDRANT_API_KEY` = Qdrant API key (optional)
//! - `QDRANT_COLLECTION` = collection name, default `documents`
//! - `RETRIEVAL_K` = default top-k, default 5
//! - `SIMILARITY_THRESHOLD` = default similarity cutoff, default 0.7
//! - `CACHE_ENABLED` = `true`/`false`, default true
//! - `CACHE_TTL_SECS` = cached-answer lifetime, default 3600
//! - `CACHE_MAX_ENTRIES` = in-memory cache bound, default 1024
//! - `LLM_MAX_TOKENS` = generation cap, default 2000
//! - `LLM_TEMPERATURE` = sampling temperature, default 0.7
//! - `LLM_TIMEOUT_SECS` = per-request LLM timeout, default 300
//! - `BATCH_CONCURRENCY` = concurrent batch slots, default 4

use std::time::Duration;

use llm_service::LlmModelConfig;
use thiserror::Error;
use vector_store::VectorStoreConfig;

use crate::pipeline::{MAX_TOP_K, PipelineConfig};

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum QaConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value in {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        reason: String,
    },
}

fn must_env(name: &'static str) -> Result<String, QaConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(QaConfigError::MissingVar(name)),
    }
}

fn env_opt(name: &'static str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn must_parse<T>(name: &'static str) -> Result<T, QaConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    must_env(name)?
        .parse::<T>()
        .map_err(|e| QaConfigError::InvalidValue {
            var: name,
            reason: e.to_string(),
        })
}

fn env_or_parse<T>(name: &'static str, default: T) -> Result<T, QaConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(name) {
        Some(raw) => raw.parse::<T>().map_err(|e| QaConfigError::InvalidValue {
            var: name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Complete startup configuration.
#[derive(Debug, Clone)]
pub struct QaConfig {
    pub ollama_url: String,
    pub ollama_model: String,
    pub embedding_model: String,
    pub embedding_dim: usize,

    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub qdrant_collection: String,

    pub retrieval_k: usize,
    pub similarity_threshold: f32,

    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,

    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    pub llm_timeout_secs: u64,

    pub batch_concurrency: usize,
}

impl QaConfig {
    /// Loads and validates the configuration from the environment.
    ///
    /// # Errors
    /// [`QaConfigError`] for a missing variable or an unparsable or
    /// out-of-range value.
    pub fn from_env() -> Result<Self, QaConfigError> {
        let cfg = Self {
            ollama_url: must_env("OLLAMA_URL")?,
            ollama_model: must_env("OLLAMA_MODEL")?,
            embedding_model: must_env("EMBEDDING_MODEL")?,
            embedding_dim: must_parse("EMBEDDING_DIM")?,

            qdrant_url: must_env("QDRANT_URL")?,
            qdrant_api_key: env_opt("QDRANT_API_KEY"),
            qdrant_collection: env_opt("QDRANT_COLLECTION")
                .unwrap_or_else(|| "documents".to_string()),

            retrieval_k: env_or_parse("RETRIEVAL_K", 5usize)?,
            similarity_threshold: env_or_parse("SIMILARITY_THRESHOLD", 0.7f32)?,

            cache_enabled: env_or_parse("CACHE_ENABLED", true)?,
            cache_ttl_secs: env_or_parse("CACHE_TTL_SECS", 3600u64)?,
            cache_max_entries: env_or_parse("CACHE_MAX_ENTRIES", 1024usize)?,

            llm_max_tokens: env_or_parse("LLM_MAX_TOKENS", 2000u32)?,
            llm_temperature: env_or_parse("LLM_TEMPERATURE", 0.7f32)?,
            llm_timeout_secs: env_or_parse("LLM_TIMEOUT_SECS", 300u64)?,

            batch_concurrency: env_or_parse("BATCH_CONCURRENCY", 4usize)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), QaConfigError> {
        if self.embedding_dim == 0 {
            return Err(QaConfigError::InvalidValue {
                var: "EMBEDDING_DIM",
                reason: "must be > 0".to_string(),
            });
        }
        if !(1..=MAX_TOP_K).contains(&self.retrieval_k) {
            return Err(QaConfigError::InvalidValue {
                var: "RETRIEVAL_K",
                reason: format!("must be in 1..={MAX_TOP_K}"),
            });
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(QaConfigError::InvalidValue {
                var: "SIMILARITY_THRESHOLD",
                reason: "must be in [0, 1]".to_string(),
            });
        }
        if self.batch_concurrency == 0 {
            return Err(QaConfigError::InvalidValue {
                var: "BATCH_CONCURRENCY",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Config for the generation-side Ollama client.
    pub fn generation_config(&self) -> LlmModelConfig {
        let mut cfg = LlmModelConfig::new(&self.ollama_url, &self.ollama_model);
        cfg.max_tokens = Some(self.llm_max_tokens);
        cfg.temperature = Some(self.llm_temperature);
        cfg.timeout_secs = Some(self.llm_timeout_secs);
        cfg
    }

    /// Config for the embedding-side Ollama client.
    pub fn embedding_config(&self) -> LlmModelConfig {
        let mut cfg = LlmModelConfig::new(&self.ollama_url, &self.embedding_model);
        cfg.timeout_secs = Some(self.llm_timeout_secs);
        cfg
    }

    /// Config for the Qdrant-backed vector store.
    pub fn vector_store_config(&self) -> VectorStoreConfig {
        VectorStoreConfig {
            url: self.qdrant_url.clone(),
            api_key: self.qdrant_api_key.clone(),
            collection: self.qdrant_collection.clone(),
            embedding_dim: self.embedding_dim,
        }
    }

    /// Static pipeline knobs.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            default_k: self.retrieval_k,
            default_threshold: self.similarity_threshold,
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            batch_concurrency: self.batch_concurrency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> QaConfig {
        QaConfig {
            ollama_url: "http://localhost:11434".into(),
            ollama_model: "qwen2.5:7b-instruct".into(),
            embedding_model: "nomic-embed-text".into(),
            embedding_dim: 768,
            qdrant_url: "http://localhost:6334".into(),
            qdrant_api_key: None,
            qdrant_collection: "documents".into(),
            retrieval_k: 5,
            similarity_threshold: 0.7,
            cache_enabled: true,
            cache_ttl_secs: 3600,
            cache_max_entries: 1024,
            llm_max_tokens: 2000,
            llm_temperature: 0.7,
            llm_timeout_secs: 300,
            batch_concurrency: 4,
        }
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_knobs() {
        let mut cfg = base_config();
        cfg.retrieval_k = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = base_config();
        cfg.retrieval_k = MAX_TOP_K + 1;
        assert!(cfg.validate().is_err());

        let mut cfg = base_config();
        cfg.similarity_threshold = 1.2;
        assert!(cfg.validate().is_err());

        let mut cfg = base_config();
        cfg.batch_concurrency = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn conversions_carry_the_right_fields() {
        let cfg = base_config();

        let generation = cfg.generation_config();
        assert_eq!(generation.model, "qwen2.5:7b-instruct");
        assert_eq!(generation.max_tokens, Some(2000));

        let embedding = cfg.embedding_config();
        assert_eq!(embedding.model, "nomic-embed-text");
        assert_eq!(embedding.max_tokens, None);

        let store = cfg.vector_store_config();
        assert_eq!(store.collection, "documents");
        assert_eq!(store.embedding_dim, 768);

        let pipeline = cfg.pipeline_config();
        assert_eq!(pipeline.default_k, 5);
        assert_eq!(pipeline.cache_ttl, Duration::from_secs(3600));
    }
}
