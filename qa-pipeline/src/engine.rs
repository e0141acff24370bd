//! Top-level engine: wires clients, retriever, generator and cache.

use std::sync::Arc;

use llm_service::{HealthSnapshot, OllamaClient};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use vector_store::{OllamaEmbedder, QdrantIndex, Retriever, VectorIndex, VectorStoreError};

use crate::cache::{MemoryCache, ResultCache};
use crate::cfg::{QaConfig, QaConfigError};
use crate::error::PipelineError;
use crate::generator::{AnswerGenerator, OllamaGenerator};
use crate::pipeline::QueryPipeline;
use crate::types::{AnswerResult, RetrievalOptions};

/// Startup failure while wiring the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] QaConfigError),

    #[error("llm client setup failed: {0}")]
    Llm(#[from] llm_service::LlmError),

    #[error("vector store setup failed: {0}")]
    VectorStore(#[from] VectorStoreError),
}

/// Health of the vector index side.
#[derive(Debug, Serialize)]
pub struct IndexHealth {
    pub ok: bool,
    pub collection: String,
    pub document_count: Option<u64>,
    pub message: String,
}

/// Aggregated health report for `/health`-style consumers.
///
/// Probing never fails; individual component failures show up as
/// `ok=false` entries.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub ok: bool,
    pub generation: HealthSnapshot,
    pub embedding: HealthSnapshot,
    pub index: IndexHealth,
    pub cache_enabled: bool,
}

/// Static description of the running system.
#[derive(Debug, Serialize)]
pub struct SystemStats {
    pub collection: String,
    pub document_count: Option<u64>,
    pub embedding_model: String,
    pub generation_model: String,
    pub retrieval_k: usize,
    pub similarity_threshold: f32,
    pub cache_enabled: bool,
}

/// Fully wired question-answering engine.
///
/// Construct once at startup and share behind an `Arc`; every long-lived
/// client inside is already shareable.
pub struct QaEngine {
    pipeline: QueryPipeline,
    generation_client: Arc<OllamaClient>,
    embedding_client: Arc<OllamaClient>,
    index: Arc<QdrantIndex>,
    config: QaConfig,
}

impl QaEngine {
    /// Builds every component from the given configuration.
    ///
    /// Only client construction happens here; no network calls are made,
    /// so a `connect` success does not imply the backends are reachable.
    /// Use [`QaEngine::health`] for that.
    ///
    /// # Errors
    /// [`EngineError`] when a client rejects its configuration.
    pub fn connect(config: QaConfig) -> Result<Self, EngineError> {
        let generation_client = Arc::new(OllamaClient::new(config.generation_config())?);
        let embedding_client = Arc::new(OllamaClient::new(config.embedding_config())?);
        let index = Arc::new(QdrantIndex::new(&config.vector_store_config())?);

        let embedder = Arc::new(OllamaEmbedder::new(
            embedding_client.clone(),
            config.embedding_dim,
        ));
        let retriever = Arc::new(Retriever::new(embedder, index.clone()));
        let generator = AnswerGenerator::new(Arc::new(OllamaGenerator::new(
            generation_client.clone(),
        )));

        let cache: Option<Arc<dyn ResultCache>> = if config.cache_enabled {
            Some(Arc::new(MemoryCache::new(config.cache_max_entries)))
        } else {
            None
        };

        let pipeline = QueryPipeline::new(retriever, generator, cache, config.pipeline_config());

        info!(
            collection = %config.qdrant_collection,
            generation_model = %config.ollama_model,
            embedding_model = %config.embedding_model,
            cache_enabled = config.cache_enabled,
            "qa engine wired"
        );

        Ok(Self {
            pipeline,
            generation_client,
            embedding_client,
            index,
            config,
        })
    }

    /// Loads configuration from the environment and wires the engine.
    ///
    /// # Errors
    /// Same as [`QaEngine::connect`], plus configuration loading errors.
    pub fn from_env() -> Result<Self, EngineError> {
        Ok(Self::connect(QaConfig::from_env()?)?)
    }

    /// Answers one question. See [`QueryPipeline::answer`].
    ///
    /// # Errors
    /// [`PipelineError::InvalidInput`] only.
    pub async fn answer(
        &self,
        question: &str,
        options: &RetrievalOptions,
    ) -> Result<AnswerResult, PipelineError> {
        self.pipeline.answer(question, options).await
    }

    /// Answers a batch of questions. See [`QueryPipeline::answer_batch`].
    pub async fn answer_batch(
        &self,
        questions: &[String],
        options: &RetrievalOptions,
    ) -> Vec<AnswerResult> {
        self.pipeline.answer_batch(questions, options).await
    }

    /// Probes every backend. Never fails.
    pub async fn health(&self) -> HealthReport {
        let generation = self.generation_client.health().await;
        let embedding = self.embedding_client.health().await;

        let index = match self.index.count().await {
            Ok(count) => IndexHealth {
                ok: true,
                collection: self.config.qdrant_collection.clone(),
                document_count: Some(count),
                message: "reachable".to_string(),
            },
            Err(e) => {
                warn!(error = %e, "index health probe failed");
                IndexHealth {
                    ok: false,
                    collection: self.config.qdrant_collection.clone(),
                    document_count: None,
                    message: e.to_string(),
                }
            }
        };

        HealthReport {
            ok: generation.ok && embedding.ok && index.ok,
            generation,
            embedding,
            index,
            cache_enabled: self.pipeline.cache_enabled(),
        }
    }

    /// Reports the engine's static configuration plus the current
    /// document count. A failing count probe yields `None` rather than
    /// an error.
    pub async fn stats(&self) -> SystemStats {
        let document_count = match self.index.count().await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(error = %e, "document count unavailable");
                None
            }
        };

        SystemStats {
            collection: self.config.qdrant_collection.clone(),
            document_count,
            embedding_model: self.config.embedding_model.clone(),
            generation_model: self.config.ollama_model.clone(),
            retrieval_k: self.config.retrieval_k,
            similarity_threshold: self.config.similarity_threshold,
            cache_enabled: self.pipeline.cache_enabled(),
        }
    }
}
