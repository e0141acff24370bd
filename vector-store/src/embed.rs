//! `Embedder` seam and the Ollama-backed implementation.

use std::sync::Arc;

use async_trait::async_trait;
use llm_service::OllamaClient;

use crate::error::VectorStoreError;

/// Maps a text string to a fixed-length vector.
///
/// Implement this trait to plug in a different embedding backend; the
/// retriever only ever embeds a single question per call.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, VectorStoreError>;

    /// Model identifier, for stats reporting.
    fn model_name(&self) -> &str;
}

/// Ollama embedding provider bridging to `llm-service`.
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    dim: usize,
}

impl OllamaEmbedder {
    /// Wraps a shared Ollama client, pinning the expected dimensionality.
    pub fn new(client: Arc<OllamaClient>, dim: usize) -> Self {
        Self { client, dim }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, VectorStoreError> {
        let vector = self
            .client
            .embed(text)
            .await
            .map_err(|e| VectorStoreError::Embedding(e.to_string()))?;

        if vector.len() != self.dim {
            return Err(VectorStoreError::VectorSizeMismatch {
                got: vector.len(),
                want: self.dim,
            });
        }

        Ok(vector)
    }

    fn model_name(&self) -> &str {
        self.client.model()
    }
}
