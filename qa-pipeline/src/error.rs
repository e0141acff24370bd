//! Error taxonomy for the question-answering pipeline.
//!
//! Only [`PipelineError::InvalidInput`] ever surfaces to callers of
//! `QueryPipeline::answer`; every other kind is absorbed into a
//! degraded `success=false` result so the calling layer never needs
//! error-handling logic beyond checking the flag.

use thiserror::Error;
use vector_store::VectorStoreError;

/// Failure kinds the pipeline distinguishes internally.
///
/// The user only ever sees category-specific prose; the kind drives
/// which apology text a degraded result carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed/out-of-range caller input.
    InvalidInput,
    /// Embedding backend failure.
    Embedding,
    /// Vector index failure.
    Retrieval,
    /// LLM backend failure or timeout.
    Generation,
    /// Cache read/write failure (always non-fatal).
    Cache,
}

/// Top-level error for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed/out-of-range input, the only kind surfaced to callers.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Embedding backend failure.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Vector index failure.
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    /// LLM backend failure.
    #[error("generation failed: {0}")]
    Generation(String),

    /// LLM call exceeded its timeout. Kept as a distinct variant so the
    /// degraded answer text can be chosen without string inspection.
    #[error("generation timed out: {0}")]
    GenerationTimeout(String),

    /// Cache read or write failure.
    #[error("cache error: {0}")]
    Cache(String),
}

impl PipelineError {
    /// The taxonomy category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidInput(_) => ErrorKind::InvalidInput,
            PipelineError::Embedding(_) => ErrorKind::Embedding,
            PipelineError::Retrieval(_) => ErrorKind::Retrieval,
            PipelineError::Generation(_) | PipelineError::GenerationTimeout(_) => {
                ErrorKind::Generation
            }
            PipelineError::Cache(_) => ErrorKind::Cache,
        }
    }
}

impl From<VectorStoreError> for PipelineError {
    fn from(e: VectorStoreError) -> Self {
        match e {
            VectorStoreError::Embedding(_) | VectorStoreError::VectorSizeMismatch { .. } => {
                PipelineError::Embedding(e.to_string())
            }
            VectorStoreError::InvalidQuery(msg) => PipelineError::InvalidInput(msg),
            VectorStoreError::Config(_) | VectorStoreError::Index(_) => {
                PipelineError::Retrieval(e.to_string())
            }
        }
    }
}

impl From<llm_service::LlmError> for PipelineError {
    fn from(e: llm_service::LlmError) -> Self {
        match e {
            llm_service::LlmError::Timeout(_) => PipelineError::GenerationTimeout(e.to_string()),
            other => PipelineError::Generation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_keeps_generation_kind() {
        let e = PipelineError::GenerationTimeout("60s".into());
        assert_eq!(e.kind(), ErrorKind::Generation);
    }

    #[test]
    fn vector_store_errors_split_by_category() {
        let emb: PipelineError = VectorStoreError::Embedding("down".into()).into();
        assert_eq!(emb.kind(), ErrorKind::Embedding);

        let idx: PipelineError = VectorStoreError::Index("down".into()).into();
        assert_eq!(idx.kind(), ErrorKind::Retrieval);

        let dim: PipelineError = VectorStoreError::VectorSizeMismatch { got: 2, want: 3 }.into();
        assert_eq!(dim.kind(), ErrorKind::Embedding);
    }
}
