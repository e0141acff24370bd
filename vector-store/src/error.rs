//! Unified error type for the crate.

use thiserror::Error;

/// Top-level error for vector-store operations.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Embedding backend failure (unavailable or malformed output).
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Embedding came back with the wrong dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Qdrant client errors (wrapped).
    #[error("index error: {0}")]
    Index(String),

    /// Malformed retrieval input (empty question, zero k).
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}
