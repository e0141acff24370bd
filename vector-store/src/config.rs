//! Runtime and collection configuration.

use crate::error::VectorStoreError;

/// Configuration for vector retrieval.
///
/// Cosine is the only distance used by the deployment; the index facade
/// converts Qdrant's cosine similarity into a normalized distance so the
/// retriever owns a single similarity definition.
#[derive(Clone, Debug)]
pub struct VectorStoreConfig {
    /// Qdrant endpoint, e.g. `http://localhost:6334`.
    pub url: String,
    /// Optional API key for Qdrant Cloud.
    pub api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Expected embedding dimensionality.
    pub embedding_dim: usize,
}

impl VectorStoreConfig {
    /// Creates a config for a given endpoint and collection name.
    pub fn new(
        url: impl Into<String>,
        collection: impl Into<String>,
        embedding_dim: usize,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            collection: collection.into(),
            embedding_dim,
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), VectorStoreError> {
        if self.url.trim().is_empty() {
            return Err(VectorStoreError::Config("url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(VectorStoreError::Config("collection is empty".into()));
        }
        if self.embedding_dim == 0 {
            return Err(VectorStoreError::Config("embedding_dim must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_fields() {
        assert!(VectorStoreConfig::new("", "docs", 1024).validate().is_err());
        assert!(
            VectorStoreConfig::new("http://localhost:6334", "", 1024)
                .validate()
                .is_err()
        );
        assert!(
            VectorStoreConfig::new("http://localhost:6334", "docs", 0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn validate_accepts_sane_config() {
        let cfg = VectorStoreConfig::new("http://localhost:6334", "rag_documents", 1024);
        assert!(cfg.validate().is_ok());
    }
}
