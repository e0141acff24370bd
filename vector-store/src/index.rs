//! `VectorIndex` seam and the Qdrant-backed implementation.
//!
//! The facade concentrates all `qdrant-client` usage behind a minimal
//! API, hiding the verbose builder pattern from the rest of the
//! application.

use std::collections::BTreeMap;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{SearchPointsBuilder, Value as QValue};
use tracing::debug;

use crate::config::VectorStoreConfig;
use crate::error::VectorStoreError;
use crate::record::IndexMatch;

/// Nearest-neighbor index over stored (vector, text, metadata) tuples.
///
/// Implementations return matches nearest-first with a normalized
/// distance; callers derive similarity as `1 - distance`.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns the `k` nearest stored vectors for the query vector.
    async fn query(&self, vector: Vec<f32>, k: usize)
    -> Result<Vec<IndexMatch>, VectorStoreError>;

    /// Number of stored points (for stats/health reporting).
    async fn count(&self) -> Result<u64, VectorStoreError>;
}

/// Qdrant-backed [`VectorIndex`].
///
/// Qdrant reports a cosine *similarity* score for each hit; the facade
/// converts it to `distance = 1 - score` so every index implementation
/// shares one contract. The `text` payload field becomes the match
/// content; all remaining payload fields become ordered metadata.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
}

impl QdrantIndex {
    /// Creates a new facade from the given configuration.
    ///
    /// # Errors
    /// Returns [`VectorStoreError::Config`] if validation or client
    /// initialization fails.
    pub fn new(cfg: &VectorStoreConfig) -> Result<Self, VectorStoreError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.url);
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| VectorStoreError::Config(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
        })
    }

    /// Target collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn query(
        &self,
        vector: Vec<f32>,
        k: usize,
    ) -> Result<Vec<IndexMatch>, VectorStoreError> {
        debug!(collection = %self.collection, k, "qdrant search");

        let builder =
            SearchPointsBuilder::new(&self.collection, vector, k as u64).with_payload(true);

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| VectorStoreError::Index(e.to_string()))?;

        let mut out = Vec::with_capacity(res.result.len());
        for point in res.result.into_iter() {
            let (content, metadata) = split_payload(point.payload);
            out.push(IndexMatch {
                content,
                metadata,
                distance: 1.0 - point.score,
            });
        }

        debug!(hits = out.len(), "qdrant search completed");
        Ok(out)
    }

    async fn count(&self) -> Result<u64, VectorStoreError> {
        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| VectorStoreError::Index(e.to_string()))?;

        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }
}

/// Splits a Qdrant payload into passage text and ordered metadata.
///
/// Unsupported nested values are mapped to `Null` rather than dropped so
/// provenance keys stay visible.
fn split_payload(
    mut payload: std::collections::HashMap<String, QValue>,
) -> (String, BTreeMap<String, serde_json::Value>) {
    use qdrant_client::qdrant::value::Kind as K;

    let content = match payload.remove("text").and_then(|v| v.kind) {
        Some(K::StringValue(s)) => s,
        _ => String::new(),
    };

    let mut metadata = BTreeMap::new();
    for (key, value) in payload.drain() {
        let json = match value.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            _ => serde_json::Value::Null,
        };
        metadata.insert(key, json);
    }

    (content, metadata)
}
