//! The retriever: question → filtered, ranked context documents.

use std::sync::Arc;

use tracing::debug;

use crate::embed::Embedder;
use crate::error::VectorStoreError;
use crate::index::VectorIndex;
use crate::record::ContextDocument;

/// Converts a question into a threshold-filtered, ranked context list.
///
/// Read-only: no retries and no writes at this layer; the caller
/// decides what a failure means.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    /// Wires the retriever to its embedding and index backends.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Embedding model identifier (for stats reporting).
    pub fn embedding_model(&self) -> &str {
        self.embedder.model_name()
    }

    /// Retrieves up to `k` documents with similarity `>= threshold`.
    ///
    /// Similarity is derived as `1 - distance`; the index returns matches
    /// nearest-first and the retriever does not re-sort, so ranks are
    /// stable w.r.t. index return order on ties. Zero surviving documents
    /// is a valid outcome, not an error.
    ///
    /// # Errors
    /// - [`VectorStoreError::InvalidQuery`] for an empty question or `k == 0`
    /// - [`VectorStoreError::Embedding`] / [`VectorStoreError::VectorSizeMismatch`]
    ///   when the embedder fails
    /// - [`VectorStoreError::Index`] when the index query fails
    pub async fn retrieve(
        &self,
        question: &str,
        k: usize,
        threshold: f32,
    ) -> Result<Vec<ContextDocument>, VectorStoreError> {
        if question.trim().is_empty() {
            return Err(VectorStoreError::InvalidQuery(
                "question must not be empty".to_string(),
            ));
        }
        if k == 0 {
            return Err(VectorStoreError::InvalidQuery("k must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(VectorStoreError::InvalidQuery(format!(
                "similarity threshold must be in [0, 1], got {threshold}"
            )));
        }

        let vector = self.embedder.embed(question).await?;
        let matches = self.index.query(vector, k).await?;

        let documents: Vec<ContextDocument> = matches
            .into_iter()
            .filter_map(|m| {
                let similarity = 1.0 - m.distance;
                (similarity >= threshold).then_some((m, similarity))
            })
            .enumerate()
            .map(|(i, (m, similarity))| ContextDocument {
                content: m.content,
                metadata: m.metadata,
                similarity_score: similarity,
                rank: i + 1,
            })
            .collect();

        debug!(
            retrieved = documents.len(),
            threshold, "retrieval completed"
        );
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    use crate::record::IndexMatch;

    struct FixedEmbedder {
        fail: bool,
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, VectorStoreError> {
            if self.fail {
                Err(VectorStoreError::Embedding("backend down".to_string()))
            } else {
                Ok(vec![0.1, 0.2, 0.3])
            }
        }

        fn model_name(&self) -> &str {
            "fixed-test-embedder"
        }
    }

    struct FixedIndex {
        distances: Vec<f32>,
        fail: bool,
    }

    #[async_trait]
    impl VectorIndex for FixedIndex {
        async fn query(
            &self,
            _vector: Vec<f32>,
            k: usize,
        ) -> Result<Vec<IndexMatch>, VectorStoreError> {
            if self.fail {
                return Err(VectorStoreError::Index("collection missing".to_string()));
            }
            Ok(self
                .distances
                .iter()
                .take(k)
                .enumerate()
                .map(|(i, &distance)| IndexMatch {
                    content: format!("doc-{i}"),
                    metadata: BTreeMap::new(),
                    distance,
                })
                .collect())
        }

        async fn count(&self) -> Result<u64, VectorStoreError> {
            Ok(self.distances.len() as u64)
        }
    }

    fn retriever(distances: Vec<f32>) -> Retriever {
        Retriever::new(
            Arc::new(FixedEmbedder { fail: false }),
            Arc::new(FixedIndex {
                distances,
                fail: false,
            }),
        )
    }

    #[tokio::test]
    async fn every_document_meets_threshold() {
        // Seeded xorshift keeps the test deterministic while covering
        // many distance/threshold combinations without a rand dependency.
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next_unit = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 11) as f32 / (1u64 << 53) as f32
        };

        let mut kept = 0usize;
        let mut dropped = 0usize;
        for _ in 0..16 {
            // Distances in [0, 1.2] so some similarities land below zero.
            let distances: Vec<f32> = (0..32).map(|_| next_unit() * 1.2).collect();
            let threshold = next_unit();

            let docs = retriever(distances.clone())
                .retrieve("什么是人工智能？", distances.len(), threshold)
                .await
                .unwrap();

            for doc in &docs {
                assert!(
                    doc.similarity_score >= threshold,
                    "score {} below threshold {}",
                    doc.similarity_score,
                    threshold
                );
            }
            kept += docs.len();
            dropped += distances.len() - docs.len();
        }

        // The generated cases must exercise both sides of the cut.
        assert!(kept > 0);
        assert!(dropped > 0);
    }

    #[tokio::test]
    async fn ranks_are_contiguous_after_filtering() {
        // Filtering removes the middle match; ranks must not keep gaps.
        let docs = retriever(vec![0.1, 0.8, 0.2, 0.9, 0.25])
            .retrieve("q", 5, 0.7)
            .await
            .unwrap();
        let ranks: Vec<usize> = docs.iter().map(|d| d.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert!(docs[0].similarity_score >= docs[1].similarity_score);
    }

    #[tokio::test]
    async fn distance_above_one_yields_filtered_negative_similarity() {
        let docs = retriever(vec![1.4]).retrieve("q", 1, 0.0).await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn result_length_bounded_by_k() {
        let docs = retriever(vec![0.1; 10]).retrieve("q", 3, 0.0).await.unwrap();
        assert_eq!(docs.len(), 3);
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let docs = retriever(vec![0.9, 0.95])
            .retrieve("完全不相关的问题", 5, 0.7)
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn embedder_failure_maps_to_embedding_error() {
        let r = Retriever::new(
            Arc::new(FixedEmbedder { fail: true }),
            Arc::new(FixedIndex {
                distances: vec![],
                fail: false,
            }),
        );
        let err = r.retrieve("q", 5, 0.7).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::Embedding(_)));
    }

    #[tokio::test]
    async fn index_failure_maps_to_index_error() {
        let r = Retriever::new(
            Arc::new(FixedEmbedder { fail: false }),
            Arc::new(FixedIndex {
                distances: vec![],
                fail: true,
            }),
        );
        let err = r.retrieve("q", 5, 0.7).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::Index(_)));
    }

    #[tokio::test]
    async fn rejects_empty_question_and_zero_k() {
        let r = retriever(vec![0.1]);
        assert!(matches!(
            r.retrieve("   ", 5, 0.7).await.unwrap_err(),
            VectorStoreError::InvalidQuery(_)
        ));
        assert!(matches!(
            r.retrieve("q", 0, 0.7).await.unwrap_err(),
            VectorStoreError::InvalidQuery(_)
        ));
        assert!(matches!(
            r.retrieve("q", 5, 1.5).await.unwrap_err(),
            VectorStoreError::InvalidQuery(_)
        ));
    }
}
