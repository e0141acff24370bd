//! Structured result types produced by the pipeline.
//!
//! Every field the HTTP layer may want is an explicit record member;
//! no ad hoc maps threaded through the pipeline. Cached entries are the
//! JSON form of [`AnswerResult`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vector_store::ContextDocument;

/// Per-call retrieval knobs.
///
/// `None` means "use the configured default". Immutable for the
/// duration of one `answer` call.
#[derive(Clone, Debug)]
pub struct RetrievalOptions {
    /// Number of nearest neighbors to fetch (resolved value must be `1..=20`).
    pub k: Option<usize>,
    /// Similarity cutoff in `[0, 1]`.
    pub similarity_threshold: Option<f32>,
    /// Whether to consult/populate the result cache.
    pub use_cache: bool,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            k: None,
            similarity_threshold: None,
            use_cache: true,
        }
    }
}

/// Token counters reported by the generation backend.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Builds usage with `total = prompt + completion` enforced.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Summary of one retrieval pass.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RetrievalStats {
    /// Documents that survived the threshold.
    pub retrieved_count: usize,
    /// Threshold used for this call.
    pub similarity_threshold: f32,
    /// Mean similarity of returned documents; 0 when none.
    pub avg_similarity: f32,
}

impl RetrievalStats {
    /// Computes stats over a retrieval result.
    pub fn for_documents(documents: &[ContextDocument], threshold: f32) -> Self {
        let avg_similarity = if documents.is_empty() {
            0.0
        } else {
            documents.iter().map(|d| d.similarity_score).sum::<f32>() / documents.len() as f32
        };
        Self {
            retrieved_count: documents.len(),
            similarity_threshold: threshold,
            avg_similarity,
        }
    }
}

/// Complete answer to one question.
///
/// Produced fresh per call (or reconstructed from cache) and never
/// mutated after being returned.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Whether an answer grounded in context was produced.
    pub success: bool,
    /// The (trimmed) question as processed.
    pub question: String,
    /// Answer text, or a fixed user-facing message on failure.
    pub answer: String,
    /// Grounding passages, ranked `1..=n`.
    pub context_documents: Vec<ContextDocument>,
    /// Wall time of the generation call alone, when one happened.
    pub generation_time_seconds: Option<f64>,
    /// Wall time of the whole `answer` call.
    pub total_time_seconds: f64,
    /// Generation model identifier.
    pub model_name: String,
    /// Whether this result was replayed from the cache.
    pub from_cache: bool,
    /// When the answer was computed.
    pub answered_at: DateTime<Utc>,
    /// Usage counters, when generation ran.
    pub token_usage: Option<TokenUsage>,
    /// Retrieval summary, when retrieval ran.
    pub retrieval_stats: Option<RetrievalStats>,
    /// Diagnostic detail for degraded results.
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_usage_totals_are_enforced() {
        let usage = TokenUsage::new(120, 34);
        assert_eq!(usage.total_tokens, 154);
    }

    #[test]
    fn stats_for_empty_result_average_zero() {
        let stats = RetrievalStats::for_documents(&[], 0.7);
        assert_eq!(stats.retrieved_count, 0);
        assert_eq!(stats.avg_similarity, 0.0);
        assert_eq!(stats.similarity_threshold, 0.7);
    }

    #[test]
    fn stats_average_matches_mean_similarity() {
        let doc = |score: f32, rank: usize| ContextDocument {
            content: "x".into(),
            metadata: Default::default(),
            similarity_score: score,
            rank,
        };
        let stats = RetrievalStats::for_documents(&[doc(0.9, 1), doc(0.7, 2)], 0.5);
        assert_eq!(stats.retrieved_count, 2);
        assert!((stats.avg_similarity - 0.8).abs() < 1e-6);
    }
}
