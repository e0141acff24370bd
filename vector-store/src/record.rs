//! Shared record types used across retrieval.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A raw nearest-neighbor match as the index returns it.
///
/// `distance` is normalized to `[0, 1]` for well-behaved embeddings;
/// values above 1 produce negative similarities downstream, which any
/// non-negative threshold then filters out.
#[derive(Clone, Debug)]
pub struct IndexMatch {
    /// Stored passage text.
    pub content: String,
    /// Remaining payload fields (provenance: source file, chunk index, ...).
    pub metadata: BTreeMap<String, Value>,
    /// Normalized distance to the query vector (lower = closer).
    pub distance: f32,
}

/// A retrieved passage handed to the generator as grounding.
///
/// Invariants within one retrieval result:
/// - `similarity_score >= threshold` used for the call
/// - `rank` values are exactly `1..=len`, in descending-similarity order
///   (stable w.r.t. index return order on ties)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContextDocument {
    /// Passage text.
    pub content: String,
    /// Ordered provenance fields carried over from the index payload.
    pub metadata: BTreeMap<String, Value>,
    /// Similarity in `[0, 1]` derived as `1 - distance`.
    pub similarity_score: f32,
    /// 1-based position within the retrieval result.
    pub rank: usize,
}
