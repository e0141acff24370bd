//! Result cache seam and cache-key derivation.

mod memory;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryCache;

/// Cache backend failure. Always treated as non-fatal by the pipeline.
#[derive(Debug, Error)]
#[error("cache backend error: {0}")]
pub struct CacheError(pub String);

/// Keyed string store with per-entry TTL.
///
/// Values are serialized answer results; the pipeline never stores
/// anything else here.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Looks up a key. `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores a value, expiring after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

/// Derives the cache key for one answer computation.
///
/// The key is a digest over the trimmed question plus every retrieval
/// parameter that affects the output. Two calls share a key iff they
/// would produce the same answer from the same index state.
pub fn result_key(question: &str, k: usize, similarity_threshold: f32) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(question.trim().as_bytes());
    hasher.update(&(k as u64).to_le_bytes());
    hasher.update(&similarity_threshold.to_le_bytes());
    format!("qa:{}", hasher.finalize().to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_stable_for_equal_inputs() {
        assert_eq!(result_key("q", 5, 0.7), result_key("q", 5, 0.7));
        assert_eq!(result_key("  q  ", 5, 0.7), result_key("q", 5, 0.7));
    }

    #[test]
    fn key_depends_on_every_parameter() {
        let base = result_key("q", 5, 0.7);
        assert_ne!(result_key("other", 5, 0.7), base);
        assert_ne!(result_key("q", 6, 0.7), base);
        assert_ne!(result_key("q", 5, 0.8), base);
    }

    #[test]
    fn key_carries_namespace_prefix() {
        assert!(result_key("q", 5, 0.7).starts_with("qa:"));
    }
}
