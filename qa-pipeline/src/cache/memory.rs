//! In-process TTL cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CacheError, ResultCache};

struct Entry {
    value: String,
    expires_at: Instant,
}

/// Bounded in-memory key/value store with lazy expiry.
///
/// Expired entries are dropped on read and swept on write. When the
/// store is full, the sweep runs first and then the oldest-expiring
/// entry is evicted if the new value still does not fit.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    max_entries: usize,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_entries` live values.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of entries currently stored, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Entry exists but is stale; upgrade to a write lock to drop it.
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|e| e.expires_at <= Instant::now())
        {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        entries.retain(|_, e| e.expires_at > now);
        if entries.len() >= self.max_entries && !entries.contains_key(key) {
            let victim = entries
                .iter()
                .min_by_key(|(_, e)| e.expires_at)
                .map(|(k, _)| k.clone());
            if let Some(victim) = victim {
                debug!(key = %victim, "cache full, evicting oldest-expiring entry");
                entries.remove(&victim);
            }
        }

        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_returns_values() {
        let cache = MemoryCache::new(8);
        cache
            .set("qa:a", "one".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("qa:a").await.unwrap(), Some("one".to_string()));
        assert_eq!(cache.get("qa:missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn zero_ttl_entries_are_never_returned() {
        let cache = MemoryCache::new(8);
        cache
            .set("qa:a", "one".into(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(cache.get("qa:a").await.unwrap(), None);
        // The stale entry was also dropped by the read.
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn eviction_keeps_the_store_bounded() {
        let cache = MemoryCache::new(2);
        cache
            .set("qa:a", "1".into(), Duration::from_secs(10))
            .await
            .unwrap();
        cache
            .set("qa:b", "2".into(), Duration::from_secs(20))
            .await
            .unwrap();
        cache
            .set("qa:c", "3".into(), Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(cache.len().await, 2);
        // The entry closest to expiry was the victim.
        assert_eq!(cache.get("qa:a").await.unwrap(), None);
        assert_eq!(cache.get("qa:c").await.unwrap(), Some("3".to_string()));
    }

    #[tokio::test]
    async fn overwrite_does_not_evict_other_keys() {
        let cache = MemoryCache::new(2);
        cache
            .set("qa:a", "1".into(), Duration::from_secs(10))
            .await
            .unwrap();
        cache
            .set("qa:b", "2".into(), Duration::from_secs(10))
            .await
            .unwrap();
        cache
            .set("qa:a", "1b".into(), Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(cache.get("qa:a").await.unwrap(), Some("1b".to_string()));
        assert_eq!(cache.get("qa:b").await.unwrap(), Some("2".to_string()));
    }
}
