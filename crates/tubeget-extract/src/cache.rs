//! TTL'd metadata cache.
//!
//! URL -> resolution result with a fixed time-to-live. Entry count is
//! unbounded; expired entries are pruned on insert. Last-write-wins on
//! identical-key races.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::resolver::ResolutionResult;

/// Time-to-live for cached metadata (one hour).
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

struct CacheEntry {
    result: ResolutionResult,
    inserted_at: Instant,
}

/// Concurrent metadata cache keyed by URL.
pub struct MetadataCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Fresh entry for a URL, if any. An expired entry behaves as a
    /// miss; a hit never involves the extraction tool.
    pub async fn get(&self, url: &str) -> Option<ResolutionResult> {
        let entries = self.entries.read().await;
        let entry = entries.get(url)?;
        if entry.inserted_at.elapsed() < self.ttl {
            debug!(url, "Metadata cache hit");
            Some(entry.result.clone())
        } else {
            debug!(url, "Metadata cache entry expired");
            None
        }
    }

    /// Insert or replace the entry for a URL.
    pub async fn put(&self, url: impl Into<String>, result: ResolutionResult) {
        let mut entries = self.entries.write().await;
        // Opportunistic pruning keeps the accepted unbounded growth to
        // live entries only.
        let ttl = self.ttl;
        entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
        entries.insert(
            url.into(),
            CacheEntry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tubeget_models::RawMetadata;

    fn result(title: &str) -> ResolutionResult {
        ResolutionResult {
            metadata: RawMetadata {
                title: Some(title.to_string()),
                ..Default::default()
            },
            strategy: "web",
            args: vec![],
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let cache = MetadataCache::new();
        cache.put("https://x/1", result("one")).await;

        let hit = cache.get("https://x/1").await.unwrap();
        assert_eq!(hit.metadata.title.as_deref(), Some("one"));
        assert_eq!(hit.strategy, "web");

        assert!(cache.get("https://x/2").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MetadataCache::with_ttl(Duration::ZERO);
        cache.put("https://x/1", result("one")).await;
        assert!(cache.get("https://x/1").await.is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let cache = MetadataCache::new();
        cache.put("https://x/1", result("first")).await;
        cache.put("https://x/1", result("second")).await;

        let hit = cache.get("https://x/1").await.unwrap();
        assert_eq!(hit.metadata.title.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_concurrent_puts_disjoint_keys() {
        let cache = std::sync::Arc::new(MetadataCache::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = std::sync::Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let url = format!("https://x/{i}");
                cache.put(url.clone(), result(&format!("v{i}"))).await;
                cache.get(&url).await
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            let hit = handle.await.unwrap().unwrap();
            assert_eq!(hit.metadata.title.as_deref(), Some(format!("v{i}").as_str()));
        }
    }
}
