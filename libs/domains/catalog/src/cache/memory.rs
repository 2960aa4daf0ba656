use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::{CacheStore, glob_to_regex};
use crate::error::CatalogResult;

struct Entry {
    payload: String,
    expires_at: Instant,
}

/// Process-local cache honouring TTLs. Expired entries are purged lazily on write.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.payload.clone())
    }

    async fn set(&self, key: &str, payload: String, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                payload,
                expires_at: now + ttl,
            },
        );
    }

    async fn delete_matching(&self, pattern: &str) -> CatalogResult<u64> {
        let matcher = glob_to_regex(pattern)?;

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !matcher.is_match(key));
        Ok((before - entries.len()) as u64)
    }

    async fn clear(&self) -> CatalogResult<u64> {
        let mut entries = self.entries.write().await;
        let removed = entries.len() as u64;
        entries.clear();
        Ok(removed)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Cache that never stores anything, used when caching is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCacheStore;

#[async_trait]
impl CacheStore for NoopCacheStore {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _key: &str, _payload: String, _ttl: Duration) {}

    async fn delete_matching(&self, _pattern: &str) -> CatalogResult<u64> {
        Ok(0)
    }

    async fn clear(&self) -> CatalogResult<u64> {
        Ok(0)
    }

    fn backend(&self) -> &'static str {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_set_then_get() {
        let store = InMemoryCacheStore::new();
        assert_eq!(store.get("brands").await, None);

        store.set("brands", r#"["Nike"]"#.to_string(), TTL).await;
        assert_eq!(store.get("brands").await.as_deref(), Some(r#"["Nike"]"#));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = InMemoryCacheStore::new();
        store.set("stats", "1".to_string(), TTL).await;
        store.set("stats", "2".to_string(), TTL).await;
        assert_eq!(store.get("stats").await.as_deref(), Some("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let store = InMemoryCacheStore::new();
        store.set("flash_sales", "[]".to_string(), Duration::from_secs(120)).await;

        tokio::time::advance(Duration::from_secs(119)).await;
        assert!(store.get("flash_sales").await.is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get("flash_sales").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_matching_counts_removed_keys() {
        let store = InMemoryCacheStore::new();
        store.set("sneaker", "a".to_string(), TTL).await;
        store.set("sneaker:0011223344556677", "b".to_string(), TTL).await;
        store.set("sneakers:8899aabbccddeeff", "c".to_string(), TTL).await;

        assert_eq!(store.delete_matching("sneaker:*").await.unwrap(), 1);
        assert_eq!(store.delete_matching("sneaker").await.unwrap(), 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get("sneakers:8899aabbccddeeff").await.is_some());
    }

    #[tokio::test]
    async fn test_delete_matching_rejects_character_classes() {
        let store = InMemoryCacheStore::new();
        store.set("stats", "{}".to_string(), TTL).await;

        let result = store.delete_matching("stat[s]").await;
        assert!(matches!(result, Err(CatalogError::InvalidFilter(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryCacheStore::new();
        store.set("brands", "[]".to_string(), TTL).await;
        store.set("categories", "[]".to_string(), TTL).await;

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_noop_store_never_hits() {
        let store = NoopCacheStore;
        store.set("brands", "[]".to_string(), TTL).await;
        assert_eq!(store.get("brands").await, None);
        assert_eq!(store.clear().await.unwrap(), 0);
    }
}
