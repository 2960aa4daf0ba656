use ::redis::AsyncCommands;
use ::redis::aio::ConnectionManager;
use async_trait::async_trait;
use observability::CatalogMetrics;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CacheStore, check_glob};
use crate::error::CatalogResult;

const SCAN_BATCH: usize = 500;

/// Redis-backed cache. Every key is stored as `{namespace}:{key}` so the
/// store can share a Redis instance and `clear` only touches its own keys.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: ConnectionManager,
    namespace: String,
}

impl RedisCacheStore {
    pub fn new(conn: ConnectionManager, namespace: impl Into<String>) -> Self {
        Self {
            conn,
            namespace: namespace.into(),
        }
    }

    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// Collect every key matching `pattern` with a cursor scan.
    async fn scan(&self, pattern: &str) -> ::redis::RedisResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = ::redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(self.namespaced(key)).await {
            Ok(payload) => payload,
            Err(e) => {
                CatalogMetrics::record_cache_unavailable("get");
                warn!(key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn set(&self, key: &str, payload: String, ttl: Duration) {
        let mut conn = self.conn.clone();
        let seconds = ttl.as_secs().max(1);
        if let Err(e) = conn
            .set_ex::<_, _, ()>(self.namespaced(key), payload, seconds)
            .await
        {
            CatalogMetrics::record_cache_unavailable("set");
            warn!(key, error = %e, "Cache write failed, continuing without it");
        }
    }

    async fn delete_matching(&self, pattern: &str) -> CatalogResult<u64> {
        check_glob(pattern)?;
        let keys = self.scan(&self.namespaced(pattern)).await.inspect_err(|_| {
            CatalogMetrics::record_cache_unavailable("scan");
        })?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.clone();
        let mut deleted = 0u64;
        for chunk in keys.chunks(SCAN_BATCH) {
            deleted += conn.del::<_, u64>(chunk).await.inspect_err(|_| {
                CatalogMetrics::record_cache_unavailable("delete");
            })?;
        }

        debug!(pattern, deleted, "Deleted cache keys");
        Ok(deleted)
    }

    async fn clear(&self) -> CatalogResult<u64> {
        self.delete_matching("*").await
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
