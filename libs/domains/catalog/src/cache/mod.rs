//! Response cache: key codec, resource classes and store adapters.
//!
//! Stores hold serialized payloads and know nothing about what they hold.
//! Read-path operations never fail: a broken backend looks like a miss.

mod key;
mod memory;
mod redis;
mod resource;

pub use key::{CacheKey, KeyValue, cache_key};
pub use memory::{InMemoryCacheStore, NoopCacheStore};
pub use self::redis::RedisCacheStore;
pub use resource::{CacheResource, CacheTtls};

use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CatalogError, CatalogResult};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Payload stored under `key`, or `None` on miss or backend failure.
    async fn get(&self, key: &str) -> Option<String>;

    /// Best-effort write; failures are logged and swallowed.
    async fn set(&self, key: &str, payload: String, ttl: Duration);

    /// Delete every key matching a glob (`*`, `?`) and return how many went.
    async fn delete_matching(&self, pattern: &str) -> CatalogResult<u64>;

    /// Delete every entry this store owns.
    async fn clear(&self) -> CatalogResult<u64>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

#[async_trait]
impl<C: CacheStore + ?Sized> CacheStore for Arc<C> {
    async fn get(&self, key: &str) -> Option<String> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, payload: String, ttl: Duration) {
        (**self).set(key, payload, ttl).await
    }

    async fn delete_matching(&self, pattern: &str) -> CatalogResult<u64> {
        (**self).delete_matching(pattern).await
    }

    async fn clear(&self) -> CatalogResult<u64> {
        (**self).clear().await
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

/// Only `*` and `?` wildcards are supported. `[`, `]` and `\` are rejected
/// because Redis would read them as classes and escapes.
pub(crate) fn check_glob(pattern: &str) -> CatalogResult<()> {
    match pattern.chars().find(|c| matches!(c, '[' | ']' | '\\')) {
        Some(ch) => Err(CatalogError::InvalidFilter(format!(
            "unsupported '{}' in cache pattern '{}'",
            ch, pattern
        ))),
        None => Ok(()),
    }
}

/// Translate a supported glob into an anchored regex.
pub(crate) fn glob_to_regex(pattern: &str) -> CatalogResult<Regex> {
    check_glob(pattern)?;

    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push_str("(?s)^");
    let mut buf = [0u8; 4];
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    expr.push('$');
    Regex::new(&expr)
        .map_err(|e| CatalogError::Internal(format!("bad cache pattern '{}': {}", pattern, e)))
}
