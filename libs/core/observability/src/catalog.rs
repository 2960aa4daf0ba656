use metrics::{counter, histogram};
use std::time::Duration;

/// Metric recorder for the catalog read path
pub struct CatalogMetrics;

impl CatalogMetrics {
    pub fn record_cache_hit(resource: &str) {
        counter!(
            "catalog_cache_requests_total",
            "resource" => resource.to_string(),
            "outcome" => "hit"
        )
        .increment(1);
    }

    pub fn record_cache_miss(resource: &str) {
        counter!(
            "catalog_cache_requests_total",
            "resource" => resource.to_string(),
            "outcome" => "miss"
        )
        .increment(1);
    }

    /// A cache backend call failed and the request carried on without it.
    pub fn record_cache_unavailable(operation: &'static str) {
        counter!("catalog_cache_unavailable_total", "operation" => operation).increment(1);
    }

    pub fn record_invalidation(resource: &str, deleted: u64) {
        counter!(
            "catalog_cache_invalidations_total",
            "resource" => resource.to_string()
        )
        .increment(1);
        counter!(
            "catalog_cache_keys_deleted_total",
            "resource" => resource.to_string()
        )
        .increment(deleted);

        tracing::debug!(resource, deleted, "Cache invalidated");
    }

    pub fn record_query(resource: &str, elapsed: Duration) {
        histogram!(
            "catalog_query_duration_seconds",
            "resource" => resource.to_string()
        )
        .record(elapsed.as_secs_f64());
    }

    pub fn record_listings_returned(resource: &str, count: usize) {
        histogram!(
            "catalog_listings_returned",
            "resource" => resource.to_string()
        )
        .record(count as f64);
    }
}
