//! Prometheus metrics for the catalog service.
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, CatalogMetrics};
//!
//! init_metrics()?;
//! CatalogMetrics::record_cache_hit("sneakers");
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod catalog;
pub mod middleware;

pub use catalog::CatalogMetrics;
pub use middleware::metrics_middleware;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once per process.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        Ok(handle)
    })
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for `/metrics`
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    describe_counter!(
        "catalog_cache_requests_total",
        "Cache lookups by resource and outcome (hit or miss)"
    );
    describe_counter!(
        "catalog_cache_unavailable_total",
        "Cache operations that failed and were absorbed"
    );
    describe_counter!(
        "catalog_cache_invalidations_total",
        "Cache invalidation requests by resource"
    );
    describe_counter!(
        "catalog_cache_keys_deleted_total",
        "Cache entries removed by invalidation"
    );
    describe_histogram!(
        "catalog_query_duration_seconds",
        "Store query time spent computing a response on cache miss"
    );
    describe_histogram!(
        "catalog_listings_returned",
        "Number of listings returned per listing page"
    );
}
