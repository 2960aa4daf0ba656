//! API routes module

pub mod health;

use axum::{Router, http::Uri, middleware, routing::get};
use domain_catalog::{CatalogError, handlers};
use observability::{metrics_handler, metrics_middleware};
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Full application router: catalog API, docs, probes and metrics
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", handlers::router(state.service.clone()))
        .merge(health::router(state.clone()))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CompressionLayer::new())
}

async fn not_found(uri: Uri) -> CatalogError {
    CatalogError::NotFound(format!("Route {}", uri.path()))
}
