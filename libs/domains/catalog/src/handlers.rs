//! HTTP handlers for the catalog API

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::cache::{CacheResource, CacheStore};
use crate::error::{CatalogError, CatalogResult, ErrorResponse};
use crate::models::{
    CatalogStats, ColorOption, Listing, ListingPage, ListingQuery, PriceRange, ProductDetail,
    ProductImages, Variant,
};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_sneakers,
        get_sneaker,
        get_product_detail,
        list_variants,
        flash_sales,
        featured,
        brands,
        categories,
        stats,
        invalidate_cache,
        clear_cache,
    ),
    components(schemas(
        Listing,
        ListingPage,
        ListingQuery,
        ProductDetail,
        ProductImages,
        Variant,
        ColorOption,
        PriceRange,
        CatalogStats,
        CacheResource,
        CacheInvalidation,
        ErrorResponse,
    )),
    tags(
        (name = "Catalog", description = "Sneaker browsing endpoints"),
        (name = "Cache", description = "Response cache administration")
    )
)]
pub struct ApiDoc;

/// Result of a cache invalidation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CacheInvalidation {
    /// Resource class, or `all` for a full clear
    pub resource: String,
    pub deleted: u64,
}

type SharedService<R, C> = State<Arc<CatalogService<R, C>>>;

/// Catalog routes, to be nested under `/api`
pub fn router<R, C>(service: CatalogService<R, C>) -> Router
where
    R: CatalogRepository + 'static,
    C: CacheStore + 'static,
{
    Router::new()
        .route("/sneakers", get(list_sneakers))
        .route("/sneakers/{product_id}", get(get_sneaker))
        .route("/products/{product_id}", get(get_product_detail))
        .route("/products/{product_id}/variants", get(list_variants))
        .route("/flash-sales", get(flash_sales))
        .route("/featured", get(featured))
        .route("/brands", get(brands))
        .route("/categories", get(categories))
        .route("/stats", get(stats))
        .route("/cache", delete(clear_cache))
        .route("/cache/{resource}", delete(invalidate_cache))
        .with_state(Arc::new(service))
}

/// Browse sneakers with filters and pagination
#[utoipa::path(
    get,
    path = "/sneakers",
    tag = "Catalog",
    params(ListingQuery),
    responses(
        (status = 200, description = "Page of listings", body = ListingPage),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn list_sneakers<R: CatalogRepository, C: CacheStore>(
    State(service): SharedService<R, C>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> CatalogResult<Json<ListingPage>> {
    let Query(query) = query.map_err(|e| CatalogError::InvalidFilter(e.body_text()))?;
    Ok(Json(service.list_sneakers(query).await?))
}

/// Listing for one product
#[utoipa::path(
    get,
    path = "/sneakers/{product_id}",
    tag = "Catalog",
    params(("product_id" = String, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "Listing found", body = Listing),
        (status = 404, description = "Unknown or sold out", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn get_sneaker<R: CatalogRepository, C: CacheStore>(
    State(service): SharedService<R, C>,
    Path(product_id): Path<String>,
) -> CatalogResult<Json<Listing>> {
    Ok(Json(service.get_listing(&product_id).await?))
}

/// Product page with every variant
#[utoipa::path(
    get,
    path = "/products/{product_id}",
    tag = "Catalog",
    params(("product_id" = String, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "Product detail", body = ProductDetail),
        (status = 404, description = "Unknown product or no variants", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn get_product_detail<R: CatalogRepository, C: CacheStore>(
    State(service): SharedService<R, C>,
    Path(product_id): Path<String>,
) -> CatalogResult<Json<ProductDetail>> {
    Ok(Json(service.get_product_detail(&product_id).await?))
}

#[utoipa::path(
    get,
    path = "/products/{product_id}/variants",
    tag = "Catalog",
    params(("product_id" = String, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "Variants by size then color", body = Vec<Variant>),
        (status = 404, description = "Unknown product", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn list_variants<R: CatalogRepository, C: CacheStore>(
    State(service): SharedService<R, C>,
    Path(product_id): Path<String>,
) -> CatalogResult<Json<Vec<Variant>>> {
    Ok(Json(service.list_variants(&product_id).await?))
}

/// Listings with a running flash sale
#[utoipa::path(
    get,
    path = "/flash-sales",
    tag = "Catalog",
    responses(
        (status = 200, description = "Up to 10 listings", body = Vec<Listing>),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn flash_sales<R: CatalogRepository, C: CacheStore>(
    State(service): SharedService<R, C>,
) -> CatalogResult<Json<Vec<Listing>>> {
    Ok(Json(service.flash_sales().await?))
}

#[utoipa::path(
    get,
    path = "/featured",
    tag = "Catalog",
    responses(
        (status = 200, description = "Up to 8 featured listings", body = Vec<Listing>),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn featured<R: CatalogRepository, C: CacheStore>(
    State(service): SharedService<R, C>,
) -> CatalogResult<Json<Vec<Listing>>> {
    Ok(Json(service.featured().await?))
}

#[utoipa::path(
    get,
    path = "/brands",
    tag = "Catalog",
    responses(
        (status = 200, description = "Sorted brand names", body = Vec<String>),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn brands<R: CatalogRepository, C: CacheStore>(
    State(service): SharedService<R, C>,
) -> CatalogResult<Json<Vec<String>>> {
    Ok(Json(service.brands().await?))
}

#[utoipa::path(
    get,
    path = "/categories",
    tag = "Catalog",
    responses(
        (status = 200, description = "Sorted category names", body = Vec<String>),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn categories<R: CatalogRepository, C: CacheStore>(
    State(service): SharedService<R, C>,
) -> CatalogResult<Json<Vec<String>>> {
    Ok(Json(service.categories().await?))
}

/// Catalog counters
#[utoipa::path(
    get,
    path = "/stats",
    tag = "Catalog",
    responses(
        (status = 200, description = "Catalog statistics", body = CatalogStats),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn stats<R: CatalogRepository, C: CacheStore>(
    State(service): SharedService<R, C>,
) -> CatalogResult<Json<CatalogStats>> {
    Ok(Json(service.stats().await?))
}

/// Drop cached responses of one resource class
#[utoipa::path(
    delete,
    path = "/cache/{resource}",
    tag = "Cache",
    params(("resource" = String, Path, description = "Resource class name or key prefix, e.g. `flash_sales` or `sneakers`")),
    responses(
        (status = 200, description = "Entries deleted", body = CacheInvalidation),
        (status = 400, description = "Unknown resource class", body = ErrorResponse),
        (status = 503, description = "Cache unavailable", body = ErrorResponse)
    )
)]
async fn invalidate_cache<R: CatalogRepository, C: CacheStore>(
    State(service): SharedService<R, C>,
    Path(resource): Path<String>,
) -> CatalogResult<Json<CacheInvalidation>> {
    let class = CacheResource::lookup(&resource).ok_or_else(|| {
        CatalogError::InvalidFilter(format!("unknown cache resource '{}'", resource))
    })?;

    let deleted = service.invalidate(class).await?;
    Ok(Json(CacheInvalidation {
        resource: class.to_string(),
        deleted,
    }))
}

/// Drop every cached response
#[utoipa::path(
    delete,
    path = "/cache",
    tag = "Cache",
    responses(
        (status = 200, description = "Entries deleted", body = CacheInvalidation),
        (status = 503, description = "Cache unavailable", body = ErrorResponse)
    )
)]
async fn clear_cache<R: CatalogRepository, C: CacheStore>(
    State(service): SharedService<R, C>,
) -> CatalogResult<Json<CacheInvalidation>> {
    let deleted = service.clear_cache().await?;
    Ok(Json(CacheInvalidation {
        resource: "all".to_string(),
        deleted,
    }))
}
