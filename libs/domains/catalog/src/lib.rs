//! Catalog Domain
//!
//! Read side of a sneaker storefront: browse listings, product pages,
//! flash sales and enumerations, served through a read-through response cache
//! in front of a MongoDB, PostgreSQL or in-memory store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌────────────┐
//! │   Service   │ ──▶ │ CacheStore │  ← Redis / memory / disabled
//! └──────┬──────┘     └────────────┘
//!        │ miss
//! ┌──────▼──────┐
//! │   Planner   │  ← filter → candidates → aggregate → sort → page
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← MongoDB / PostgreSQL / memory
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     handlers, CatalogService, InMemoryCacheStore, InMemoryCatalogRepository,
//! };
//!
//! let service = CatalogService::new(InMemoryCatalogRepository::new(), InMemoryCacheStore::new());
//! let router: axum::Router = axum::Router::new().nest("/api", handlers::router(service));
//! ```

pub mod aggregator;
pub mod cache;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod planner;
pub mod postgres;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::{
    CacheKey, CacheResource, CacheStore, CacheTtls, InMemoryCacheStore, NoopCacheStore,
    RedisCacheStore,
};
pub use error::{CatalogError, CatalogResult, ErrorResponse};
pub use handlers::ApiDoc;
pub use memory::InMemoryCatalogRepository;
pub use models::{
    CatalogStats, Listing, ListingFilter, ListingPage, ListingQuery, PageRequest, Product,
    ProductDetail, Sku, Variant,
};
pub use self::mongodb::MongoCatalogRepository;
pub use planner::CatalogPlanner;
pub use postgres::PgCatalogRepository;
pub use repository::{CatalogRepository, CountQuery, DistinctField, ProductQuery, SkuQuery};
pub use service::CatalogService;
