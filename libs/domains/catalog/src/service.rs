//! Catalog service - read-through cache in front of the query planner

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use observability::CatalogMetrics;

use crate::cache::{CacheKey, CacheResource, CacheStore, CacheTtls};
use crate::error::CatalogResult;
use crate::models::{
    CatalogStats, Listing, ListingFilter, ListingPage, ListingQuery, PageRequest, ProductDetail,
    Variant,
};
use crate::planner::CatalogPlanner;
use crate::repository::{CatalogRepository, DistinctField};

/// Number of listings on the flash sale rail
pub const FLASH_SALE_LIMIT: u32 = 10;
/// Number of listings on the featured rail
pub const FEATURED_LIMIT: u32 = 8;

/// Catalog read operations with response caching.
///
/// Every operation computes a deterministic key, answers from the cache when
/// it can and otherwise asks the planner and stores the result with the TTL
/// of its resource class. Cache failures never reach the caller on this path.
pub struct CatalogService<R: CatalogRepository, C: CacheStore> {
    planner: CatalogPlanner<R>,
    cache: Arc<C>,
    ttls: CacheTtls,
}

impl<R: CatalogRepository, C: CacheStore> Clone for CatalogService<R, C> {
    fn clone(&self) -> Self {
        Self {
            planner: self.planner.clone(),
            cache: Arc::clone(&self.cache),
            ttls: self.ttls,
        }
    }
}

impl<R: CatalogRepository, C: CacheStore> CatalogService<R, C> {
    pub fn new(repository: R, cache: C) -> Self {
        Self {
            planner: CatalogPlanner::new(Arc::new(repository)),
            cache: Arc::new(cache),
            ttls: CacheTtls::default(),
        }
    }

    pub fn with_ttls(mut self, ttls: CacheTtls) -> Self {
        self.ttls = ttls;
        self
    }

    pub fn ttls(&self) -> &CacheTtls {
        &self.ttls
    }

    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend()
    }

    pub fn planner(&self) -> &CatalogPlanner<R> {
        &self.planner
    }

    /// Browse listings. The query is validated before the cache is consulted.
    #[instrument(skip(self))]
    pub async fn list_sneakers(&self, query: ListingQuery) -> CatalogResult<ListingPage> {
        let (filter, page) = query.into_parts()?;
        let key = listings_key(&filter, page);

        let result = self
            .read_through(
                CacheResource::Listings,
                &key,
                self.planner.plan(&filter, page, Utc::now()),
            )
            .await?;
        CatalogMetrics::record_listings_returned(
            CacheResource::Listings.as_ref(),
            result.items.len(),
        );
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn get_listing(&self, product_id: &str) -> CatalogResult<Listing> {
        let key = product_key(CacheResource::Listing, product_id);
        self.read_through(CacheResource::Listing, &key, self.planner.listing(product_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_product_detail(&self, product_id: &str) -> CatalogResult<ProductDetail> {
        let key = product_key(CacheResource::ProductDetail, product_id);
        self.read_through(
            CacheResource::ProductDetail,
            &key,
            self.planner.detail(product_id, Utc::now()),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn list_variants(&self, product_id: &str) -> CatalogResult<Vec<Variant>> {
        let key = product_key(CacheResource::Variants, product_id);
        self.read_through(CacheResource::Variants, &key, self.planner.variants(product_id))
            .await
    }

    /// Cheapest listings with a running flash sale
    #[instrument(skip(self))]
    pub async fn flash_sales(&self) -> CatalogResult<Vec<Listing>> {
        self.rail(CacheResource::FlashSales, ListingFilter::flash_sales(), FLASH_SALE_LIMIT)
            .await
    }

    #[instrument(skip(self))]
    pub async fn featured(&self) -> CatalogResult<Vec<Listing>> {
        self.rail(CacheResource::Featured, ListingFilter::featured(), FEATURED_LIMIT)
            .await
    }

    #[instrument(skip(self))]
    pub async fn brands(&self) -> CatalogResult<Vec<String>> {
        self.read_through(
            CacheResource::Brands,
            CacheResource::Brands.prefix(),
            self.planner.distinct(DistinctField::Brand),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn categories(&self) -> CatalogResult<Vec<String>> {
        self.read_through(
            CacheResource::Categories,
            CacheResource::Categories.prefix(),
            self.planner.distinct(DistinctField::Category),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> CatalogResult<CatalogStats> {
        self.read_through(
            CacheResource::Stats,
            CacheResource::Stats.prefix(),
            self.planner.stats(Utc::now()),
        )
        .await
    }

    /// Drop every cached entry of one resource class.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, resource: CacheResource) -> CatalogResult<u64> {
        let mut deleted = 0;
        for pattern in resource.invalidation_patterns() {
            deleted += self.cache.delete_matching(&pattern).await?;
        }

        CatalogMetrics::record_invalidation(resource.as_ref(), deleted);
        info!(%resource, deleted, "Invalidated cached resource");
        Ok(deleted)
    }

    #[instrument(skip(self))]
    pub async fn clear_cache(&self) -> CatalogResult<u64> {
        let deleted = self.cache.clear().await?;
        CatalogMetrics::record_invalidation("all", deleted);
        info!(deleted, backend = self.cache.backend(), "Cleared cache");
        Ok(deleted)
    }

    async fn rail(
        &self,
        resource: CacheResource,
        filter: ListingFilter,
        limit: u32,
    ) -> CatalogResult<Vec<Listing>> {
        let page = PageRequest::first(limit);
        let key = CacheKey::new(resource.prefix())
            .param("limit", Some(page.per_page))
            .build();

        let load = async {
            self.planner
                .plan(&filter, page, Utc::now())
                .await
                .map(|page| page.items)
        };
        let items = self.read_through(resource, &key, load).await?;
        CatalogMetrics::record_listings_returned(resource.as_ref(), items.len());
        Ok(items)
    }

    /// Answer from the cache, or await `load` and cache what it returns.
    ///
    /// `load` is not polled on a hit. Errors from `load` are returned as-is
    /// and never cached.
    async fn read_through<T, F>(
        &self,
        resource: CacheResource,
        key: &str,
        load: F,
    ) -> CatalogResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = CatalogResult<T>>,
    {
        if let Some(payload) = self.cache.get(key).await {
            match serde_json::from_str::<T>(&payload) {
                Ok(value) => {
                    CatalogMetrics::record_cache_hit(resource.as_ref());
                    debug!(%resource, key, "Cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(%resource, key, error = %e, "Discarding undecodable cache entry");
                }
            }
        }

        CatalogMetrics::record_cache_miss(resource.as_ref());
        debug!(%resource, key, "Cache miss");

        let started = Instant::now();
        let value = load.await?;
        CatalogMetrics::record_query(resource.as_ref(), started.elapsed());

        match serde_json::to_string(&value) {
            Ok(payload) => {
                self.cache
                    .set(key, payload, self.ttls.for_resource(resource))
                    .await
            }
            Err(e) => warn!(%resource, key, error = %e, "Response not cacheable"),
        }
        Ok(value)
    }
}

fn listings_key(filter: &ListingFilter, page: PageRequest) -> String {
    CacheKey::new(CacheResource::Listings.prefix())
        .param("page", Some(page.page))
        .param("per_page", Some(page.per_page))
        .param("brand", filter.brand.as_deref())
        .param("category", filter.category.as_deref())
        .param("search", filter.search.as_deref())
        .param("min_price", filter.min_price)
        .param("max_price", filter.max_price)
        .param("featured_only", Some(filter.featured_only))
        .param("flash_sale_only", Some(filter.flash_sale_only))
        .build()
}

fn product_key(resource: CacheResource, product_id: &str) -> String {
    CacheKey::new(resource.prefix())
        .param("product_id", Some(product_id))
        .build()
}
