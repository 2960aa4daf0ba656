use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use strum::{AsRefStr, Display};

use crate::error::CatalogResult;
use crate::models::{Product, Sku};

/// Product-level predicate. Text filters are case-insensitive substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub brand: Option<String>,
    pub category: Option<String>,
    /// Matched against the product name
    pub search: Option<String>,
    pub featured_only: bool,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        contains_ignore_case(&product.brand, self.brand.as_deref())
            && contains_ignore_case(&product.category, self.category.as_deref())
            && contains_ignore_case(&product.name, self.search.as_deref())
            && (!self.featured_only || product.is_featured)
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

/// SKU-level predicate. Price bounds apply to the list price in cents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkuQuery {
    pub in_stock_only: bool,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// Keep only SKUs whose flash sale is still running at this instant
    pub flash_sale_active_at: Option<DateTime<Utc>>,
}

impl SkuQuery {
    pub fn in_stock() -> Self {
        Self {
            in_stock_only: true,
            ..Self::default()
        }
    }

    pub fn flash_sale_active(now: DateTime<Utc>) -> Self {
        Self {
            flash_sale_active_at: Some(now),
            ..Self::default()
        }
    }

    pub fn matches(&self, sku: &Sku) -> bool {
        (!self.in_stock_only || sku.is_in_stock())
            && self.min_price.is_none_or(|min| sku.price >= min)
            && self.max_price.is_none_or(|max| sku.price <= max)
            && self
                .flash_sale_active_at
                .is_none_or(|now| sku.is_flash_sale_active(now))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountQuery {
    Products(ProductQuery),
    Skus(SkuQuery),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DistinctField {
    Brand,
    Category,
}

/// Read access to the product and SKU collections.
///
/// Implementations return SKUs already passed through [`Sku::reconcile`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_products(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>>;

    async fn find_product(&self, product_id: &str) -> CatalogResult<Option<Product>>;

    async fn find_skus(&self, product_id: &str, query: &SkuQuery) -> CatalogResult<Vec<Sku>>;

    /// Batched form of `find_skus` for a set of products, in no particular order.
    async fn find_skus_for_products(
        &self,
        product_ids: &[String],
        query: &SkuQuery,
    ) -> CatalogResult<Vec<Sku>>;

    /// Sorted distinct values of a product field
    async fn distinct(&self, field: DistinctField) -> CatalogResult<Vec<String>>;

    async fn count(&self, query: CountQuery) -> CatalogResult<u64>;
}

#[async_trait]
impl<R: CatalogRepository + ?Sized> CatalogRepository for Arc<R> {
    async fn find_products(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>> {
        (**self).find_products(query).await
    }

    async fn find_product(&self, product_id: &str) -> CatalogResult<Option<Product>> {
        (**self).find_product(product_id).await
    }

    async fn find_skus(&self, product_id: &str, query: &SkuQuery) -> CatalogResult<Vec<Sku>> {
        (**self).find_skus(product_id, query).await
    }

    async fn find_skus_for_products(
        &self,
        product_ids: &[String],
        query: &SkuQuery,
    ) -> CatalogResult<Vec<Sku>> {
        (**self).find_skus_for_products(product_ids, query).await
    }

    async fn distinct(&self, field: DistinctField) -> CatalogResult<Vec<String>> {
        (**self).distinct(field).await
    }

    async fn count(&self, query: CountQuery) -> CatalogResult<u64> {
        (**self).count(query).await
    }
}
