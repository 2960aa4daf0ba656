//! In-process catalog store for development and tests.

use async_trait::async_trait;
use std::collections::BTreeSet;
use tokio::sync::RwLock;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Product, Sku};
use crate::repository::{CatalogRepository, CountQuery, DistinctField, ProductQuery, SkuQuery};

#[derive(Default)]
struct Tables {
    products: Vec<Product>,
    skus: Vec<Sku>,
}

/// Products and SKUs held in memory, returned in insertion order.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    tables: RwLock<Tables>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(products: Vec<Product>, skus: Vec<Sku>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                products,
                skus: skus.into_iter().map(Sku::reconcile).collect(),
            }),
        }
    }

    /// Insert or replace a product by `product_id`.
    pub async fn insert_product(&self, product: Product) {
        let mut tables = self.tables.write().await;
        match tables
            .products
            .iter_mut()
            .find(|p| p.product_id == product.product_id)
        {
            Some(existing) => *existing = product,
            None => tables.products.push(product),
        }
    }

    /// Insert or replace a SKU by code.
    pub async fn insert_sku(&self, sku: Sku) {
        let sku = sku.reconcile();
        let mut tables = self.tables.write().await;
        match tables.skus.iter_mut().find(|s| s.sku == sku.sku) {
            Some(existing) => *existing = sku,
            None => tables.skus.push(sku),
        }
    }

    /// Overwrite the stock counters of a SKU.
    pub async fn set_stock(&self, sku: &str, quantity: i32, reserved: i32) -> CatalogResult<()> {
        let mut tables = self.tables.write().await;
        let record = tables
            .skus
            .iter_mut()
            .find(|s| s.sku == sku)
            .ok_or_else(|| CatalogError::NotFound(format!("SKU {}", sku)))?;

        record.stock_quantity = quantity;
        record.stock_reserved = reserved;
        record.stock_available = quantity.saturating_sub(reserved).max(0);
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_products(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect())
    }

    async fn find_product(&self, product_id: &str) -> CatalogResult<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .find(|p| p.product_id == product_id)
            .cloned())
    }

    async fn find_skus(&self, product_id: &str, query: &SkuQuery) -> CatalogResult<Vec<Sku>> {
        let tables = self.tables.read().await;
        Ok(tables
            .skus
            .iter()
            .filter(|s| s.product_id == product_id && query.matches(s))
            .cloned()
            .collect())
    }

    async fn find_skus_for_products(
        &self,
        product_ids: &[String],
        query: &SkuQuery,
    ) -> CatalogResult<Vec<Sku>> {
        let wanted: BTreeSet<&str> = product_ids.iter().map(String::as_str).collect();
        let tables = self.tables.read().await;
        Ok(tables
            .skus
            .iter()
            .filter(|s| wanted.contains(s.product_id.as_str()) && query.matches(s))
            .cloned()
            .collect())
    }

    async fn distinct(&self, field: DistinctField) -> CatalogResult<Vec<String>> {
        let tables = self.tables.read().await;
        let values: BTreeSet<&str> = tables
            .products
            .iter()
            .map(|p| match field {
                DistinctField::Brand => p.brand.as_str(),
                DistinctField::Category => p.category.as_str(),
            })
            .filter(|v| !v.is_empty())
            .collect();
        Ok(values.into_iter().map(str::to_string).collect())
    }

    async fn count(&self, query: CountQuery) -> CatalogResult<u64> {
        let tables = self.tables.read().await;
        let count = match query {
            CountQuery::Products(q) => tables.products.iter().filter(|p| q.matches(p)).count(),
            CountQuery::Skus(q) => tables.skus.iter().filter(|s| q.matches(s)).count(),
        };
        Ok(count as u64)
    }
}
