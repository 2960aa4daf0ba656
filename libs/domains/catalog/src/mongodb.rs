//! MongoDB implementation of CatalogRepository
//!
//! Products and SKUs live in two collections. Text filters become
//! case-insensitive `$regex` matches on the escaped input. The flash sale
//! window is narrowed with `is_flash_sale` in the query and finished in
//! process, since sale end times are compared against the request clock.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc},
    options::IndexOptions,
};
use tracing::instrument;

use crate::error::CatalogResult;
use crate::models::{Product, Sku};
use crate::repository::{CatalogRepository, CountQuery, DistinctField, ProductQuery, SkuQuery};

pub const PRODUCTS_COLLECTION: &str = "products";
pub const SKUS_COLLECTION: &str = "skus";

pub struct MongoCatalogRepository {
    products: Collection<Product>,
    skus: Collection<Sku>,
}

impl MongoCatalogRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collections(db, PRODUCTS_COLLECTION, SKUS_COLLECTION)
    }

    pub fn with_collections(db: &Database, products: &str, skus: &str) -> Self {
        Self {
            products: db.collection::<Product>(products),
            skus: db.collection::<Sku>(skus),
        }
    }

    /// Create the indexes the read path relies on. Idempotent.
    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let product_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "product_id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_product_id_unique".to_string())
                        .build(),
                )
                .build(),
            index(doc! { "brand": 1 }, "idx_brand"),
            index(doc! { "category": 1 }, "idx_category"),
            index(doc! { "is_featured": 1 }, "idx_featured"),
        ];

        let sku_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "sku": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_sku_unique".to_string())
                        .build(),
                )
                .build(),
            index(
                doc! { "product_id": 1, "stock_available": 1 },
                "idx_product_stock",
            ),
            index(
                doc! { "is_flash_sale": 1, "flash_sale_end": 1 },
                "idx_flash_sale",
            ),
            index(doc! { "price": 1 }, "idx_price"),
        ];

        self.products.create_indexes(product_indexes).await?;
        self.skus.create_indexes(sku_indexes).await?;
        tracing::info!("Catalog indexes created successfully");
        Ok(())
    }

    fn product_filter(query: &ProductQuery) -> Document {
        let mut doc = doc! {};

        for (field, value) in [
            ("brand", &query.brand),
            ("category", &query.category),
            ("name", &query.search),
        ] {
            if let Some(value) = value {
                doc.insert(field, contains_ignore_case(value));
            }
        }

        if query.featured_only {
            doc.insert("is_featured", true);
        }

        doc
    }

    fn sku_filter(query: &SkuQuery) -> Document {
        let mut doc = doc! {};

        // Stored stock_available may be stale, so compare the computed value
        if query.in_stock_only {
            doc.insert(
                "$expr",
                doc! { "$gt": [{ "$subtract": ["$stock_quantity", "$stock_reserved"] }, 0] },
            );
        }

        if query.min_price.is_some() || query.max_price.is_some() {
            let mut price = doc! {};
            if let Some(min) = query.min_price {
                price.insert("$gte", min);
            }
            if let Some(max) = query.max_price {
                price.insert("$lte", max);
            }
            doc.insert("price", price);
        }

        if query.flash_sale_active_at.is_some() {
            doc.insert("is_flash_sale", true);
        }

        doc
    }

    async fn load_skus(&self, filter: Document, query: &SkuQuery) -> CatalogResult<Vec<Sku>> {
        let cursor = self.skus.find(filter).sort(doc! { "sku": 1 }).await?;
        let skus: Vec<Sku> = cursor.try_collect().await?;

        Ok(skus
            .into_iter()
            .map(Sku::reconcile)
            .filter(|sku| query.matches(sku))
            .collect())
    }
}

fn index(keys: Document, name: &str) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().name(name.to_string()).build())
        .build()
}

fn contains_ignore_case(value: &str) -> Document {
    doc! { "$regex": regex::escape(value), "$options": "i" }
}

#[async_trait]
impl CatalogRepository for MongoCatalogRepository {
    #[instrument(skip(self))]
    async fn find_products(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>> {
        let cursor = self
            .products
            .find(Self::product_filter(query))
            .sort(doc! { "product_id": 1 })
            .await?;
        let products: Vec<Product> = cursor.try_collect().await?;
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn find_product(&self, product_id: &str) -> CatalogResult<Option<Product>> {
        let product = self
            .products
            .find_one(doc! { "product_id": product_id })
            .await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn find_skus(&self, product_id: &str, query: &SkuQuery) -> CatalogResult<Vec<Sku>> {
        let mut filter = Self::sku_filter(query);
        filter.insert("product_id", product_id);
        self.load_skus(filter, query).await
    }

    #[instrument(skip(self, product_ids), fields(products = product_ids.len()))]
    async fn find_skus_for_products(
        &self,
        product_ids: &[String],
        query: &SkuQuery,
    ) -> CatalogResult<Vec<Sku>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut filter = Self::sku_filter(query);
        filter.insert("product_id", doc! { "$in": product_ids.to_vec() });
        self.load_skus(filter, query).await
    }

    #[instrument(skip(self))]
    async fn distinct(&self, field: DistinctField) -> CatalogResult<Vec<String>> {
        let values = self.products.distinct(field.as_ref(), doc! {}).await?;

        let mut values: Vec<String> = values
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect();
        values.sort();
        Ok(values)
    }

    #[instrument(skip(self))]
    async fn count(&self, query: CountQuery) -> CatalogResult<u64> {
        match query {
            CountQuery::Products(q) => {
                let count = self
                    .products
                    .count_documents(Self::product_filter(&q))
                    .await?;
                Ok(count)
            }
            CountQuery::Skus(q) if q.flash_sale_active_at.is_some() => {
                let skus = self.load_skus(Self::sku_filter(&q), &q).await?;
                Ok(skus.len() as u64)
            }
            CountQuery::Skus(q) => {
                let count = self.skus.count_documents(Self::sku_filter(&q)).await?;
                Ok(count)
            }
        }
    }
}
