//! PostgreSQL implementation of CatalogRepository on SeaORM

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, LikeExpr, extension::postgres::PgExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use tracing::instrument;

use crate::entity::{product, sku};
use crate::error::CatalogResult;
use crate::models::{Product, Sku};
use crate::repository::{CatalogRepository, CountQuery, DistinctField, ProductQuery, SkuQuery};

pub struct PgCatalogRepository {
    db: DatabaseConnection,
}

impl PgCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn select_products(query: &ProductQuery) -> Select<product::Entity> {
        let mut select = product::Entity::find();

        if let Some(brand) = &query.brand {
            select = select.filter(Expr::col(product::Column::Brand).ilike(contains_pattern(brand)));
        }
        if let Some(category) = &query.category {
            select = select
                .filter(Expr::col(product::Column::Category).ilike(contains_pattern(category)));
        }
        if let Some(search) = &query.search {
            select = select.filter(Expr::col(product::Column::Name).ilike(contains_pattern(search)));
        }
        if query.featured_only {
            select = select.filter(product::Column::IsFeatured.eq(true));
        }

        select
    }

    fn select_skus(query: &SkuQuery) -> Select<sku::Entity> {
        let mut select = sku::Entity::find();

        if query.in_stock_only {
            select = select.filter(sku::Column::StockAvailable.gt(0));
        }
        if let Some(min) = query.min_price {
            select = select.filter(sku::Column::Price.gte(min));
        }
        if let Some(max) = query.max_price {
            select = select.filter(sku::Column::Price.lte(max));
        }
        if let Some(now) = query.flash_sale_active_at {
            select = select
                .filter(sku::Column::IsFlashSale.eq(true))
                .filter(sku::Column::FlashSaleEnd.gt(now));
        }

        select
    }

    async fn load_skus(
        &self,
        select: Select<sku::Entity>,
        query: &SkuQuery,
    ) -> CatalogResult<Vec<Sku>> {
        let models = select
            .order_by_asc(sku::Column::Sku)
            .all(&self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|model| Sku::from(model).reconcile())
            .filter(|sku| query.matches(sku))
            .collect())
    }
}

/// `%value%` with LIKE metacharacters escaped
fn contains_pattern(value: &str) -> LikeExpr {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{}%", escaped)).escape('\\')
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    #[instrument(skip(self))]
    async fn find_products(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>> {
        let models = Self::select_products(query)
            .order_by_asc(product::Column::ProductId)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_product(&self, product_id: &str) -> CatalogResult<Option<Product>> {
        let model = product::Entity::find_by_id(product_id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn find_skus(&self, product_id: &str, query: &SkuQuery) -> CatalogResult<Vec<Sku>> {
        let select = Self::select_skus(query).filter(sku::Column::ProductId.eq(product_id));
        self.load_skus(select, query).await
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

        let select = Self::select_skus(query)
            .filter(sku::Column::ProductId.is_in(product_ids.iter().cloned()));
        self.load_skus(select, query).await
    }

    #[instrument(skip(self))]
    async fn distinct(&self, field: DistinctField) -> CatalogResult<Vec<String>> {
        let column = match field {
            DistinctField::Brand => product::Column::Brand,
            DistinctField::Category => product::Column::Category,
        };

        let values: Vec<String> = product::Entity::find()
            .select_only()
            .column(column)
            .distinct()
            .filter(column.ne(""))
            .order_by_asc(column)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(values)
    }

    #[instrument(skip(self))]
    async fn count(&self, query: CountQuery) -> CatalogResult<u64> {
        let count = match query {
            CountQuery::Products(q) => Self::select_products(&q).count(&self.db).await?,
            CountQuery::Skus(q) => Self::select_skus(&q).count(&self.db).await?,
        };
        Ok(count)
    }
}
