//! Turns a listing filter into a page of listings.
//!
//! Products are narrowed first, then every candidate's SKUs are loaded in one
//! batched call with the price and flash-sale predicate pushed down. Each
//! product collapses to at most one listing; the survivors are sorted by
//! `(price, name, product_id)` so that pages are stable between requests.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::aggregator::{aggregate, describe, variants};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    CatalogStats, Listing, ListingFilter, ListingPage, PageRequest, Product, ProductDetail, Sku,
    Variant,
};
use crate::repository::{CatalogRepository, CountQuery, DistinctField, ProductQuery, SkuQuery};

pub struct CatalogPlanner<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> Clone for CatalogPlanner<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: CatalogRepository> CatalogPlanner<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// One page of listings for `filter`. Rejects bad input before touching the store.
    #[instrument(skip(self), fields(page = page.page, per_page = page.per_page))]
    pub async fn plan(
        &self,
        filter: &ListingFilter,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> CatalogResult<ListingPage> {
        filter.ensure_valid()?;
        let page = PageRequest::new(page.page, page.per_page)?;

        let products = self
            .repository
            .find_products(&filter.product_query())
            .await?;
        if products.is_empty() {
            return Ok(ListingPage::new(Vec::new(), 0, page));
        }

        let sku_query = filter.sku_query(now);
        let product_ids: Vec<String> = products.iter().map(|p| p.product_id.clone()).collect();
        let skus = self
            .repository
            .find_skus_for_products(&product_ids, &sku_query)
            .await?;

        let by_product = group_by_product(skus);
        let mut listings: Vec<Listing> = products
            .iter()
            .filter_map(|product| {
                let skus = by_product.get(&product.product_id)?;
                aggregate(product, skus, &sku_query)
            })
            .collect();
        listings.sort_by(listing_order);

        let total = listings.len() as u64;
        debug!(
            candidates = products.len(),
            matched = total,
            "Planned listing query"
        );

        let items = listings
            .into_iter()
            .skip(page.offset())
            .take(page.per_page as usize)
            .collect();
        Ok(ListingPage::new(items, total, page))
    }

    /// Listing for a single product over its in-stock SKUs.
    #[instrument(skip(self))]
    pub async fn listing(&self, product_id: &str) -> CatalogResult<Listing> {
        let product = self.require_product(product_id).await?;
        let query = SkuQuery::in_stock();
        let skus = self.repository.find_skus(product_id, &query).await?;

        aggregate(&product, &skus, &query).ok_or_else(|| CatalogError::product_not_found(product_id))
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, product_id: &str, now: DateTime<Utc>) -> CatalogResult<ProductDetail> {
        let product = self.require_product(product_id).await?;
        let skus = self
            .repository
            .find_skus(product_id, &SkuQuery::default())
            .await?;

        describe(&product, &skus, now).ok_or_else(|| CatalogError::product_not_found(product_id))
    }

    #[instrument(skip(self))]
    pub async fn variants(&self, product_id: &str) -> CatalogResult<Vec<Variant>> {
        self.require_product(product_id).await?;
        let skus = self
            .repository
            .find_skus(product_id, &SkuQuery::default())
            .await?;
        Ok(variants(&skus))
    }

    #[instrument(skip(self))]
    pub async fn distinct(&self, field: DistinctField) -> CatalogResult<Vec<String>> {
        let mut values = self.repository.distinct(field).await?;
        values.sort();
        values.dedup();
        Ok(values)
    }

    #[instrument(skip(self))]
    pub async fn stats(&self, now: DateTime<Utc>) -> CatalogResult<CatalogStats> {
        let repo = &self.repository;
        let (total_products, total_skus, in_stock_skus, active_flash_sale_skus, brands, categories) =
            futures::try_join!(
                repo.count(CountQuery::Products(ProductQuery::default())),
                repo.count(CountQuery::Skus(SkuQuery::default())),
                repo.count(CountQuery::Skus(SkuQuery::in_stock())),
                repo.count(CountQuery::Skus(SkuQuery::flash_sale_active(now))),
                repo.distinct(DistinctField::Brand),
                repo.distinct(DistinctField::Category),
            )?;

        Ok(CatalogStats {
            total_products,
            total_skus,
            in_stock_skus,
            active_flash_sale_skus,
            brands: brands.len() as u64,
            categories: categories.len() as u64,
        })
    }

    async fn require_product(&self, product_id: &str) -> CatalogResult<Product> {
        self.repository
            .find_product(product_id)
            .await?
            .ok_or_else(|| CatalogError::product_not_found(product_id))
    }
}

/// Group SKUs by product, keeping the store's order within each group.
fn group_by_product(skus: Vec<Sku>) -> HashMap<String, Vec<Sku>> {
    let mut groups: HashMap<String, Vec<Sku>> = HashMap::new();
    for sku in skus {
        groups.entry(sku.product_id.clone()).or_default().push(sku);
    }
    groups
}

fn listing_order(a: &Listing, b: &Listing) -> Ordering {
    a.price
        .cmp(&b.price)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.product_id.cmp(&b.product_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCatalogRepository;
    use crate::test_support::{fixed_time, product, sku};
    use chrono::Duration;

    fn planner(mock: MockCatalogRepository) -> CatalogPlanner<MockCatalogRepository> {
        CatalogPlanner::new(Arc::new(mock))
    }

    fn page(page: u32, per_page: u32) -> PageRequest {
        PageRequest { page, per_page }
    }

    /// Products p00..p{n-1}, each with one in-stock SKU priced so that the
    /// listing order is p00, p01, ...
    fn catalog(n: usize) -> (Vec<Product>, Vec<Sku>) {
        let products = (0..n)
            .map(|i| product(&format!("p{:02}", i), &format!("Shoe {:02}", i), "Nike", "Running"))
            .collect();
        let skus = (0..n)
            .map(|i| sku(&format!("p{:02}", i), &format!("S{:02}", i), 10.0, 5000 + i as i64 * 100, 1))
            .collect();
        (products, skus)
    }

    fn mock_catalog(products: Vec<Product>, skus: Vec<Sku>) -> MockCatalogRepository {
        let mut mock = MockCatalogRepository::new();
        mock.expect_find_products()
            .returning(move |query| Ok(products.iter().filter(|p| query.matches(p)).cloned().collect()));
        mock.expect_find_skus_for_products()
            .returning(move |ids, query| {
                Ok(skus
                    .iter()
                    .filter(|s| ids.contains(&s.product_id) && query.matches(s))
                    .cloned()
                    .collect())
            });
        mock
    }

    #[tokio::test]
    async fn test_invalid_filter_never_reaches_store() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_find_products().times(0);
        mock.expect_find_skus_for_products().times(0);
        let planner = planner(mock);

        let inverted = ListingFilter {
            min_price: Some(20000),
            max_price: Some(10000),
            ..Default::default()
        };
        let result = planner.plan(&inverted, page(1, 20), fixed_time()).await;
        assert!(matches!(result, Err(CatalogError::InvalidFilter(_))));

        let result = planner
            .plan(&ListingFilter::default(), page(0, 20), fixed_time())
            .await;
        assert!(matches!(result, Err(CatalogError::InvalidFilter(_))));

        let result = planner
            .plan(&ListingFilter::default(), page(1, 101), fixed_time())
            .await;
        assert!(matches!(result, Err(CatalogError::InvalidFilter(_))));
    }

    #[tokio::test]
    async fn test_no_candidates_skips_sku_lookup() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_find_products().times(1).returning(|_| Ok(vec![]));
        mock.expect_find_skus_for_products().times(0);

        let result = planner(mock)
            .plan(&ListingFilter::default(), page(1, 20), fixed_time())
            .await
            .unwrap();
        assert_eq!(result.total, 0);
        assert_eq!(result.total_pages, 0);
        assert!(result.items.is_empty());
    }

    #[tokio::test]
    async fn test_skus_loaded_in_one_batch_with_pushed_down_predicate() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_find_products()
            .times(1)
            .returning(|_| Ok(vec![product("a", "A", "Nike", "Running"), product("b", "B", "Nike", "Running")]));
        mock.expect_find_skus_for_products()
            .withf(|ids, query| {
                ids.to_vec() == vec!["a".to_string(), "b".to_string()]
                    && query.in_stock_only
                    && query.min_price == Some(10000)
            })
            .times(1)
            .returning(|_, _| Ok(vec![sku("a", "A1", 9.0, 12000, 1)]));

        let filter = ListingFilter {
            min_price: Some(10000),
            ..Default::default()
        };
        let result = planner(mock).plan(&filter, page(1, 20), fixed_time()).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].product_id, "a");
    }

    #[tokio::test]
    async fn test_sorted_by_price_then_name_then_id() {
        let products = vec![
            product("z", "Zoom", "Nike", "Running"),
            product("b", "Blazer", "Nike", "Lifestyle"),
            product("a", "Blazer", "Nike", "Lifestyle"),
            product("c", "Cortez", "Nike", "Lifestyle"),
        ];
        let skus = vec![
            sku("z", "Z1", 10.0, 9000, 1),
            sku("b", "B1", 10.0, 11000, 1),
            sku("a", "A1", 10.0, 11000, 1),
            sku("c", "C1", 10.0, 8000, 1),
        ];

        let result = planner(mock_catalog(products, skus))
            .plan(&ListingFilter::default(), page(1, 20), fixed_time())
            .await
            .unwrap();
        let order: Vec<&str> = result.items.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(order, vec!["c", "z", "a", "b"]);
    }

    #[tokio::test]
    async fn test_pages_are_disjoint_and_contiguous() {
        let (products, skus) = catalog(25);
        let planner = planner(mock_catalog(products, skus));

        let first = planner
            .plan(&ListingFilter::default(), page(1, 10), fixed_time())
            .await
            .unwrap();
        let second = planner
            .plan(&ListingFilter::default(), page(2, 10), fixed_time())
            .await
            .unwrap();
        let third = planner
            .plan(&ListingFilter::default(), page(3, 10), fixed_time())
            .await
            .unwrap();

        assert_eq!(first.total, 25);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items.len(), 10);
        assert_eq!(second.items.len(), 10);
        assert_eq!(third.items.len(), 5);

        let ids: Vec<String> = first
            .items
            .iter()
            .chain(&second.items)
            .chain(&third.items)
            .map(|l| l.product_id.clone())
            .collect();
        let expected: Vec<String> = (0..25).map(|i| format!("p{:02}", i)).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_empty() {
        let (products, skus) = catalog(3);
        let result = planner(mock_catalog(products, skus))
            .plan(&ListingFilter::default(), page(5, 10), fixed_time())
            .await
            .unwrap();
        assert_eq!(result.total, 3);
        assert!(result.items.is_empty());
    }

    #[tokio::test]
    async fn test_sold_out_products_are_not_counted() {
        let products = vec![product("a", "A", "Nike", "Running"), product("b", "B", "Nike", "Running")];
        let skus = vec![sku("a", "A1", 9.0, 9000, 2), sku("b", "B1", 9.0, 8000, 0)];

        let result = planner(mock_catalog(products, skus))
            .plan(&ListingFilter::default(), page(1, 20), fixed_time())
            .await
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].product_id, "a");
    }

    #[tokio::test]
    async fn test_flash_sale_only_excludes_expired_sales() {
        let now = fixed_time();
        let products = vec![product("live", "Live", "Nike", "Running"), product("gone", "Gone", "Nike", "Running")];
        let mut live = sku("live", "L1", 9.0, 9000, 2);
        live.is_flash_sale = true;
        live.flash_sale_end = Some(now + Duration::hours(1));
        let mut gone = sku("gone", "G1", 9.0, 8000, 2);
        gone.is_flash_sale = true;
        gone.flash_sale_end = Some(now - Duration::seconds(1));

        let result = planner(mock_catalog(products, vec![live, gone]))
            .plan(&ListingFilter::flash_sales(), page(1, 10), now)
            .await
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].product_id, "live");
        assert!(result.items[0].is_flash_sale);
    }

    #[tokio::test]
    async fn test_air_max_price_filter_scenario() {
        let products = vec![product("am97", "Air Max 97", "Nike", "Running")];
        let skus = vec![
            sku("am97", "AM97-9", 9.0, 12000, 2),
            sku("am97", "AM97-10", 10.0, 9000, 7),
            sku("am97", "AM97-11", 11.0, 15000, 4),
        ];
        let filter = ListingFilter {
            min_price: Some(10000),
            ..Default::default()
        };

        let result = planner(mock_catalog(products, skus))
            .plan(&filter, page(1, 20), fixed_time())
            .await
            .unwrap();
        let listing = &result.items[0];
        assert_eq!(listing.price, 12000);
        assert_eq!(listing.sizes, vec![9.0, 11.0]);
        assert_eq!(listing.stock_quantity, 6);
    }

    #[tokio::test]
    async fn test_listing_unknown_product_is_not_found() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_find_product().returning(|_| Ok(None));
        mock.expect_find_skus().times(0);

        let result = planner(mock).listing("nope").await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_listing_sold_out_product_is_not_found() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_find_product()
            .returning(|_| Ok(Some(product("am97", "Air Max 97", "Nike", "Running"))));
        mock.expect_find_skus()
            .returning(|_, _| Ok(vec![sku("am97", "A", 9.0, 9000, 0)]));

        let result = planner(mock).listing("am97").await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_detail_requires_variants() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_find_product()
            .returning(|_| Ok(Some(product("am97", "Air Max 97", "Nike", "Running"))));
        mock.expect_find_skus().returning(|_, _| Ok(vec![]));

        let result = planner(mock).detail("am97", fixed_time()).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_variants_loads_every_sku() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_find_product()
            .returning(|_| Ok(Some(product("am97", "Air Max 97", "Nike", "Running"))));
        mock.expect_find_skus()
            .withf(|id, query| id == "am97" && *query == SkuQuery::default())
            .returning(|_, _| {
                Ok(vec![
                    sku("am97", "B", 11.0, 9000, 0),
                    sku("am97", "A", 9.0, 9000, 3),
                ])
            });

        let variants = planner(mock).variants("am97").await.unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].sku, "A");
        assert!(!variants[1].in_stock);
    }

    #[tokio::test]
    async fn test_stats_combines_counts_and_enumerations() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_count().returning(|query| {
            Ok(match query {
                CountQuery::Products(_) => 12,
                CountQuery::Skus(q) if q.flash_sale_active_at.is_some() => 2,
                CountQuery::Skus(q) if q.in_stock_only => 30,
                CountQuery::Skus(_) => 40,
            })
        });
        mock.expect_distinct().returning(|field| {
            Ok(match field {
                DistinctField::Brand => vec!["Adidas".to_string(), "Nike".to_string()],
                DistinctField::Category => vec!["Running".to_string()],
            })
        });

        let stats = planner(mock).stats(fixed_time()).await.unwrap();
        assert_eq!(
            stats,
            CatalogStats {
                total_products: 12,
                total_skus: 40,
                in_stock_skus: 30,
                active_flash_sale_skus: 2,
                brands: 2,
                categories: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut mock = MockCatalogRepository::new();
        mock.expect_find_products()
            .returning(|_| Err(CatalogError::StoreUnavailable("connection reset".to_string())));

        let result = planner(mock)
            .plan(&ListingFilter::default(), page(1, 20), fixed_time())
            .await;
        assert!(matches!(result, Err(CatalogError::StoreUnavailable(_))));
    }
}
