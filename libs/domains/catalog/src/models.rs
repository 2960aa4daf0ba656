use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::error::{CatalogError, CatalogResult};
use crate::repository::{ProductQuery, SkuQuery};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Convert integer cents to currency units for display.
pub fn cents_to_units(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Convert a currency amount to cents, rounding half away from zero.
///
/// Returns `None` for NaN, infinities and amounts outside the `i64` range.
pub fn units_to_cents(units: f64) -> Option<i64> {
    let cents = (units * 100.0).round();
    if cents.is_finite() && cents >= i64::MIN as f64 && cents <= i64::MAX as f64 {
        Some(cents as i64)
    } else {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductImages {
    pub main: String,
    #[serde(default)]
    pub gallery: Vec<String>,
}

/// Catalog product. Prices are integer cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Business identifier, unique across the catalog
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub base_price: i64,
    #[serde(default)]
    pub images: ProductImages,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub technology: Vec<String>,
    /// Denormalized summary written by the catalog owner; may lag behind the SKUs
    #[serde(default)]
    pub available_sizes: Vec<f64>,
    #[serde(default)]
    pub available_colors: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews_count: i32,
    pub release_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One purchasable size/color variant of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Sku {
    pub sku: String,
    pub product_id: String,
    pub size: f64,
    pub color_code: String,
    pub color_name: String,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub stock_quantity: i32,
    #[serde(default)]
    pub stock_reserved: i32,
    /// Always `max(stock_quantity - stock_reserved, 0)` once reconciled
    pub stock_available: i32,
    #[serde(default)]
    pub is_flash_sale: bool,
    pub flash_sale_end: Option<DateTime<Utc>>,
    pub brand: String,
    pub category: String,
    pub product_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sku {
    pub fn is_in_stock(&self) -> bool {
        self.stock_available > 0
    }

    pub fn is_flash_sale_active(&self, now: DateTime<Utc>) -> bool {
        self.is_flash_sale && self.flash_sale_end.is_some_and(|end| end > now)
    }

    /// Price a shopper pays right now
    pub fn effective_price(&self) -> i64 {
        self.sale_price.unwrap_or(self.price)
    }

    /// Enforce the record invariants on data read from a store.
    pub fn reconcile(mut self) -> Self {
        let expected = self.stock_quantity.saturating_sub(self.stock_reserved).max(0);
        if self.stock_available != expected {
            tracing::warn!(
                sku = %self.sku,
                stored = self.stock_available,
                expected,
                "Stored stock_available disagrees with quantity and reservations"
            );
            self.stock_available = expected;
        }

        if !self.is_flash_sale && self.flash_sale_end.is_some() {
            self.flash_sale_end = None;
        }
        self
    }
}

/// A product as shown in browse results, priced by its cheapest qualifying SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Listing {
    pub product_id: String,
    /// Code of the representative SKU
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    /// Representative price in cents
    pub price: i64,
    /// `price` in currency units
    pub display_price: f64,
    pub sale_price: Option<i64>,
    pub image_url: String,
    /// Sorted, de-duplicated sizes of qualifying SKUs
    pub sizes: Vec<f64>,
    /// Color names of qualifying SKUs, sorted
    pub colors: Vec<String>,
    /// Sum of `stock_available` over qualifying SKUs
    pub stock_quantity: i64,
    pub rating: f64,
    pub reviews_count: i32,
    pub is_featured: bool,
    pub is_flash_sale: bool,
    pub flash_sale_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Browse request as received over HTTP. Prices are in currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
#[validate(schema(function = "validate_price_bounds"))]
pub struct ListingQuery {
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: u32,
    /// Items per page, 1 to 100
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: u32,
    /// Case-insensitive substring of the brand
    pub brand: Option<String>,
    /// Case-insensitive substring of the category
    pub category: Option<String>,
    #[validate(range(min = 0.0, message = "min_price must not be negative"))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0, message = "max_price must not be negative"))]
    pub max_price: Option<f64>,
    /// Case-insensitive substring of the product name
    pub search: Option<String>,
    #[serde(default)]
    pub featured_only: bool,
    #[serde(default)]
    pub flash_sale_only: bool,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

fn validate_price_bounds(query: &ListingQuery) -> Result<(), ValidationError> {
    match (query.min_price, query.max_price) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("price_range")
            .with_message("min_price must not exceed max_price".into())),
        _ => Ok(()),
    }
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            brand: None,
            category: None,
            min_price: None,
            max_price: None,
            search: None,
            featured_only: false,
            flash_sale_only: false,
        }
    }
}

impl ListingQuery {
    /// Validate and normalize into a store-facing filter plus page window.
    pub fn into_parts(self) -> CatalogResult<(ListingFilter, PageRequest)> {
        self.validate()?;

        let filter = ListingFilter {
            brand: non_blank(self.brand),
            category: non_blank(self.category),
            search: non_blank(self.search),
            min_price: self.min_price.map(price_to_cents).transpose()?,
            max_price: self.max_price.map(price_to_cents).transpose()?,
            featured_only: self.featured_only,
            flash_sale_only: self.flash_sale_only,
        };
        filter.ensure_valid()?;

        Ok((filter, PageRequest::new(self.page, self.per_page)?))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn price_to_cents(units: f64) -> CatalogResult<i64> {
    units_to_cents(units)
        .ok_or_else(|| CatalogError::InvalidFilter(format!("price {} is not a valid amount", units)))
}

/// Normalized browse filter. Prices are cents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub brand: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub featured_only: bool,
    pub flash_sale_only: bool,
}

impl ListingFilter {
    pub fn featured() -> Self {
        Self {
            featured_only: true,
            ..Self::default()
        }
    }

    pub fn flash_sales() -> Self {
        Self {
            flash_sale_only: true,
            ..Self::default()
        }
    }

    pub fn ensure_valid(&self) -> CatalogResult<()> {
        for (name, bound) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if bound.is_some_and(|cents| cents < 0) {
                return Err(CatalogError::InvalidFilter(format!(
                    "{} must not be negative",
                    name
                )));
            }
        }

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(CatalogError::InvalidFilter(
                    "min_price must not exceed max_price".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Product-level part of the filter
    pub fn product_query(&self) -> ProductQuery {
        ProductQuery {
            brand: self.brand.clone(),
            category: self.category.clone(),
            search: self.search.clone(),
            featured_only: self.featured_only,
        }
    }

    /// SKU-level part of the filter, evaluated at `now`
    pub fn sku_query(&self, now: DateTime<Utc>) -> SkuQuery {
        SkuQuery {
            in_stock_only: true,
            min_price: self.min_price,
            max_price: self.max_price,
            flash_sale_active_at: self.flash_sale_only.then_some(now),
        }
    }
}

/// 1-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> CatalogResult<Self> {
        if page < 1 {
            return Err(CatalogError::InvalidFilter(
                "page must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(CatalogError::InvalidFilter(format!(
                "per_page must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }
        Ok(Self { page, per_page })
    }

    /// First page holding `limit` items
    pub fn first(limit: u32) -> Self {
        Self {
            page: 1,
            per_page: limit.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.per_page as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListingPage {
    pub items: Vec<Listing>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
}

impl ListingPage {
    pub fn new(items: Vec<Listing>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            total_pages: total.div_ceil(u64::from(request.per_page)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ColorOption {
    pub code: String,
    pub name: String,
}

/// Inclusive price bounds in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Variant {
    pub sku: String,
    pub size: f64,
    pub color: ColorOption,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub stock_available: i32,
    pub in_stock: bool,
    pub is_flash_sale: bool,
    pub flash_sale_end: Option<DateTime<Utc>>,
}

impl From<&Sku> for Variant {
    fn from(sku: &Sku) -> Self {
        Self {
            sku: sku.sku.clone(),
            size: sku.size,
            color: ColorOption {
                code: sku.color_code.clone(),
                name: sku.color_name.clone(),
            },
            price: sku.price,
            sale_price: sku.sale_price,
            stock_available: sku.stock_available,
            in_stock: sku.is_in_stock(),
            is_flash_sale: sku.is_flash_sale,
            flash_sale_end: sku.flash_sale_end,
        }
    }
}

/// Product page payload: product fields plus live variant summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductDetail {
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub base_price: i64,
    pub images: ProductImages,
    pub materials: Vec<String>,
    pub technology: Vec<String>,
    pub is_featured: bool,
    pub rating: f64,
    pub reviews_count: i32,
    pub release_date: Option<DateTime<Utc>>,
    pub variants: Vec<Variant>,
    /// Effective price bounds over in-stock variants; absent when nothing is in stock
    pub price_range: Option<PriceRange>,
    pub available_sizes: Vec<f64>,
    pub available_colors: Vec<ColorOption>,
    pub has_flash_sale: bool,
    pub total_variants: usize,
    pub available_variants: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogStats {
    pub total_products: u64,
    pub total_skus: u64,
    pub in_stock_skus: u64,
    pub active_flash_sale_skus: u64,
    pub brands: u64,
    pub categories: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sku(quantity: i32, reserved: i32, available: i32) -> Sku {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Sku {
            sku: "AM97-BLK-10".to_string(),
            product_id: "am97".to_string(),
            size: 10.0,
            color_code: "BLK".to_string(),
            color_name: "Black".to_string(),
            price: 17000,
            sale_price: None,
            stock_quantity: quantity,
            stock_reserved: reserved,
            stock_available: available,
            is_flash_sale: false,
            flash_sale_end: None,
            brand: "Nike".to_string(),
            category: "Running".to_string(),
            product_name: "Air Max 97".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_units_to_cents_rounds_half_away_from_zero() {
        assert_eq!(units_to_cents(99.99), Some(9999));
        assert_eq!(units_to_cents(100.0), Some(10000));
        assert_eq!(units_to_cents(0.005), Some(1));
        assert_eq!(units_to_cents(f64::NAN), None);
        assert_eq!(units_to_cents(f64::INFINITY), None);
    }

    #[test]
    fn test_reconcile_recomputes_stock_available() {
        let reconciled = sku(5, 2, 9).reconcile();
        assert_eq!(reconciled.stock_available, 3);

        let oversold = sku(2, 5, 0).reconcile();
        assert_eq!(oversold.stock_available, 0);
    }

    #[test]
    fn test_reconcile_drops_stale_flash_sale_end() {
        let mut record = sku(3, 0, 3);
        record.flash_sale_end = Some(Utc::now());
        assert!(record.reconcile().flash_sale_end.is_none());
    }

    #[test]
    fn test_flash_sale_active_requires_future_end() {
        let now = Utc::now();
        let mut record = sku(3, 0, 3);
        record.is_flash_sale = true;
        record.flash_sale_end = Some(now + Duration::hours(1));
        assert!(record.is_flash_sale_active(now));

        record.flash_sale_end = Some(now - Duration::hours(1));
        assert!(!record.is_flash_sale_active(now));

        record.flash_sale_end = None;
        assert!(!record.is_flash_sale_active(now));
    }

    #[test]
    fn test_listing_query_defaults() {
        let (filter, page) = ListingQuery::default().into_parts().unwrap();
        assert_eq!(filter, ListingFilter::default());
        assert_eq!(page, PageRequest { page: 1, per_page: 20 });
    }

    #[test]
    fn test_listing_query_rejects_bad_paging() {
        for (page, per_page) in [(0, 20), (1, 0), (1, 101)] {
            let query = ListingQuery {
                page,
                per_page,
                ..Default::default()
            };
            assert!(matches!(
                query.into_parts(),
                Err(CatalogError::InvalidFilter(_))
            ));
        }
    }

    #[test]
    fn test_listing_query_rejects_inverted_price_range() {
        let query = ListingQuery {
            min_price: Some(200.0),
            max_price: Some(100.0),
            ..Default::default()
        };
        assert!(matches!(
            query.into_parts(),
            Err(CatalogError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_listing_query_rejects_negative_price() {
        let query = ListingQuery {
            min_price: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            query.into_parts(),
            Err(CatalogError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_listing_query_normalizes_text_and_prices() {
        let query = ListingQuery {
            brand: Some("  nike ".to_string()),
            search: Some("   ".to_string()),
            min_price: Some(99.99),
            ..Default::default()
        };
        let (filter, _) = query.into_parts().unwrap();
        assert_eq!(filter.brand.as_deref(), Some("nike"));
        assert_eq!(filter.search, None);
        assert_eq!(filter.min_price, Some(9999));
    }

    #[test]
    fn test_page_request_offset() {
        assert_eq!(PageRequest::new(1, 10).unwrap().offset(), 0);
        assert_eq!(PageRequest::new(3, 10).unwrap().offset(), 20);
        assert_eq!(PageRequest::first(500).per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_listing_page_total_pages() {
        let request = PageRequest::new(1, 10).unwrap();
        assert_eq!(ListingPage::new(vec![], 0, request).total_pages, 0);
        assert_eq!(ListingPage::new(vec![], 10, request).total_pages, 1);
        assert_eq!(ListingPage::new(vec![], 11, request).total_pages, 2);
    }

    #[test]
    fn test_sku_query_from_flash_sale_filter() {
        let now = Utc::now();
        let query = ListingFilter::flash_sales().sku_query(now);
        assert!(query.in_stock_only);
        assert_eq!(query.flash_sale_active_at, Some(now));
    }
}
