//! Collapses a product's SKUs into the views served to shoppers.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};

use crate::models::{
    ColorOption, Listing, PriceRange, Product, ProductDetail, Sku, Variant, cents_to_units,
};
use crate::repository::SkuQuery;

/// Build the browse listing for `product` from the SKUs that are in stock
/// and satisfy `predicate`.
///
/// The representative SKU is the cheapest qualifying one by list price; on
/// a tie the earliest in `skus` wins. Returns `None` when nothing qualifies.
pub fn aggregate(product: &Product, skus: &[Sku], predicate: &SkuQuery) -> Option<Listing> {
    let qualifying: Vec<&Sku> = skus
        .iter()
        .filter(|sku| sku.is_in_stock() && predicate.matches(sku))
        .collect();

    let representative = qualifying.iter().copied().min_by_key(|sku| sku.price)?;

    let colors: BTreeSet<&str> = qualifying
        .iter()
        .map(|sku| sku.color_name.as_str())
        .collect();
    let stock_quantity = qualifying
        .iter()
        .map(|sku| i64::from(sku.stock_available))
        .sum();

    Some(Listing {
        product_id: product.product_id.clone(),
        sku: representative.sku.clone(),
        name: product.name.clone(),
        brand: product.brand.clone(),
        category: product.category.clone(),
        description: product.description.clone(),
        price: representative.price,
        display_price: cents_to_units(representative.price),
        sale_price: representative.sale_price,
        image_url: product.images.main.clone(),
        sizes: sorted_sizes(qualifying.iter().map(|sku| sku.size)),
        colors: colors.into_iter().map(str::to_string).collect(),
        stock_quantity,
        rating: product.rating,
        reviews_count: product.reviews_count,
        is_featured: product.is_featured,
        is_flash_sale: representative.is_flash_sale,
        flash_sale_end: representative.flash_sale_end,
        created_at: product.created_at,
    })
}

/// Full product view over every variant. `None` when the product has no SKUs.
pub fn describe(product: &Product, skus: &[Sku], now: DateTime<Utc>) -> Option<ProductDetail> {
    if skus.is_empty() {
        return None;
    }

    let in_stock: Vec<&Sku> = skus.iter().filter(|sku| sku.is_in_stock()).collect();

    let price_range = in_stock
        .iter()
        .map(|sku| sku.effective_price())
        .fold(None, |range: Option<PriceRange>, price| {
            Some(match range {
                Some(r) => PriceRange {
                    min: r.min.min(price),
                    max: r.max.max(price),
                },
                None => PriceRange {
                    min: price,
                    max: price,
                },
            })
        });

    let mut seen = HashSet::new();
    let available_colors = in_stock
        .iter()
        .map(|sku| ColorOption {
            code: sku.color_code.clone(),
            name: sku.color_name.clone(),
        })
        .filter(|color| seen.insert(color.clone()))
        .collect();

    Some(ProductDetail {
        product_id: product.product_id.clone(),
        name: product.name.clone(),
        brand: product.brand.clone(),
        category: product.category.clone(),
        description: product.description.clone(),
        base_price: product.base_price,
        images: product.images.clone(),
        materials: product.materials.clone(),
        technology: product.technology.clone(),
        is_featured: product.is_featured,
        rating: product.rating,
        reviews_count: product.reviews_count,
        release_date: product.release_date,
        variants: variants(skus),
        price_range,
        available_sizes: sorted_sizes(in_stock.iter().map(|sku| sku.size)),
        available_colors,
        has_flash_sale: skus.iter().any(|sku| sku.is_flash_sale_active(now)),
        total_variants: skus.len(),
        available_variants: in_stock.len(),
    })
}

/// Variant records ordered by size, then color name.
pub fn variants(skus: &[Sku]) -> Vec<Variant> {
    let mut ordered: Vec<&Sku> = skus.iter().collect();
    ordered.sort_by(|a, b| {
        a.size
            .total_cmp(&b.size)
            .then_with(|| a.color_name.cmp(&b.color_name))
            .then_with(|| a.sku.cmp(&b.sku))
    });
    ordered.into_iter().map(Variant::from).collect()
}

fn sorted_sizes(sizes: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut sizes: Vec<f64> = sizes.collect();
    sizes.sort_by(f64::total_cmp);
    sizes.dedup();
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product, sku};
    use chrono::Duration;

    fn air_max() -> Product {
        product("am97", "Air Max 97", "Nike", "Running")
    }

    #[test]
    fn test_representative_is_cheapest_in_stock_sku() {
        let skus = vec![
            sku("am97", "A", 9.0, 10000, 0),
            sku("am97", "B", 10.0, 8000, 5),
            sku("am97", "C", 11.0, 9000, 3),
        ];

        let listing = aggregate(&air_max(), &skus, &SkuQuery::default()).unwrap();
        assert_eq!(listing.sku, "B");
        assert_eq!(listing.price, 8000);
        assert_eq!(listing.display_price, 80.0);
        assert_eq!(listing.stock_quantity, 8);
        assert_eq!(listing.sizes, vec![10.0, 11.0]);
    }

    #[test]
    fn test_price_filter_changes_representative() {
        let skus = vec![
            sku("am97", "AM97-9", 9.0, 12000, 2),
            sku("am97", "AM97-10", 10.0, 9000, 7),
            sku("am97", "AM97-11", 11.0, 15000, 4),
        ];
        let predicate = SkuQuery {
            min_price: Some(10000),
            ..Default::default()
        };

        let listing = aggregate(&air_max(), &skus, &predicate).unwrap();
        assert_eq!(listing.price, 12000);
        assert_eq!(listing.sizes, vec![9.0, 11.0]);
        assert_eq!(listing.stock_quantity, 6);
    }

    #[test]
    fn test_no_qualifying_sku_suppresses_listing() {
        let skus = vec![
            sku("am97", "A", 9.0, 10000, 0),
            sku("am97", "B", 10.0, 8000, 0),
        ];
        assert!(aggregate(&air_max(), &skus, &SkuQuery::default()).is_none());
        assert!(aggregate(&air_max(), &[], &SkuQuery::default()).is_none());
    }

    #[test]
    fn test_price_tie_keeps_first_encountered() {
        let skus = vec![
            sku("am97", "FIRST", 9.0, 8000, 1),
            sku("am97", "SECOND", 10.0, 8000, 1),
        ];
        let listing = aggregate(&air_max(), &skus, &SkuQuery::default()).unwrap();
        assert_eq!(listing.sku, "FIRST");
    }

    #[test]
    fn test_sizes_and_colors_are_sets() {
        let mut red = sku("am97", "R10", 10.0, 9000, 1);
        red.color_name = "Red".to_string();
        let mut black = sku("am97", "B10", 10.0, 9000, 1);
        black.color_name = "Black".to_string();
        let mut black_small = sku("am97", "B9", 9.5, 9500, 1);
        black_small.color_name = "Black".to_string();

        let listing =
            aggregate(&air_max(), &[red, black, black_small], &SkuQuery::default()).unwrap();
        assert_eq!(listing.sizes, vec![9.5, 10.0]);
        assert_eq!(listing.colors, vec!["Black".to_string(), "Red".to_string()]);
    }

    #[test]
    fn test_flash_sale_fields_come_from_representative() {
        let now = Utc::now();
        let mut cheap = sku("am97", "CHEAP", 9.0, 7000, 1);
        cheap.is_flash_sale = true;
        cheap.flash_sale_end = Some(now + Duration::hours(2));
        let regular = sku("am97", "REG", 10.0, 9000, 1);

        let listing = aggregate(&air_max(), &[regular, cheap], &SkuQuery::default()).unwrap();
        assert!(listing.is_flash_sale);
        assert_eq!(listing.flash_sale_end, Some(now + Duration::hours(2)));
    }

    #[test]
    fn test_expired_flash_sale_excluded_by_predicate() {
        let now = Utc::now();
        let mut expired = sku("am97", "EXP", 9.0, 7000, 1);
        expired.is_flash_sale = true;
        expired.flash_sale_end = Some(now - Duration::minutes(5));

        assert!(aggregate(&air_max(), &[expired], &SkuQuery::flash_sale_active(now)).is_none());
    }

    #[test]
    fn test_listing_copies_product_fields() {
        let mut p = air_max();
        p.is_featured = true;
        p.rating = 4.5;
        p.images.main = "https://cdn.example.com/am97.jpg".to_string();

        let listing =
            aggregate(&p, &[sku("am97", "A", 10.0, 9000, 1)], &SkuQuery::default()).unwrap();
        assert_eq!(listing.name, "Air Max 97");
        assert_eq!(listing.brand, "Nike");
        assert!(listing.is_featured);
        assert_eq!(listing.rating, 4.5);
        assert_eq!(listing.image_url, "https://cdn.example.com/am97.jpg");
    }

    #[test]
    fn test_describe_summarizes_in_stock_variants() {
        let now = Utc::now();
        let mut on_sale = sku("am97", "S10", 10.0, 17000, 2);
        on_sale.sale_price = Some(12000);
        on_sale.color_code = "RED".to_string();
        on_sale.color_name = "Red".to_string();
        let mut sold_out = sku("am97", "S8", 8.0, 5000, 0);
        sold_out.color_code = "WHT".to_string();
        sold_out.color_name = "White".to_string();
        let regular = sku("am97", "S9", 9.0, 15000, 1);

        let detail = describe(&air_max(), &[on_sale, sold_out, regular], now).unwrap();
        assert_eq!(detail.price_range, Some(PriceRange { min: 12000, max: 15000 }));
        assert_eq!(detail.available_sizes, vec![9.0, 10.0]);
        assert_eq!(
            detail.available_colors,
            vec![
                ColorOption {
                    code: "RED".to_string(),
                    name: "Red".to_string()
                },
                ColorOption {
                    code: "BLK".to_string(),
                    name: "Black".to_string()
                },
            ]
        );
        assert_eq!(detail.total_variants, 3);
        assert_eq!(detail.available_variants, 2);
        assert!(!detail.has_flash_sale);
        assert_eq!(
            detail.variants.iter().map(|v| v.sku.as_str()).collect::<Vec<_>>(),
            vec!["S8", "S9", "S10"]
        );
    }

    #[test]
    fn test_describe_without_skus_is_none() {
        assert!(describe(&air_max(), &[], Utc::now()).is_none());
    }

    #[test]
    fn test_describe_all_sold_out_has_no_price_range() {
        let detail = describe(&air_max(), &[sku("am97", "A", 9.0, 9000, 0)], Utc::now()).unwrap();
        assert_eq!(detail.price_range, None);
        assert!(detail.available_sizes.is_empty());
        assert_eq!(detail.available_variants, 0);
    }

    #[test]
    fn test_describe_flags_active_flash_sale() {
        let now = Utc::now();
        let mut flash = sku("am97", "F", 9.0, 9000, 0);
        flash.is_flash_sale = true;
        flash.flash_sale_end = Some(now + Duration::hours(1));

        let detail = describe(&air_max(), &[flash], now).unwrap();
        assert!(detail.has_flash_sale);
    }
}
