//! Shared fixtures for catalog integration tests

#![allow(dead_code)]

use chrono::{Duration, Utc};
use domain_catalog::models::ProductImages;
use domain_catalog::{InMemoryCatalogRepository, Product, Sku};

pub fn product(product_id: &str, name: &str, brand: &str, category: &str, featured: bool) -> Product {
    let now = Utc::now();
    Product {
        product_id: product_id.to_string(),
        name: name.to_string(),
        brand: brand.to_string(),
        category: category.to_string(),
        description: format!("The {} from {}", name, brand),
        base_price: 15000,
        images: ProductImages {
            main: format!("https://cdn.example.com/{}/main.jpg", product_id),
            gallery: vec![],
        },
        materials: vec!["Leather".to_string()],
        technology: vec![],
        available_sizes: vec![],
        available_colors: vec![],
        is_featured: featured,
        rating: 4.5,
        reviews_count: 25,
        release_date: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sku(product: &Product, code: &str, size: f64, price: i64, available: i32) -> Sku {
    let now = Utc::now();
    Sku {
        sku: code.to_string(),
        product_id: product.product_id.clone(),
        size,
        color_code: "BLK".to_string(),
        color_name: "Black".to_string(),
        price,
        sale_price: None,
        stock_quantity: available,
        stock_reserved: 0,
        stock_available: available,
        is_flash_sale: false,
        flash_sale_end: None,
        brand: product.brand.clone(),
        category: product.category.clone(),
        product_name: product.name.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn flash_sale(mut sku: Sku, ends_in: Duration) -> Sku {
    sku.is_flash_sale = true;
    sku.flash_sale_end = Some(Utc::now() + ends_in);
    sku
}

/// Four products:
///
/// - `am97` Air Max 97 (Nike, Running, featured): 9.0 @ 120.00 x2, 10.0 @ 90.00 x7, 11.0 @ 150.00 x4
/// - `ub` Ultraboost (Adidas, Running): 9.0 @ 180.00 x3 on a live flash sale, 10.0 sold out
/// - `aj1` Air Jordan 1 (Nike, Basketball, featured): 10.0 @ 170.00 x1, flash sale ended
/// - `suede` Suede Classic (Puma, Lifestyle): sold out
pub fn seeded_repository() -> InMemoryCatalogRepository {
    let am97 = product("am97", "Air Max 97", "Nike", "Running", true);
    let ub = product("ub", "Ultraboost", "Adidas", "Running", false);
    let aj1 = product("aj1", "Air Jordan 1", "Nike", "Basketball", true);
    let suede = product("suede", "Suede Classic", "Puma", "Lifestyle", false);

    let skus = vec![
        sku(&am97, "AM97-9", 9.0, 12000, 2),
        sku(&am97, "AM97-10", 10.0, 9000, 7),
        sku(&am97, "AM97-11", 11.0, 15000, 4),
        flash_sale(sku(&ub, "UB-9", 9.0, 18000, 3), Duration::hours(2)),
        sku(&ub, "UB-10", 10.0, 18000, 0),
        flash_sale(sku(&aj1, "AJ1-10", 10.0, 17000, 1), Duration::hours(-1)),
        sku(&suede, "SUEDE-8", 8.0, 6500, 0),
    ];

    InMemoryCatalogRepository::with_data(vec![am97, ub, aj1, suede], skus)
}
