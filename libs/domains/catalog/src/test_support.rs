use chrono::{DateTime, TimeZone, Utc};

use crate::models::{Product, ProductImages, Sku};

pub(crate) fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub(crate) fn product(product_id: &str, name: &str, brand: &str, category: &str) -> Product {
    Product {
        product_id: product_id.to_string(),
        name: name.to_string(),
        brand: brand.to_string(),
        category: category.to_string(),
        description: format!("{} by {}", name, brand),
        base_price: 15000,
        images: ProductImages {
            main: format!("https://cdn.example.com/{}.jpg", product_id),
            gallery: vec![],
        },
        materials: vec!["Mesh".to_string()],
        technology: vec![],
        available_sizes: vec![],
        available_colors: vec![],
        is_featured: false,
        rating: 4.0,
        reviews_count: 10,
        release_date: None,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

/// Black SKU with no reservations, so `stock_available` is the stock quantity.
pub(crate) fn sku(product_id: &str, code: &str, size: f64, price: i64, available: i32) -> Sku {
    Sku {
        sku: code.to_string(),
        product_id: product_id.to_string(),
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
        brand: "Nike".to_string(),
        category: "Running".to_string(),
        product_name: product_id.to_string(),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}
