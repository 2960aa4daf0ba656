//! SeaORM entities for the `products` and `skus` tables

pub mod product;
pub mod sku;
