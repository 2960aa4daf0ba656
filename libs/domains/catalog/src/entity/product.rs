use sea_orm::entity::prelude::*;
use serde::de::DeserializeOwned;

use crate::models::{Product, ProductImages};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// cents
    pub base_price: i64,
    pub images: Json,
    pub materials: Json,
    pub technology: Json,
    pub available_sizes: Json,
    pub available_colors: Json,
    pub is_featured: bool,
    pub rating: f64,
    pub reviews_count: i32,
    pub release_date: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sku::Entity")]
    Skus,
}

impl Related<super::sku::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Skus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        let id = model.product_id.as_str();
        let images: ProductImages = json_column(id, "images", model.images);
        let materials = json_column(id, "materials", model.materials);
        let technology = json_column(id, "technology", model.technology);
        let available_sizes = json_column(id, "available_sizes", model.available_sizes);
        let available_colors = json_column(id, "available_colors", model.available_colors);

        Self {
            product_id: model.product_id,
            name: model.name,
            brand: model.brand,
            category: model.category,
            description: model.description,
            base_price: model.base_price,
            images,
            materials,
            technology,
            available_sizes,
            available_colors,
            is_featured: model.is_featured,
            rating: model.rating,
            reviews_count: model.reviews_count,
            release_date: model.release_date.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Decode a JSON column, falling back to the empty value with a warning.
fn json_column<T>(product_id: &str, column: &'static str, value: serde_json::Value) -> T
where
    T: DeserializeOwned + Default,
{
    match serde_json::from_value(value) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!(
                product_id,
                column,
                error = %e,
                "Malformed JSON column, using an empty value"
            );
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_column_decodes_well_formed_values() {
        let sizes: Vec<f64> = json_column("am97", "available_sizes", json!([9.0, 10.5]));
        assert_eq!(sizes, vec![9.0, 10.5]);
    }

    #[test]
    fn test_json_column_falls_back_on_malformed_values() {
        let technology: Vec<String> = json_column("am97", "technology", json!("Air"));
        assert!(technology.is_empty());

        let images: ProductImages = json_column("am97", "images", json!(42));
        assert_eq!(images, ProductImages::default());
    }
}
