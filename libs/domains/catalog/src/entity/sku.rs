use sea_orm::entity::prelude::*;

use crate::models::Sku;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "skus")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub sku: String,
    pub product_id: String,
    pub size: f64,
    pub color_code: String,
    pub color_name: String,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub stock_quantity: i32,
    pub stock_reserved: i32,
    pub stock_available: i32,
    pub is_flash_sale: bool,
    pub flash_sale_end: Option<DateTimeWithTimeZone>,
    pub brand: String,
    pub category: String,
    pub product_name: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::ProductId",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Sku {
    fn from(model: Model) -> Self {
        Self {
            sku: model.sku,
            product_id: model.product_id,
            size: model.size,
            color_code: model.color_code,
            color_name: model.color_name,
            price: model.price,
            sale_price: model.sale_price,
            stock_quantity: model.stock_quantity,
            stock_reserved: model.stock_reserved,
            stock_available: model.stock_available,
            is_flash_sale: model.is_flash_sale,
            flash_sale_end: model.flash_sale_end.map(Into::into),
            brand: model.brand,
            category: model.category,
            product_name: model.product_name,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}
