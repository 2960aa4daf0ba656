use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250601_000000_create_products::Products;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Skus::Table)
                    .if_not_exists()
                    .col(string(Skus::Sku).primary_key())
                    .col(string(Skus::ProductId))
                    .col(double(Skus::Size))
                    .col(string(Skus::ColorCode))
                    .col(string(Skus::ColorName))
                    .col(big_integer(Skus::Price))
                    .col(big_integer_null(Skus::SalePrice))
                    .col(integer(Skus::StockQuantity).default(0))
                    .col(integer(Skus::StockReserved).default(0))
                    .col(integer(Skus::StockAvailable).default(0))
                    .col(boolean(Skus::IsFlashSale).default(false))
                    .col(timestamp_with_time_zone_null(Skus::FlashSaleEnd))
                    .col(string(Skus::Brand))
                    .col(string(Skus::Category))
                    .col(string(Skus::ProductName))
                    .col(
                        timestamp_with_time_zone(Skus::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Skus::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_skus_product_id")
                            .from(Skus::Table, Skus::ProductId)
                            .to(Products::Table, Products::ProductId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE skus
                    ADD CONSTRAINT skus_stock_available_consistent
                    CHECK (stock_available = GREATEST(stock_quantity - stock_reserved, 0)),
                    ADD CONSTRAINT skus_flash_sale_end_requires_flag
                    CHECK (is_flash_sale OR flash_sale_end IS NULL)
                "#,
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_skus_product_stock")
                    .table(Skus::Table)
                    .col(Skus::ProductId)
                    .col(Skus::StockAvailable)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_skus_flash_sale")
                    .table(Skus::Table)
                    .col(Skus::IsFlashSale)
                    .col(Skus::FlashSaleEnd)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_skus_price")
                    .table(Skus::Table)
                    .col(Skus::Price)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER skus_touch_updated_at
                    BEFORE UPDATE ON skus
                    FOR EACH ROW
                    EXECUTE FUNCTION touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS skus_touch_updated_at ON skus")
            .await?;

        manager
            .drop_table(Table::drop().table(Skus::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Skus {
    Table,
    Sku,
    ProductId,
    Size,
    ColorCode,
    ColorName,
    Price,
    SalePrice,
    StockQuantity,
    StockReserved,
    StockAvailable,
    IsFlashSale,
    FlashSaleEnd,
    Brand,
    Category,
    ProductName,
    CreatedAt,
    UpdatedAt,
}
