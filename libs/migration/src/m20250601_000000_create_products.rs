use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE OR REPLACE FUNCTION touch_updated_at()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql
                "#,
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(string(Products::ProductId).primary_key())
                    .col(string(Products::Name))
                    .col(string(Products::Brand))
                    .col(string(Products::Category))
                    .col(text(Products::Description).default(""))
                    // cents
                    .col(big_integer(Products::BasePrice))
                    .col(json(Products::Images))
                    .col(json(Products::Materials).default("[]"))
                    .col(json(Products::Technology).default("[]"))
                    .col(json(Products::AvailableSizes).default("[]"))
                    .col(json(Products::AvailableColors).default("[]"))
                    .col(boolean(Products::IsFeatured).default(false))
                    .col(double(Products::Rating).default(0.0))
                    .col(integer(Products::ReviewsCount).default(0))
                    .col(timestamp_with_time_zone_null(Products::ReleaseDate))
                    .col(
                        timestamp_with_time_zone(Products::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Products::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_products_brand", Products::Brand),
            ("idx_products_category", Products::Category),
            ("idx_products_is_featured", Products::IsFeatured),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Products::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER products_touch_updated_at
                    BEFORE UPDATE ON products
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
            .execute_unprepared("DROP TRIGGER IF EXISTS products_touch_updated_at ON products")
            .await?;

        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP FUNCTION IF EXISTS touch_updated_at()")
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Products {
    Table,
    ProductId,
    Name,
    Brand,
    Category,
    Description,
    BasePrice,
    Images,
    Materials,
    Technology,
    AvailableSizes,
    AvailableColors,
    IsFeatured,
    Rating,
    ReviewsCount,
    ReleaseDate,
    CreatedAt,
    UpdatedAt,
}
