use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::ProductId))
                    .col(integer(Products::UserId))
                    .col(string(Products::ModelName))
                    .col(text(Products::Description))
                    .col(double(Products::Price))
                    .col(integer(Products::Quantity))
                    .col(boolean(Products::IsFeaturedAd).default(false))
                    .col(string_null(Products::ImageUri))
                    .col(
                        timestamp_with_time_zone(Products::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Products::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Products::Price).gte(0))
                    .check(Expr::col(Products::Quantity).gte(0))
                    // Removing a user removes their listings
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_user_id")
                            .from(Products::Table, Products::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_user_id")
                    .table(Products::Table)
                    .col(Products::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_model_name")
                    .table(Products::Table)
                    .col(Products::ModelName)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER products_touch_updated_at
                    BEFORE UPDATE ON products
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    ProductId,
    UserId,
    ModelName,
    Description,
    Price,
    Quantity,
    IsFeaturedAd,
    ImageUri,
    CreatedAt,
    UpdatedAt,
}
