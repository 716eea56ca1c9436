//! Migration: car listings and their photos.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240101_000002_create_catalog_tables::{Brands, Models};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cars::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cars::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cars::SellerId).big_integer().not_null())
                    .col(ColumnDef::new(Cars::CreatedBy).big_integer().null())
                    .col(ColumnDef::new(Cars::BrandId).big_integer().not_null())
                    .col(ColumnDef::new(Cars::ModelId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Cars::Year)
                            .integer()
                            .not_null()
                            .check(Expr::col(Cars::Year).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Cars::Mileage)
                            .integer()
                            .null()
                            .check(Expr::col(Cars::Mileage).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Cars::Price)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Cars::Price).gte(0)),
                    )
                    .col(ColumnDef::new(Cars::Description).text().not_null())
                    .col(
                        ColumnDef::new(Cars::MainImageUrl)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Cars::Status)
                            .string_len(20)
                            .not_null()
                            .default("moderation"),
                    )
                    .col(
                        ColumnDef::new(Cars::Views)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Cars::Views).gte(0)),
                    )
                    .col(ColumnDef::new(Cars::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Cars::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cars_seller_id")
                            .from(Cars::Table, Cars::SellerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cars_created_by")
                            .from(Cars::Table, Cars::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cars_brand_id")
                            .from(Cars::Table, Cars::BrandId)
                            .to(Brands::Table, Brands::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cars_model_id")
                            .from(Cars::Table, Cars::ModelId)
                            .to(Models::Table, Models::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cars_status_created_at")
                    .table(Cars::Table)
                    .col(Cars::Status)
                    .col(Cars::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CarPhotos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CarPhotos::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CarPhotos::CarId).big_integer().not_null())
                    .col(ColumnDef::new(CarPhotos::ImageUrl).string_len(255).not_null())
                    .col(ColumnDef::new(CarPhotos::IsMain).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(CarPhotos::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_car_photos_car_id")
                            .from(CarPhotos::Table, CarPhotos::CarId)
                            .to(Cars::Table, Cars::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CarPhotos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cars::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Cars {
    Table,
    Id,
    SellerId,
    CreatedBy,
    BrandId,
    ModelId,
    Year,
    Mileage,
    Price,
    Description,
    MainImageUrl,
    Status,
    Views,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CarPhotos {
    Table,
    Id,
    CarId,
    ImageUrl,
    IsMain,
    CreatedAt,
}
