//! Car listing database entity.

use sea_orm::entity::prelude::*;

use crate::domain::{Car, CarStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cars")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub seller_id: i64,
    pub created_by: Option<i64>,
    pub brand_id: i64,
    pub model_id: i64,
    pub year: i32,
    pub mileage: Option<i32>,
    pub price: i64,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub main_image_url: String,
    pub status: String,
    pub views: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SellerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Seller,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Creator,
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id",
        on_delete = "Restrict"
    )]
    Brand,
    #[sea_orm(
        belongs_to = "super::car_model::Entity",
        from = "Column::ModelId",
        to = "super::car_model::Column::Id",
        on_delete = "Restrict"
    )]
    CarModel,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Car {
    fn from(model: Model) -> Self {
        Car {
            id: model.id,
            seller_id: model.seller_id,
            created_by: model.created_by,
            brand_id: model.brand_id,
            model_id: model.model_id,
            year: model.year,
            mileage: model.mileage,
            price: model.price,
            description: model.description,
            main_image_url: model.main_image_url,
            status: CarStatus::parse(&model.status).unwrap_or_default(),
            views: model.views,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
