//! Listing photo database entity.

use sea_orm::entity::prelude::*;

use crate::domain::CarPhoto;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "car_photos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub car_id: i64,
    pub image_url: String,
    pub is_main: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::car::Entity",
        from = "Column::CarId",
        to = "super::car::Column::Id",
        on_delete = "Cascade"
    )]
    Car,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CarPhoto {
    fn from(model: Model) -> Self {
        CarPhoto {
            id: model.id,
            car_id: model.car_id,
            image_url: model.image_url,
            is_main: model.is_main,
            created_at: model.created_at,
        }
    }
}
