//! Car model database entity (table `models`).

use sea_orm::entity::prelude::*;

use crate::domain::CarModel;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "models")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub brand_id: i64,
    pub name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id",
        on_delete = "Cascade"
    )]
    Brand,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CarModel {
    fn from(model: Model) -> Self {
        CarModel {
            id: model.id,
            brand_id: model.brand_id,
            name: model.name,
            created_at: model.created_at,
        }
    }
}
