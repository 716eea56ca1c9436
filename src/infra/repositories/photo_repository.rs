//! Listing photo repository.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Query, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::{
    brand::{self, Entity as BrandEntity},
    car::{self, Entity as CarEntity},
    car_model::{self, Entity as CarModelEntity},
    car_photo::{self, ActiveModel, Entity as PhotoEntity},
};
use super::search::icontains;
use crate::domain::{AdminQuery, CarPhoto, PhotoInput};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Photo repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Photos of a listing, main photo first
    async fn photos_of(&self, car_id: i64) -> AppResult<Vec<CarPhoto>>;

    async fn find(&self, id: i64) -> AppResult<Option<CarPhoto>>;

    async fn update(&self, id: i64, input: PhotoInput) -> AppResult<CarPhoto>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Admin list: search on brand and model names of the listing
    async fn search(&self, query: AdminQuery) -> AppResult<(Vec<CarPhoto>, u64)>;
}

/// Concrete implementation of PhotoRepository
pub struct PhotoStore {
    pub(crate) db: DatabaseConnection,
}

impl PhotoStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn photos_of<C: ConnectionTrait>(db: &C, car_id: i64) -> AppResult<Vec<CarPhoto>> {
    let models = PhotoEntity::find()
        .filter(car_photo::Column::CarId.eq(car_id))
        .order_by_desc(car_photo::Column::IsMain)
        .order_by_asc(car_photo::Column::CreatedAt)
        .order_by_asc(car_photo::Column::Id)
        .all(db)
        .await
        .map_err(AppError::from)?;

    Ok(models.into_iter().map(CarPhoto::from).collect())
}

/// Replace every photo of a listing with `photos`
pub(crate) async fn replace_photos<C: ConnectionTrait>(
    db: &C,
    car_id: i64,
    photos: Vec<PhotoInput>,
) -> AppResult<Vec<CarPhoto>> {
    PhotoEntity::delete_many()
        .filter(car_photo::Column::CarId.eq(car_id))
        .exec(db)
        .await?;

    let now = chrono::Utc::now();
    for photo in photos {
        ActiveModel {
            car_id: Set(car_id),
            image_url: Set(photo.image_url),
            is_main: Set(photo.is_main),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    photos_of(db, car_id).await
}

#[async_trait]
impl PhotoRepository for PhotoStore {
    async fn photos_of(&self, car_id: i64) -> AppResult<Vec<CarPhoto>> {
        photos_of(&self.db, car_id).await
    }

    async fn find(&self, id: i64) -> AppResult<Option<CarPhoto>> {
        let result = PhotoEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(CarPhoto::from))
    }

    async fn update(&self, id: i64, input: PhotoInput) -> AppResult<CarPhoto> {
        let existing = PhotoEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.image_url = Set(input.image_url);
        active.is_main = Set(input.is_main);

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(CarPhoto::from(model))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = PhotoEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn search(&self, query: AdminQuery) -> AppResult<(Vec<CarPhoto>, u64)> {
        let mut select = PhotoEntity::find();
        for term in query.search_terms() {
            let brand_ids = Query::select()
                .column(brand::Column::Id)
                .from(BrandEntity)
                .and_where(icontains((BrandEntity, brand::Column::Name), &term))
                .to_owned();
            let model_ids = Query::select()
                .column(car_model::Column::Id)
                .from(CarModelEntity)
                .and_where(icontains((CarModelEntity, car_model::Column::Name), &term))
                .to_owned();
            let car_ids = Query::select()
                .column(car::Column::Id)
                .from(CarEntity)
                .cond_where(
                    Condition::any()
                        .add(car::Column::BrandId.in_subquery(brand_ids))
                        .add(car::Column::ModelId.in_subquery(model_ids)),
                )
                .to_owned();
            select = select.filter(car_photo::Column::CarId.in_subquery(car_ids));
        }
        if let Some(car_id) = query.car {
            select = select.filter(car_photo::Column::CarId.eq(car_id));
        }
        if let Some(is_main) = query.is_main {
            select = select.filter(car_photo::Column::IsMain.eq(is_main));
        }
        let (from, to) = query.created_range();
        if let Some(from) = from {
            select = select.filter(car_photo::Column::CreatedAt.gte(from));
        }
        if let Some(to) = to {
            select = select.filter(car_photo::Column::CreatedAt.lt(to));
        }

        let paginator = select
            .order_by_desc(car_photo::Column::CreatedAt)
            .order_by_desc(car_photo::Column::Id)
            .paginate(&self.db, query.per_page());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(query.page() - 1).await?;

        Ok((models.into_iter().map(CarPhoto::from).collect(), total))
    }
}
