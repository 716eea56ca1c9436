//! Favorite repository.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Query, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::{
    brand::{self, Entity as BrandEntity},
    car::{self, Entity as CarEntity},
    favorite::{self, ActiveModel, Entity as FavoriteEntity},
    user::{self, Entity as UserEntity},
};
use super::search::icontains;
use crate::domain::{AdminQuery, Favorite};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Favorite repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Fails with `Conflict` when the pair already exists
    async fn add(&self, user_id: i64, car_id: i64) -> AppResult<Favorite>;

    async fn remove(&self, user_id: i64, car_id: i64) -> AppResult<()>;

    /// Newest first
    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<Favorite>>;

    async fn find(&self, id: i64) -> AppResult<Option<Favorite>>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Admin list: search on username and brand name
    async fn search(&self, query: AdminQuery) -> AppResult<(Vec<Favorite>, u64)>;
}

/// Concrete implementation of FavoriteRepository
pub struct FavoriteStore {
    pub(crate) db: DatabaseConnection,
}

impl FavoriteStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FavoriteRepository for FavoriteStore {
    async fn add(&self, user_id: i64, car_id: i64) -> AppResult<Favorite> {
        let active_model = ActiveModel {
            user_id: Set(user_id),
            car_id: Set(car_id),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::conflict("Favorite"),
            other => other,
        })?;
        Ok(Favorite::from(model))
    }

    async fn remove(&self, user_id: i64, car_id: i64) -> AppResult<()> {
        let result = FavoriteEntity::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::CarId.eq(car_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<Favorite>> {
        let models = FavoriteEntity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .order_by_desc(favorite::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Favorite::from).collect())
    }

    async fn find(&self, id: i64) -> AppResult<Option<Favorite>> {
        let result = FavoriteEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Favorite::from))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = FavoriteEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn search(&self, query: AdminQuery) -> AppResult<(Vec<Favorite>, u64)> {
        let mut select = FavoriteEntity::find();
        for term in query.search_terms() {
            let user_ids = Query::select()
                .column(user::Column::Id)
                .from(UserEntity)
                .and_where(icontains((UserEntity, user::Column::Username), &term))
                .to_owned();
            let brand_ids = Query::select()
                .column(brand::Column::Id)
                .from(BrandEntity)
                .and_where(icontains((BrandEntity, brand::Column::Name), &term))
                .to_owned();
            let car_ids = Query::select()
                .column(car::Column::Id)
                .from(CarEntity)
                .and_where(car::Column::BrandId.in_subquery(brand_ids))
                .to_owned();
            select = select.filter(
                Condition::any()
                    .add(favorite::Column::UserId.in_subquery(user_ids))
                    .add(favorite::Column::CarId.in_subquery(car_ids)),
            );
        }
        if let Some(user_id) = query.user {
            select = select.filter(favorite::Column::UserId.eq(user_id));
        }
        let (from, to) = query.created_range();
        if let Some(from) = from {
            select = select.filter(favorite::Column::CreatedAt.gte(from));
        }
        if let Some(to) = to {
            select = select.filter(favorite::Column::CreatedAt.lt(to));
        }

        let paginator = select
            .order_by_desc(favorite::Column::CreatedAt)
            .order_by_desc(favorite::Column::Id)
            .paginate(&self.db, query.per_page());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(query.page() - 1).await?;

        Ok((models.into_iter().map(Favorite::from).collect(), total))
    }
}
