//! Brand and model catalog repository.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Query, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::{
    brand::{self, Entity as BrandEntity},
    car_model::{self, Entity as CarModelEntity},
};
use super::search::icontains;
use crate::domain::{AdminQuery, Brand, BrandOrdering, CarModel, CarModelInput};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Brand/model repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BrandRepository: Send + Sync {
    /// Brands whose name contains every search term
    async fn list(&self, search: Vec<String>, ordering: BrandOrdering) -> AppResult<Vec<Brand>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Brand>>;

    async fn create(&self, name: String) -> AppResult<Brand>;

    async fn rename(&self, id: i64, name: String) -> AppResult<Brand>;

    /// Fails with `Protected` while listings reference the brand
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Every model, ordered by name (form select boxes)
    async fn all_models(&self) -> AppResult<Vec<CarModel>>;

    async fn models_of(&self, brand_id: i64) -> AppResult<Vec<CarModel>>;

    async fn find_model(&self, id: i64) -> AppResult<Option<CarModel>>;

    async fn create_model(&self, input: CarModelInput) -> AppResult<CarModel>;

    async fn update_model(&self, id: i64, input: CarModelInput) -> AppResult<CarModel>;

    /// Fails with `Protected` while listings reference the model
    async fn delete_model(&self, id: i64) -> AppResult<()>;

    async fn search_brands(&self, query: AdminQuery) -> AppResult<(Vec<Brand>, u64)>;

    /// Admin list: search on model and brand name, filter by brand
    async fn search_models(&self, query: AdminQuery) -> AppResult<(Vec<CarModel>, u64)>;
}

/// Concrete implementation of BrandRepository
pub struct BrandStore {
    pub(crate) db: DatabaseConnection,
}

impl BrandStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BrandRepository for BrandStore {
    async fn list(&self, search: Vec<String>, ordering: BrandOrdering) -> AppResult<Vec<Brand>> {
        let mut select = BrandEntity::find();
        for term in &search {
            select = select.filter(icontains(brand::Column::Name, term));
        }
        select = match ordering {
            BrandOrdering::NameAsc => select.order_by_asc(brand::Column::Name),
            BrandOrdering::NameDesc => select.order_by_desc(brand::Column::Name),
            BrandOrdering::CreatedAtAsc => select.order_by_asc(brand::Column::CreatedAt),
            BrandOrdering::CreatedAtDesc => select.order_by_desc(brand::Column::CreatedAt),
        };

        let models = select.all(&self.db).await.map_err(AppError::from)?;
        Ok(models.into_iter().map(Brand::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Brand>> {
        let result = BrandEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Brand::from))
    }

    async fn create(&self, name: String) -> AppResult<Brand> {
        let active_model = brand::ActiveModel {
            name: Set(name),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(Brand::from(model))
    }

    async fn rename(&self, id: i64, name: String) -> AppResult<Brand> {
        let existing = BrandEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: brand::ActiveModel = existing.into();
        active.name = Set(name);

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Brand::from(model))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = BrandEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn all_models(&self) -> AppResult<Vec<CarModel>> {
        let models = CarModelEntity::find()
            .order_by_asc(car_model::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(CarModel::from).collect())
    }

    async fn models_of(&self, brand_id: i64) -> AppResult<Vec<CarModel>> {
        let models = CarModelEntity::find()
            .filter(car_model::Column::BrandId.eq(brand_id))
            .order_by_asc(car_model::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(CarModel::from).collect())
    }

    async fn find_model(&self, id: i64) -> AppResult<Option<CarModel>> {
        let result = CarModelEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(CarModel::from))
    }

    async fn create_model(&self, input: CarModelInput) -> AppResult<CarModel> {
        let active_model = car_model::ActiveModel {
            brand_id: Set(input.brand_id),
            name: Set(input.name),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(CarModel::from(model))
    }

    async fn update_model(&self, id: i64, input: CarModelInput) -> AppResult<CarModel> {
        let existing = CarModelEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: car_model::ActiveModel = existing.into();
        active.brand_id = Set(input.brand_id);
        active.name = Set(input.name);

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(CarModel::from(model))
    }

    async fn delete_model(&self, id: i64) -> AppResult<()> {
        let result = CarModelEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn search_brands(&self, query: AdminQuery) -> AppResult<(Vec<Brand>, u64)> {
        let mut select = BrandEntity::find();
        for term in query.search_terms() {
            select = select.filter(icontains(brand::Column::Name, &term));
        }
        let (from, to) = query.created_range();
        if let Some(from) = from {
            select = select.filter(brand::Column::CreatedAt.gte(from));
        }
        if let Some(to) = to {
            select = select.filter(brand::Column::CreatedAt.lt(to));
        }

        let paginator = select
            .order_by_asc(brand::Column::Name)
            .paginate(&self.db, query.per_page());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(query.page() - 1).await?;

        Ok((models.into_iter().map(Brand::from).collect(), total))
    }

    async fn search_models(&self, query: AdminQuery) -> AppResult<(Vec<CarModel>, u64)> {
        let mut select = CarModelEntity::find();
        for term in query.search_terms() {
            let brand_ids = Query::select()
                .column(brand::Column::Id)
                .from(BrandEntity)
                .and_where(icontains((BrandEntity, brand::Column::Name), &term))
                .to_owned();
            select = select.filter(
                Condition::any()
                    .add(icontains((CarModelEntity, car_model::Column::Name), &term))
                    .add(car_model::Column::BrandId.in_subquery(brand_ids)),
            );
        }
        if let Some(brand_id) = query.brand {
            select = select.filter(car_model::Column::BrandId.eq(brand_id));
        }
        let (from, to) = query.created_range();
        if let Some(from) = from {
            select = select.filter(car_model::Column::CreatedAt.gte(from));
        }
        if let Some(to) = to {
            select = select.filter(car_model::Column::CreatedAt.lt(to));
        }

        let paginator = select
            .order_by_asc(car_model::Column::Name)
            .paginate(&self.db, query.per_page());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(query.page() - 1).await?;

        Ok((models.into_iter().map(CarModel::from).collect(), total))
    }
}
