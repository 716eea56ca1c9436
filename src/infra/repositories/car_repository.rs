//! Car listing repository.
//!
//! Every public read goes through `hydrate`, which attaches brand, model
//! and seller names with one batched query per table.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Query},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};

use super::entities::{
    brand::{self, Entity as BrandEntity},
    car::{self, ActiveModel, Entity as CarEntity},
    car_model::{self, Entity as CarModelEntity},
    user::{self, Entity as UserEntity},
};
use super::search::icontains;
use crate::config::{
    CHEAP_NEW_MIN_YEAR, CHEAP_NEW_PRICE_LIMIT, EXPENSIVE_PRICE_BOUND, OLD_YEAR_BOUND,
    STATUS_ACTIVE, STATUS_MODERATION, STATUS_SOLD,
};
use crate::domain::{AdminQuery, Car, CarFilter, CarInput, CarListing, CarOrderField, CarStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Car repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Active listings matching the filter
    async fn list(&self, filter: CarFilter) -> AppResult<Vec<CarListing>>;

    /// One page of active listings, newest first, with the total count
    async fn page_active(&self, page: u64, per_page: u64) -> AppResult<(Vec<CarListing>, u64)>;

    /// Listing in any status
    async fn find(&self, id: i64) -> AppResult<Option<Car>>;

    async fn find_listing(&self, id: i64) -> AppResult<Option<CarListing>>;

    async fn find_active_listing(&self, id: i64) -> AppResult<Option<CarListing>>;

    /// Seller and creator are both set to `seller_id`
    async fn create(&self, seller_id: i64, input: CarInput) -> AppResult<Car>;

    async fn update(&self, id: i64, input: CarInput) -> AppResult<Car>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Atomically bump the counter of an active listing.
    ///
    /// Returns the stored count after the increment, or `None` when no
    /// active listing has this id.
    async fn increment_views(&self, id: i64) -> AppResult<Option<i32>>;

    /// Active listings for the export report, oldest id first.
    /// `ids` narrows the set to a selection.
    async fn export_rows(&self, ids: Option<Vec<i64>>) -> AppResult<Vec<CarListing>>;

    /// Admin list over every status
    async fn search(&self, query: AdminQuery) -> AppResult<(Vec<CarListing>, u64)>;
}

/// Concrete implementation of CarRepository
pub struct CarStore {
    pub(crate) db: DatabaseConnection,
}

impl CarStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn active() -> Select<CarEntity> {
    CarEntity::find().filter(car::Column::Status.eq(STATUS_ACTIVE))
}

/// Listing ids whose description, brand name or model name contains `term`
fn matches_term(term: &str) -> Condition {
    let brand_ids = Query::select()
        .column(brand::Column::Id)
        .from(BrandEntity)
        .and_where(icontains((BrandEntity, brand::Column::Name), term))
        .to_owned();
    let model_ids = Query::select()
        .column(car_model::Column::Id)
        .from(CarModelEntity)
        .and_where(icontains((CarModelEntity, car_model::Column::Name), term))
        .to_owned();

    Condition::any()
        .add(icontains((CarEntity, car::Column::Description), term))
        .add(car::Column::BrandId.in_subquery(brand_ids))
        .add(car::Column::ModelId.in_subquery(model_ids))
}

fn apply_filter(mut select: Select<CarEntity>, filter: &CarFilter) -> Select<CarEntity> {
    if let Some(seller_id) = filter.seller_id {
        select = select.filter(car::Column::SellerId.eq(seller_id));
    }
    if let Some(brand_id) = filter.brand_id {
        select = select.filter(car::Column::BrandId.eq(brand_id));
    }
    if let Some(model_id) = filter.model_id {
        select = select.filter(car::Column::ModelId.eq(model_id));
    }
    if let Some(year) = filter.year {
        select = select.filter(car::Column::Year.eq(year));
    }
    if let Some(status) = filter.status {
        select = select.filter(car::Column::Status.eq(status.as_str()));
    }
    if let Some(price) = filter.price {
        select = select.filter(car::Column::Price.eq(price));
    }
    if let Some(max_price) = filter.max_price {
        select = select.filter(car::Column::Price.lte(max_price));
    }
    if filter.cheap_new_not_moderation {
        select = select.filter(
            Condition::all()
                .add(car::Column::Price.lte(CHEAP_NEW_PRICE_LIMIT))
                .add(car::Column::Year.gte(CHEAP_NEW_MIN_YEAR))
                .add(car::Column::Status.ne(STATUS_MODERATION)),
        );
    }
    if filter.old_or_expensive_not_sold {
        select = select.filter(
            Condition::all()
                .add(
                    Condition::any()
                        .add(car::Column::Year.lt(OLD_YEAR_BOUND))
                        .add(car::Column::Price.gt(EXPENSIVE_PRICE_BOUND)),
                )
                .add(car::Column::Status.ne(STATUS_SOLD)),
        );
    }
    for term in &filter.search {
        select = select.filter(matches_term(term));
    }

    for ordering in &filter.ordering {
        let column = match ordering.field {
            CarOrderField::Price => car::Column::Price,
            CarOrderField::Year => car::Column::Year,
            CarOrderField::CreatedAt => car::Column::CreatedAt,
            CarOrderField::Views => car::Column::Views,
        };
        let order = if ordering.descending { Order::Desc } else { Order::Asc };
        select = select.order_by(column, order);
    }
    if filter.ordering.is_empty() {
        select = select.order_by_desc(car::Column::CreatedAt);
    }
    select.order_by_desc(car::Column::Id)
}

/// Attach brand, model and seller names to raw rows, keeping their order.
async fn hydrate<C: ConnectionTrait>(
    db: &C,
    rows: Vec<car::Model>,
) -> AppResult<Vec<CarListing>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let brand_ids: Vec<i64> = rows.iter().map(|r| r.brand_id).collect();
    let model_ids: Vec<i64> = rows.iter().map(|r| r.model_id).collect();
    let seller_ids: Vec<i64> = rows.iter().map(|r| r.seller_id).collect();

    let brands: HashMap<i64, String> = BrandEntity::find()
        .filter(brand::Column::Id.is_in(brand_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|b| (b.id, b.name))
        .collect();
    let models: HashMap<i64, String> = CarModelEntity::find()
        .filter(car_model::Column::Id.is_in(model_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m.name))
        .collect();
    let sellers: HashMap<i64, String> = UserEntity::find()
        .filter(user::Column::Id.is_in(seller_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| {
            let brand_name = brands.get(&row.brand_id).cloned().unwrap_or_default();
            let model_name = models.get(&row.model_id).cloned().unwrap_or_default();
            let seller_username = sellers.get(&row.seller_id).cloned();
            CarListing {
                car: Car::from(row),
                brand_name,
                model_name,
                seller_username,
            }
        })
        .collect())
}

#[async_trait]
impl CarRepository for CarStore {
    async fn list(&self, filter: CarFilter) -> AppResult<Vec<CarListing>> {
        let rows = apply_filter(active(), &filter)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        hydrate(&self.db, rows).await
    }

    async fn page_active(&self, page: u64, per_page: u64) -> AppResult<(Vec<CarListing>, u64)> {
        let paginator = active()
            .order_by_desc(car::Column::CreatedAt)
            .order_by_desc(car::Column::Id)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((hydrate(&self.db, rows).await?, total))
    }

    async fn find(&self, id: i64) -> AppResult<Option<Car>> {
        let result = CarEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Car::from))
    }

    async fn find_listing(&self, id: i64) -> AppResult<Option<CarListing>> {
        let row = CarEntity::find_by_id(id).one(&self.db).await?;
        let mut listings = hydrate(&self.db, row.into_iter().collect()).await?;
        Ok(listings.pop())
    }

    async fn find_active_listing(&self, id: i64) -> AppResult<Option<CarListing>> {
        let row = active()
            .filter(car::Column::Id.eq(id))
            .one(&self.db)
            .await?;
        let mut listings = hydrate(&self.db, row.into_iter().collect()).await?;
        Ok(listings.pop())
    }

    async fn create(&self, seller_id: i64, input: CarInput) -> AppResult<Car> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            seller_id: Set(seller_id),
            created_by: Set(Some(seller_id)),
            brand_id: Set(input.brand),
            model_id: Set(input.model),
            year: Set(input.year),
            mileage: Set(input.mileage),
            price: Set(input.price),
            description: Set(input.description),
            main_image_url: Set(input.main_image_url),
            status: Set(input.status.as_str().to_string()),
            views: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(Car::from(model))
    }

    async fn update(&self, id: i64, input: CarInput) -> AppResult<Car> {
        let existing = CarEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.brand_id = Set(input.brand);
        active.model_id = Set(input.model);
        active.year = Set(input.year);
        active.mileage = Set(input.mileage);
        active.price = Set(input.price);
        active.description = Set(input.description);
        active.main_image_url = Set(input.main_image_url);
        active.status = Set(input.status.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Car::from(model))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = CarEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn increment_views(&self, id: i64) -> AppResult<Option<i32>> {
        let updated = CarEntity::update_many()
            .col_expr(car::Column::Views, Expr::col(car::Column::Views).add(1))
            .filter(car::Column::Id.eq(id))
            .filter(car::Column::Status.eq(STATUS_ACTIVE))
            .exec_with_returning(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(updated.into_iter().next().map(|row| row.views))
    }

    async fn export_rows(&self, ids: Option<Vec<i64>>) -> AppResult<Vec<CarListing>> {
        let mut select = active();
        if let Some(ids) = ids {
            select = select.filter(car::Column::Id.is_in(ids));
        }
        let rows = select
            .order_by_asc(car::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        hydrate(&self.db, rows).await
    }

    async fn search(&self, query: AdminQuery) -> AppResult<(Vec<CarListing>, u64)> {
        let mut select = CarEntity::find();
        for term in query.search_terms() {
            select = select.filter(matches_term(&term));
        }
        if let Some(status) = query.status.as_deref().and_then(CarStatus::parse) {
            select = select.filter(car::Column::Status.eq(status.as_str()));
        }
        if let Some(brand_id) = query.brand {
            select = select.filter(car::Column::BrandId.eq(brand_id));
        }
        if let Some(year) = query.year {
            select = select.filter(car::Column::Year.eq(year));
        }
        let (from, to) = query.created_range();
        if let Some(from) = from {
            select = select.filter(car::Column::CreatedAt.gte(from));
        }
        if let Some(to) = to {
            select = select.filter(car::Column::CreatedAt.lt(to));
        }

        let paginator = select
            .order_by_desc(car::Column::CreatedAt)
            .order_by_desc(car::Column::Id)
            .paginate(&self.db, query.per_page());
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(query.page() - 1).await?;

        Ok((hydrate(&self.db, rows).await?, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_named_filters_render_expected_sql() {
        let filter = CarFilter {
            cheap_new_not_moderation: true,
            old_or_expensive_not_sold: true,
            ..Default::default()
        };
        let sql = apply_filter(active(), &filter)
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""cars"."price" <= 1500000"#), "{}", sql);
        assert!(sql.contains(r#""cars"."year" >= 2024"#), "{}", sql);
        assert!(sql.contains(r#""cars"."status" <> 'moderation'"#), "{}", sql);
        assert!(sql.contains(r#""cars"."year" < 2015 OR "cars"."price" > 3000000"#), "{}", sql);
        assert!(sql.contains(r#""cars"."status" <> 'sold'"#), "{}", sql);
    }

    #[test]
    fn test_default_ordering_is_newest_first() {
        let sql = apply_filter(active(), &CarFilter::default())
            .build(DbBackend::Postgres)
            .to_string();
        assert!(
            sql.ends_with(r#"ORDER BY "cars"."created_at" DESC, "cars"."id" DESC"#),
            "{}",
            sql
        );
    }
}
