//! Car listing service - browsing, filtering and owner-checked writes.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use crate::config::{BROWSE_PAGE_SIZE, CHEAP_PRICE_LIMIT};
use crate::domain::{
    validation_field_errors, Brand, Car, CarDetail, CarFilter, CarInput, CarListing, CarModel,
    ListingPage, ListingScope,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Brands and models offered by the listing form
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct FormChoices {
    pub brands: Vec<Brand>,
    pub models: Vec<CarModel>,
}

/// Field validation plus the brand/model pairing check
pub(crate) async fn check_car_input<U: UnitOfWork>(uow: &U, input: &CarInput) -> AppResult<()> {
    input.validate().map_err(validation_field_errors)?;

    if uow.brands().find_by_id(input.brand).await?.is_none() {
        return Err(AppError::field("brand", "Select a valid choice"));
    }
    match uow.brands().find_model(input.model).await? {
        None => Err(AppError::field("model", "Select a valid choice")),
        Some(model) if model.brand_id != input.brand => Err(AppError::field(
            "model",
            "The model does not belong to the selected brand",
        )),
        Some(_) => Ok(()),
    }
}

/// Car service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CarService: Send + Sync {
    /// Active listings matching the filter
    async fn list(&self, filter: CarFilter) -> AppResult<Vec<CarListing>>;

    /// Same as `list`, capped at the cheap price limit
    async fn cheap(&self, filter: CarFilter) -> AppResult<Vec<CarListing>>;

    /// Count one view of an active listing; returns the new total
    async fn record_view(&self, id: i64) -> AppResult<i32>;

    /// Public browse page, newest first
    async fn browse(&self, page: u64) -> AppResult<ListingPage>;

    /// Active listing with its photos
    async fn detail(&self, id: i64) -> AppResult<CarDetail>;

    /// Active listing
    async fn get(&self, id: i64) -> AppResult<CarListing>;

    /// Listing in any status, only for its seller
    async fn find_for_edit(&self, scope: ListingScope, user_id: i64, id: i64) -> AppResult<Car>;

    async fn create(&self, user_id: i64, input: CarInput) -> AppResult<CarListing>;

    async fn update(
        &self,
        scope: ListingScope,
        user_id: i64,
        id: i64,
        input: CarInput,
    ) -> AppResult<CarListing>;

    async fn delete(&self, scope: ListingScope, user_id: i64, id: i64) -> AppResult<()>;

    async fn form_choices(&self) -> AppResult<FormChoices>;
}

/// Concrete implementation of CarService using Unit of Work.
pub struct CarCatalog<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CarCatalog<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Out-of-scope listings are reported missing before ownership is checked
    async fn owned(&self, scope: ListingScope, user_id: i64, id: i64) -> AppResult<Car> {
        let car = self
            .uow
            .cars()
            .find(id)
            .await?
            .filter(|car| scope.admits(car))
            .ok_or_not_found()?;
        if !car.is_owned_by(user_id) {
            tracing::debug!(car_id = id, user_id, "Rejected write by non-owner");
            return Err(AppError::Forbidden);
        }
        Ok(car)
    }

    async fn listing(&self, id: i64) -> AppResult<CarListing> {
        self.uow.cars().find_listing(id).await?.ok_or_not_found()
    }
}

#[async_trait]
impl<U: UnitOfWork> CarService for CarCatalog<U> {
    async fn list(&self, filter: CarFilter) -> AppResult<Vec<CarListing>> {
        self.uow.cars().list(filter).await
    }

    async fn cheap(&self, mut filter: CarFilter) -> AppResult<Vec<CarListing>> {
        filter.max_price = Some(CHEAP_PRICE_LIMIT);
        self.uow.cars().list(filter).await
    }

    async fn record_view(&self, id: i64) -> AppResult<i32> {
        self.uow.cars().increment_views(id).await?.ok_or_not_found()
    }

    async fn browse(&self, page: u64) -> AppResult<ListingPage> {
        let page = page.max(1);
        let (cars, total) = self.uow.cars().page_active(page, BROWSE_PAGE_SIZE).await?;
        let total_pages = total.div_ceil(BROWSE_PAGE_SIZE).max(1);

        if page > total_pages {
            return Err(AppError::NotFound);
        }

        Ok(ListingPage {
            cars,
            page,
            total_pages,
            total,
        })
    }

    async fn detail(&self, id: i64) -> AppResult<CarDetail> {
        let listing = self.get(id).await?;
        let photos = self.uow.photos().photos_of(id).await?;
        Ok(CarDetail { listing, photos })
    }

    async fn get(&self, id: i64) -> AppResult<CarListing> {
        self.uow.cars().find_active_listing(id).await?.ok_or_not_found()
    }

    async fn find_for_edit(&self, scope: ListingScope, user_id: i64, id: i64) -> AppResult<Car> {
        self.owned(scope, user_id, id).await
    }

    async fn create(&self, user_id: i64, input: CarInput) -> AppResult<CarListing> {
        check_car_input(self.uow.as_ref(), &input).await?;
        let car = self.uow.cars().create(user_id, input).await?;
        tracing::info!(car_id = car.id, seller_id = user_id, "Listing created");
        self.listing(car.id).await
    }

    async fn update(
        &self,
        scope: ListingScope,
        user_id: i64,
        id: i64,
        input: CarInput,
    ) -> AppResult<CarListing> {
        self.owned(scope, user_id, id).await?;
        check_car_input(self.uow.as_ref(), &input).await?;
        self.uow.cars().update(id, input).await?;
        tracing::info!(car_id = id, "Listing updated");
        self.listing(id).await
    }

    async fn delete(&self, scope: ListingScope, user_id: i64, id: i64) -> AppResult<()> {
        self.owned(scope, user_id, id).await?;
        self.uow.cars().delete(id).await?;
        tracing::info!(car_id = id, "Listing deleted");
        Ok(())
    }

    async fn form_choices(&self) -> AppResult<FormChoices> {
        let brands = self
            .uow
            .brands()
            .list(Vec::new(), Default::default())
            .await?;
        let models = self.uow.brands().all_models().await?;
        Ok(FormChoices { brands, models })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CarStatus;
    use crate::infra::{MockBrandRepository, MockCarRepository};
    use crate::services::testing::{sample_car, sample_listing, TestUnitOfWork};
    use chrono::Utc;
    use mockall::predicate::eq;

    fn input(brand: i64, model: i64) -> CarInput {
        CarInput {
            brand,
            model,
            year: 2021,
            mileage: Some(10_000),
            price: 2_000_000,
            description: "Хорошее состояние".into(),
            main_image_url: String::new(),
            status: CarStatus::Active,
        }
    }

    fn catalog_with(brand_id: i64, model_brand_id: i64) -> MockBrandRepository {
        let mut brands = MockBrandRepository::new();
        brands.expect_find_by_id().returning(move |id| {
            let brand = Brand {
                id,
                name: "Toyota".into(),
                created_at: Utc::now(),
            };
            Ok((id == brand_id).then_some(brand))
        });
        brands.expect_find_model().returning(move |id| {
            Ok(Some(CarModel {
                id,
                brand_id: model_brand_id,
                name: "Camry".into(),
                created_at: Utc::now(),
            }))
        });
        brands
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden() {
        let mut cars = MockCarRepository::new();
        cars.expect_find()
            .with(eq(10))
            .returning(|id| Ok(Some(sample_car(id, 1, CarStatus::Active))));
        cars.expect_update().never();

        let uow = TestUnitOfWork::default().with_cars(cars);
        let service = CarCatalog::new(Arc::new(uow));
        let err = service.update(ListingScope::Any, 2, 10, input(1, 1)).await.unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_forbidden() {
        let mut cars = MockCarRepository::new();
        cars.expect_find()
            .returning(|id| Ok(Some(sample_car(id, 1, CarStatus::Active))));
        cars.expect_delete().never();

        let uow = TestUnitOfWork::default().with_cars(cars);
        let service = CarCatalog::new(Arc::new(uow));

        assert!(matches!(
            service.delete(ListingScope::Active, 2, 10).await.unwrap_err(),
            AppError::Forbidden
        ));
    }

    #[tokio::test]
    async fn test_update_by_owner() {
        let mut cars = MockCarRepository::new();
        cars.expect_find()
            .returning(|id| Ok(Some(sample_car(id, 1, CarStatus::Moderation))));
        cars.expect_update()
            .times(1)
            .returning(|id, _| Ok(sample_car(id, 1, CarStatus::Active)));
        cars.expect_find_listing()
            .returning(|id| Ok(Some(sample_listing(id, 1))));

        let uow = TestUnitOfWork::default()
            .with_cars(cars)
            .with_brands(catalog_with(1, 1));
        let service = CarCatalog::new(Arc::new(uow));
        let listing = service.update(ListingScope::Any, 1, 10, input(1, 1)).await.unwrap();

        assert_eq!(listing.car.id, 10);
    }

    #[tokio::test]
    async fn test_active_scope_hides_pending_listing_from_its_seller() {
        let mut cars = MockCarRepository::new();
        cars.expect_find()
            .returning(|id| Ok(Some(sample_car(id, 1, CarStatus::Moderation))));
        cars.expect_update().never();
        cars.expect_delete().never();

        let uow = TestUnitOfWork::default()
            .with_cars(cars)
            .with_brands(catalog_with(1, 1));
        let service = CarCatalog::new(Arc::new(uow));

        assert!(matches!(
            service.update(ListingScope::Active, 1, 10, input(1, 1)).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            service.delete(ListingScope::Active, 1, 10).await,
            Err(AppError::NotFound)
        ));
        assert!(service.find_for_edit(ListingScope::Any, 1, 10).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_model_of_other_brand() {
        let mut cars = MockCarRepository::new();
        cars.expect_create().never();

        let uow = TestUnitOfWork::default()
            .with_cars(cars)
            .with_brands(catalog_with(1, 2));
        let service = CarCatalog::new(Arc::new(uow));
        let err = service.create(1, input(1, 5)).await.unwrap_err();

        assert!(err.field_errors().unwrap().contains_key("model"));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_price() {
        let uow = TestUnitOfWork::default();
        let service = CarCatalog::new(Arc::new(uow));
        let mut bad = input(1, 1);
        bad.price = -1;
        let err = service.create(1, bad).await.unwrap_err();

        assert!(err.field_errors().unwrap().contains_key("price"));
    }

    #[tokio::test]
    async fn test_cheap_caps_price() {
        let mut cars = MockCarRepository::new();
        cars.expect_list()
            .withf(|filter| filter.max_price == Some(CHEAP_PRICE_LIMIT) && filter.year == Some(2020))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let uow = TestUnitOfWork::default().with_cars(cars);
        let service = CarCatalog::new(Arc::new(uow));
        let filter = CarFilter {
            year: Some(2020),
            ..Default::default()
        };

        assert!(service.cheap(filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_view_on_missing_listing() {
        let mut cars = MockCarRepository::new();
        cars.expect_increment_views().returning(|_| Ok(None));

        let uow = TestUnitOfWork::default().with_cars(cars);
        let service = CarCatalog::new(Arc::new(uow));

        assert!(matches!(
            service.record_view(99).await.unwrap_err(),
            AppError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_browse_pages() {
        let mut cars = MockCarRepository::new();
        cars.expect_page_active()
            .with(eq(2), eq(BROWSE_PAGE_SIZE))
            .returning(|_, _| Ok((vec![sample_listing(4, 1)], 4)));

        let uow = TestUnitOfWork::default().with_cars(cars);
        let service = CarCatalog::new(Arc::new(uow));
        let page = service.browse(2).await.unwrap();

        assert_eq!(page.total_pages, 2);
        assert!(page.has_previous());
        assert!(!page.has_next());
    }

    #[tokio::test]
    async fn test_browse_past_last_page() {
        let mut cars = MockCarRepository::new();
        cars.expect_page_active().returning(|_, _| Ok((Vec::new(), 3)));

        let uow = TestUnitOfWork::default().with_cars(cars);
        let service = CarCatalog::new(Arc::new(uow));

        assert!(matches!(
            service.browse(5).await.unwrap_err(),
            AppError::NotFound
        ));
    }
}
