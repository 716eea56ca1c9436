//! Admin console service - per-table lists, drill-down edits and
//! listing reports.
//!
//! Staff-only; the HTTP layer checks `is_staff` before anything here
//! runs.

use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use super::car_service::check_car_input;
use crate::domain::{
    validation_field_errors, AdminQuery, Brand, CarDetail, CarInput, CarListing, CarModel,
    CarModelInput, CarPhoto, Favorite, ForumPost, ForumPostInput, PhotoInput, UpdateUser,
    UserResponse,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::export::{export_listings, ExportFile, ExportFormat};
use crate::infra::{TableCounts, UnitOfWork};
use crate::types::Paginated;
use crate::with_transaction;

#[async_trait]
pub trait AdminService: Send + Sync {
    /// Row count per table
    async fn overview(&self) -> AppResult<TableCounts>;

    // Users
    async fn users(&self, query: AdminQuery) -> AppResult<Paginated<UserResponse>>;
    async fn user(&self, id: i64) -> AppResult<UserResponse>;
    async fn update_user(&self, id: i64, changes: UpdateUser) -> AppResult<UserResponse>;
    async fn delete_user(&self, id: i64) -> AppResult<()>;

    // Catalog
    async fn brands(&self, query: AdminQuery) -> AppResult<Paginated<Brand>>;
    async fn models(&self, query: AdminQuery) -> AppResult<Paginated<CarModel>>;
    async fn model(&self, id: i64) -> AppResult<CarModel>;
    async fn create_model(&self, input: CarModelInput) -> AppResult<CarModel>;
    async fn update_model(&self, id: i64, input: CarModelInput) -> AppResult<CarModel>;
    /// Fails with `Protected` while listings reference the model
    async fn delete_model(&self, id: i64) -> AppResult<()>;

    // Listings, any status
    async fn cars(&self, query: AdminQuery) -> AppResult<Paginated<CarListing>>;
    async fn car(&self, id: i64) -> AppResult<CarDetail>;
    async fn update_car(&self, id: i64, input: CarInput) -> AppResult<CarListing>;
    async fn delete_car(&self, id: i64) -> AppResult<()>;
    /// Swap the whole photo set of a listing in one transaction
    async fn replace_photos(&self, car_id: i64, photos: Vec<PhotoInput>)
        -> AppResult<Vec<CarPhoto>>;

    // Photos
    async fn photos(&self, query: AdminQuery) -> AppResult<Paginated<CarPhoto>>;
    async fn photo(&self, id: i64) -> AppResult<CarPhoto>;
    async fn update_photo(&self, id: i64, input: PhotoInput) -> AppResult<CarPhoto>;
    async fn delete_photo(&self, id: i64) -> AppResult<()>;

    // Favorites
    async fn favorites(&self, query: AdminQuery) -> AppResult<Paginated<Favorite>>;
    async fn favorite(&self, id: i64) -> AppResult<Favorite>;
    async fn delete_favorite(&self, id: i64) -> AppResult<()>;

    // Forum
    async fn forum_posts(&self, query: AdminQuery) -> AppResult<Paginated<ForumPost>>;
    async fn forum_post(&self, id: i64) -> AppResult<ForumPost>;
    async fn update_forum_post(&self, id: i64, input: ForumPostInput) -> AppResult<ForumPost>;
    async fn delete_forum_post(&self, id: i64) -> AppResult<()>;

    /// Active listings as a report; `ids` narrows it to a selection
    async fn export(&self, format: ExportFormat, ids: Option<Vec<i64>>) -> AppResult<ExportFile>;
}

pub struct AdminConsole<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AdminConsole<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn check_model_input(&self, input: &CarModelInput) -> AppResult<()> {
        input.validate().map_err(validation_field_errors)?;
        if self.uow.brands().find_by_id(input.brand_id).await?.is_none() {
            return Err(AppError::field("brand_id", "Select a valid choice"));
        }
        Ok(())
    }
}

fn page<T>(query: &AdminQuery, (items, total): (Vec<T>, u64)) -> Paginated<T> {
    Paginated::new(items, query.page(), query.per_page(), total)
}

fn duplicate_model(err: AppError) -> AppError {
    match err {
        AppError::Conflict(_) => {
            AppError::field("name", "Model with this name already exists for the brand")
        }
        other => other,
    }
}

/// Photo URLs must be valid and at most one photo may be the main one
fn check_photos(photos: &[PhotoInput]) -> AppResult<()> {
    for photo in photos {
        photo.validate().map_err(validation_field_errors)?;
    }
    if photos.iter().filter(|p| p.is_main).count() > 1 {
        return Err(AppError::field("is_main", "Only one photo can be the main one"));
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> AdminService for AdminConsole<U> {
    async fn overview(&self) -> AppResult<TableCounts> {
        self.uow.table_counts().await
    }

    async fn users(&self, query: AdminQuery) -> AppResult<Paginated<UserResponse>> {
        let (users, total) = self.uow.users().search(query.clone()).await?;
        let users = users.into_iter().map(UserResponse::from).collect();
        Ok(page(&query, (users, total)))
    }

    async fn user(&self, id: i64) -> AppResult<UserResponse> {
        let user = self.uow.users().find_by_id(id).await?.ok_or_not_found()?;
        Ok(UserResponse::from(user))
    }

    async fn update_user(&self, id: i64, changes: UpdateUser) -> AppResult<UserResponse> {
        changes.check()?;
        if let Some(phone) = changes.phone.as_deref().map(str::trim) {
            if !phone.is_empty() {
                if let Some(other) = self.uow.users().find_by_phone(phone).await? {
                    if other.id != id {
                        return Err(AppError::field(
                            "phone",
                            "A user with that phone number already exists",
                        ));
                    }
                }
            }
        }

        let user = self.uow.users().update(id, changes).await?;
        tracing::info!(user_id = id, "User updated by staff");
        Ok(UserResponse::from(user))
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        self.uow.users().delete(id).await?;
        tracing::info!(user_id = id, "User deleted by staff");
        Ok(())
    }

    async fn brands(&self, query: AdminQuery) -> AppResult<Paginated<Brand>> {
        let result = self.uow.brands().search_brands(query.clone()).await?;
        Ok(page(&query, result))
    }

    async fn models(&self, query: AdminQuery) -> AppResult<Paginated<CarModel>> {
        let result = self.uow.brands().search_models(query.clone()).await?;
        Ok(page(&query, result))
    }

    async fn model(&self, id: i64) -> AppResult<CarModel> {
        self.uow.brands().find_model(id).await?.ok_or_not_found()
    }

    async fn create_model(&self, input: CarModelInput) -> AppResult<CarModel> {
        self.check_model_input(&input).await?;
        let model = self
            .uow
            .brands()
            .create_model(CarModelInput {
                name: input.name.trim().to_string(),
                ..input
            })
            .await
            .map_err(duplicate_model)?;

        tracing::info!(model_id = model.id, brand_id = model.brand_id, "Model created");
        Ok(model)
    }

    async fn update_model(&self, id: i64, input: CarModelInput) -> AppResult<CarModel> {
        self.check_model_input(&input).await?;
        self.uow
            .brands()
            .update_model(
                id,
                CarModelInput {
                    name: input.name.trim().to_string(),
                    ..input
                },
            )
            .await
            .map_err(duplicate_model)
    }

    async fn delete_model(&self, id: i64) -> AppResult<()> {
        self.uow.brands().delete_model(id).await
    }

    async fn cars(&self, query: AdminQuery) -> AppResult<Paginated<CarListing>> {
        let result = self.uow.cars().search(query.clone()).await?;
        Ok(page(&query, result))
    }

    async fn car(&self, id: i64) -> AppResult<CarDetail> {
        let listing = self.uow.cars().find_listing(id).await?.ok_or_not_found()?;
        let photos = self.uow.photos().photos_of(id).await?;
        Ok(CarDetail { listing, photos })
    }

    async fn update_car(&self, id: i64, input: CarInput) -> AppResult<CarListing> {
        self.uow.cars().find(id).await?.ok_or_not_found()?;
        check_car_input(self.uow.as_ref(), &input).await?;
        self.uow.cars().update(id, input).await?;
        tracing::info!(car_id = id, "Listing updated by staff");
        self.uow.cars().find_listing(id).await?.ok_or_not_found()
    }

    async fn delete_car(&self, id: i64) -> AppResult<()> {
        self.uow.cars().delete(id).await?;
        tracing::info!(car_id = id, "Listing deleted by staff");
        Ok(())
    }

    async fn replace_photos(
        &self,
        car_id: i64,
        photos: Vec<PhotoInput>,
    ) -> AppResult<Vec<CarPhoto>> {
        check_photos(&photos)?;

        let saved = with_transaction!(self.uow, |ctx| {
            ctx.cars().find(car_id).await?.ok_or_not_found()?;
            ctx.photos().replace(car_id, photos).await
        })?;

        tracing::info!(car_id, photos = saved.len(), "Listing photos replaced");
        Ok(saved)
    }

    async fn photos(&self, query: AdminQuery) -> AppResult<Paginated<CarPhoto>> {
        let result = self.uow.photos().search(query.clone()).await?;
        Ok(page(&query, result))
    }

    async fn photo(&self, id: i64) -> AppResult<CarPhoto> {
        self.uow.photos().find(id).await?.ok_or_not_found()
    }

    async fn update_photo(&self, id: i64, input: PhotoInput) -> AppResult<CarPhoto> {
        input.validate().map_err(validation_field_errors)?;
        self.uow.photos().update(id, input).await
    }

    async fn delete_photo(&self, id: i64) -> AppResult<()> {
        self.uow.photos().delete(id).await
    }

    async fn favorites(&self, query: AdminQuery) -> AppResult<Paginated<Favorite>> {
        let result = self.uow.favorites().search(query.clone()).await?;
        Ok(page(&query, result))
    }

    async fn favorite(&self, id: i64) -> AppResult<Favorite> {
        self.uow.favorites().find(id).await?.ok_or_not_found()
    }

    async fn delete_favorite(&self, id: i64) -> AppResult<()> {
        self.uow.favorites().delete(id).await
    }

    async fn forum_posts(&self, query: AdminQuery) -> AppResult<Paginated<ForumPost>> {
        let result = self.uow.forum().search(query.clone()).await?;
        Ok(page(&query, result))
    }

    async fn forum_post(&self, id: i64) -> AppResult<ForumPost> {
        self.uow.forum().find(id).await?.ok_or_not_found()
    }

    async fn update_forum_post(&self, id: i64, input: ForumPostInput) -> AppResult<ForumPost> {
        input.validate().map_err(validation_field_errors)?;
        self.uow
            .forum()
            .update(id, input.title.trim().to_string(), input.content)
            .await
    }

    async fn delete_forum_post(&self, id: i64) -> AppResult<()> {
        self.uow.forum().delete(id).await
    }

    async fn export(&self, format: ExportFormat, ids: Option<Vec<i64>>) -> AppResult<ExportFile> {
        let listings = self.uow.cars().export_rows(ids).await?;
        let file = export_listings(&listings, format)?;
        tracing::info!(rows = file.rows, format = format.extension(), "Listings report built");
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MockBrandRepository, MockCarRepository, MockUserRepository};
    use crate::services::testing::{sample_listing, sample_user, TestUnitOfWork};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_overview_returns_counts() {
        let counts = TableCounts {
            users: 3,
            cars: 5,
            ..Default::default()
        };
        let uow = TestUnitOfWork::default().with_counts(counts.clone());
        let service = AdminConsole::new(Arc::new(uow));

        assert_eq!(service.overview().await.unwrap(), counts);
    }

    #[tokio::test]
    async fn test_users_are_paginated() {
        let mut users = MockUserRepository::new();
        users
            .expect_search()
            .returning(|_| Ok((vec![sample_user(1, "ivan")], 41)));

        let service = AdminConsole::new(Arc::new(TestUnitOfWork::default().with_users(users)));
        let query = AdminQuery {
            page: Some(2),
            per_page: Some(20),
            ..Default::default()
        };
        let result = service.users(query).await.unwrap();

        assert_eq!(result.meta.total_pages, 3);
        assert_eq!(result.meta.page, 2);
        assert_eq!(result.data[0].username, "ivan");
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_phone() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_phone()
            .returning(|_| Ok(Some(sample_user(9, "other"))));
        users.expect_update().never();

        let service = AdminConsole::new(Arc::new(TestUnitOfWork::default().with_users(users)));
        let changes = UpdateUser {
            phone: Some("+79001112233".into()),
            ..Default::default()
        };
        let err = service.update_user(1, changes).await.unwrap_err();

        assert!(err.field_errors().unwrap().contains_key("phone"));
    }

    #[tokio::test]
    async fn test_create_model_for_unknown_brand() {
        let mut brands = MockBrandRepository::new();
        brands.expect_find_by_id().returning(|_| Ok(None));
        brands.expect_create_model().never();

        let service = AdminConsole::new(Arc::new(TestUnitOfWork::default().with_brands(brands)));
        let input = CarModelInput {
            brand_id: 4,
            name: "Vesta".into(),
        };
        let err = service.create_model(input).await.unwrap_err();

        assert!(err.field_errors().unwrap().contains_key("brand_id"));
    }

    #[tokio::test]
    async fn test_two_main_photos_rejected() {
        let service = AdminConsole::new(Arc::new(TestUnitOfWork::default()));
        let photos = vec![
            PhotoInput {
                image_url: "https://img.example.com/1.jpg".into(),
                is_main: true,
            },
            PhotoInput {
                image_url: "https://img.example.com/2.jpg".into(),
                is_main: true,
            },
        ];
        let err = service.replace_photos(1, photos).await.unwrap_err();

        assert!(err.field_errors().unwrap().contains_key("is_main"));
    }

    #[tokio::test]
    async fn test_export_selection_as_csv() {
        let mut cars = MockCarRepository::new();
        cars.expect_export_rows()
            .with(eq(Some(vec![1, 2])))
            .returning(|_| Ok(vec![sample_listing(1, 1)]));

        let service = AdminConsole::new(Arc::new(TestUnitOfWork::default().with_cars(cars)));
        let file = service
            .export(ExportFormat::Csv, Some(vec![1, 2]))
            .await
            .unwrap();
        let text = String::from_utf8(file.bytes).unwrap();

        assert_eq!(file.rows, 1);
        assert!(text.contains("\"1,200,000 ₽\""));
        assert!(text.contains("Активно"));
        assert!(text.contains("SELLER"));
    }
}
