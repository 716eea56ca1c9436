//! Favorite service - bookmarking active listings.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::Favorite;
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait FavoriteService: Send + Sync {
    /// Bookmark an active listing; `Conflict` when already bookmarked
    async fn add(&self, user_id: i64, car_id: i64) -> AppResult<Favorite>;

    async fn remove(&self, user_id: i64, car_id: i64) -> AppResult<()>;

    async fn list_mine(&self, user_id: i64) -> AppResult<Vec<Favorite>>;
}

pub struct Favorites<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Favorites<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> FavoriteService for Favorites<U> {
    async fn add(&self, user_id: i64, car_id: i64) -> AppResult<Favorite> {
        self.uow
            .cars()
            .find_active_listing(car_id)
            .await?
            .ok_or_not_found()?;

        let favorite = self.uow.favorites().add(user_id, car_id).await?;
        tracing::debug!(user_id, car_id, "Listing bookmarked");
        Ok(favorite)
    }

    async fn remove(&self, user_id: i64, car_id: i64) -> AppResult<()> {
        self.uow.favorites().remove(user_id, car_id).await
    }

    async fn list_mine(&self, user_id: i64) -> AppResult<Vec<Favorite>> {
        self.uow.favorites().list_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::infra::{MockCarRepository, MockFavoriteRepository};
    use crate::services::testing::{sample_listing, TestUnitOfWork};

    #[tokio::test]
    async fn test_add_requires_active_listing() {
        let mut cars = MockCarRepository::new();
        cars.expect_find_active_listing().returning(|_| Ok(None));
        let mut favorites = MockFavoriteRepository::new();
        favorites.expect_add().never();

        let uow = TestUnitOfWork::default()
            .with_cars(cars)
            .with_favorites(favorites);
        let service = Favorites::new(Arc::new(uow));

        assert!(matches!(
            service.add(1, 5).await.unwrap_err(),
            AppError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_duplicate_favorite_conflicts() {
        let mut cars = MockCarRepository::new();
        cars.expect_find_active_listing()
            .returning(|id| Ok(Some(sample_listing(id, 2))));
        let mut favorites = MockFavoriteRepository::new();
        favorites
            .expect_add()
            .returning(|_, _| Err(AppError::conflict("Favorite")));

        let uow = TestUnitOfWork::default()
            .with_cars(cars)
            .with_favorites(favorites);
        let service = Favorites::new(Arc::new(uow));

        assert!(matches!(
            service.add(1, 5).await.unwrap_err(),
            AppError::Conflict(_)
        ));
    }
}
