//! Hand-written Unit of Work over repository mocks, shared by the
//! service unit tests.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::domain::{Car, CarListing, CarStatus, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{
    BrandRepository, CarRepository, FavoriteRepository, ForumRepository, MockBrandRepository,
    MockCarRepository, MockFavoriteRepository, MockForumRepository, MockPhotoRepository,
    MockUserRepository, PhotoRepository, TableCounts, TransactionContext, UnitOfWork,
    UserRepository,
};

pub struct TestUnitOfWork {
    users: Arc<dyn UserRepository>,
    brands: Arc<dyn BrandRepository>,
    cars: Arc<dyn CarRepository>,
    photos: Arc<dyn PhotoRepository>,
    favorites: Arc<dyn FavoriteRepository>,
    forum: Arc<dyn ForumRepository>,
    counts: TableCounts,
}

impl Default for TestUnitOfWork {
    fn default() -> Self {
        Self {
            users: Arc::new(MockUserRepository::new()),
            brands: Arc::new(MockBrandRepository::new()),
            cars: Arc::new(MockCarRepository::new()),
            photos: Arc::new(MockPhotoRepository::new()),
            favorites: Arc::new(MockFavoriteRepository::new()),
            forum: Arc::new(MockForumRepository::new()),
            counts: TableCounts::default(),
        }
    }
}

impl TestUnitOfWork {
    pub fn with_users(mut self, repo: MockUserRepository) -> Self {
        self.users = Arc::new(repo);
        self
    }

    pub fn with_brands(mut self, repo: MockBrandRepository) -> Self {
        self.brands = Arc::new(repo);
        self
    }

    pub fn with_cars(mut self, repo: MockCarRepository) -> Self {
        self.cars = Arc::new(repo);
        self
    }

    pub fn with_photos(mut self, repo: MockPhotoRepository) -> Self {
        self.photos = Arc::new(repo);
        self
    }

    pub fn with_favorites(mut self, repo: MockFavoriteRepository) -> Self {
        self.favorites = Arc::new(repo);
        self
    }

    pub fn with_forum(mut self, repo: MockForumRepository) -> Self {
        self.forum = Arc::new(repo);
        self
    }

    pub fn with_counts(mut self, counts: TableCounts) -> Self {
        self.counts = counts;
        self
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn brands(&self) -> Arc<dyn BrandRepository> {
        self.brands.clone()
    }

    fn cars(&self) -> Arc<dyn CarRepository> {
        self.cars.clone()
    }

    fn photos(&self) -> Arc<dyn PhotoRepository> {
        self.photos.clone()
    }

    fn favorites(&self) -> Arc<dyn FavoriteRepository> {
        self.favorites.clone()
    }

    fn forum(&self) -> Arc<dyn ForumRepository> {
        self.forum.clone()
    }

    async fn table_counts(&self) -> AppResult<TableCounts> {
        Ok(self.counts.clone())
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        Err(AppError::internal("transactions need a real database"))
    }
}

pub fn sample_user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        phone: None,
        role: UserRole::Seller,
        password_hash: String::new(),
        is_staff: false,
        is_active: true,
        last_login: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_car(id: i64, seller_id: i64, status: CarStatus) -> Car {
    Car {
        id,
        seller_id,
        created_by: Some(seller_id),
        brand_id: 1,
        model_id: 1,
        year: 2020,
        mileage: Some(30_000),
        price: 1_200_000,
        description: "Один владелец".into(),
        main_image_url: String::new(),
        status,
        views: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_listing(id: i64, seller_id: i64) -> CarListing {
    CarListing {
        car: sample_car(id, seller_id, CarStatus::Active),
        brand_name: "Toyota".into(),
        model_name: "Camry".into(),
        seller_username: Some("seller".into()),
    }
}
