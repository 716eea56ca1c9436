//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories and runs multi-statement
//! writes inside one database transaction.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, EntityTrait, IsolationLevel,
    TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::repositories::entities::{brand, car, car_model, car_photo, favorite, forum_post, user};
use super::repositories::{
    replace_photos, BrandRepository, BrandStore, CarRepository, CarStore,
    FavoriteRepository, FavoriteStore, ForumRepository, ForumStore, PhotoRepository, PhotoStore,
    ReadRepository, UserRepository, UserStore,
};
use crate::domain::{Car, CarPhoto, PhotoInput};
use crate::errors::{AppError, AppResult};

/// Row counts shown on the admin overview
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TableCounts {
    pub users: u64,
    pub brands: u64,
    pub models: u64,
    pub cars: u64,
    pub photos: u64,
    pub favorites: u64,
    pub forum_posts: u64,
}

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic transaction method;
/// tests wrap repository mocks in a small hand-written implementation.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn brands(&self) -> Arc<dyn BrandRepository>;

    fn cars(&self) -> Arc<dyn CarRepository>;

    fn photos(&self) -> Arc<dyn PhotoRepository>;

    fn favorites(&self) -> Arc<dyn FavoriteRepository>;

    fn forum(&self) -> Arc<dyn ForumRepository>;

    async fn table_counts(&self) -> AppResult<TableCounts>;

    /// Execute a closure within a transaction (ReadCommitted).
    ///
    /// Committed when the closure succeeds, rolled back otherwise.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Repository access bound to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn cars(&self) -> TxCarRepository<'_> {
        TxCarRepository { txn: self.txn }
    }

    pub fn photos(&self) -> TxPhotoRepository<'_> {
        TxPhotoRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    brand_repo: Arc<BrandStore>,
    car_repo: Arc<CarStore>,
    photo_repo: Arc<PhotoStore>,
    favorite_repo: Arc<FavoriteStore>,
    forum_repo: Arc<ForumStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            brand_repo: Arc::new(BrandStore::new(db.clone())),
            car_repo: Arc::new(CarStore::new(db.clone())),
            photo_repo: Arc::new(PhotoStore::new(db.clone())),
            favorite_repo: Arc::new(FavoriteStore::new(db.clone())),
            forum_repo: Arc::new(ForumStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn brands(&self) -> Arc<dyn BrandRepository> {
        self.brand_repo.clone()
    }

    fn cars(&self) -> Arc<dyn CarRepository> {
        self.car_repo.clone()
    }

    fn photos(&self) -> Arc<dyn PhotoRepository> {
        self.photo_repo.clone()
    }

    fn favorites(&self) -> Arc<dyn FavoriteRepository> {
        self.favorite_repo.clone()
    }

    fn forum(&self) -> Arc<dyn ForumRepository> {
        self.forum_repo.clone()
    }

    async fn table_counts(&self) -> AppResult<TableCounts> {
        let (users, brands, models, cars) = tokio::try_join!(
            ReadRepository::<user::Entity>::count(self.user_repo.as_ref()),
            ReadRepository::<brand::Entity>::count(self.brand_repo.as_ref()),
            ReadRepository::<car_model::Entity>::count(self.brand_repo.as_ref()),
            ReadRepository::<car::Entity>::count(self.car_repo.as_ref()),
        )?;
        let (photos, favorites, forum_posts) = tokio::try_join!(
            ReadRepository::<car_photo::Entity>::count(self.photo_repo.as_ref()),
            ReadRepository::<favorite::Entity>::count(self.favorite_repo.as_ref()),
            ReadRepository::<forum_post::Entity>::count(self.forum_repo.as_ref()),
        )?;

        Ok(TableCounts {
            users,
            brands,
            models,
            cars,
            photos,
            favorites,
            forum_posts,
        })
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware listing lookups.
pub struct TxCarRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxCarRepository<'a> {
    /// Listing in any status
    pub async fn find(&self, id: i64) -> AppResult<Option<Car>> {
        let result = car::Entity::find_by_id(id)
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Car::from))
    }
}

/// Transaction-aware photo writes.
pub struct TxPhotoRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxPhotoRepository<'a> {
    /// Delete every photo of the listing and insert `photos` in order
    pub async fn replace(&self, car_id: i64, photos: Vec<PhotoInput>) -> AppResult<Vec<CarPhoto>> {
        replace_photos(self.txn, car_id, photos).await
    }
}

/// Simpler API for executing transactional operations.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
