//! Infrastructure layer - External systems integration
//!
//! - Database connection and migrations
//! - Repositories over the SeaORM entities
//! - Unit of Work for transaction management

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, MigrationState, Migrator};
pub use repositories::{
    BrandRepository, BrandStore, CarRepository, CarStore, FavoriteRepository, FavoriteStore,
    ForumRepository, ForumStore, NewUser, PhotoRepository, PhotoStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, TableCounts, TransactionContext, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockBrandRepository, MockCarRepository, MockFavoriteRepository, MockForumRepository,
    MockPhotoRepository, MockUserRepository,
};
