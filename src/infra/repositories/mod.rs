//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod base;
mod brand_repository;
mod car_repository;
pub(crate) mod entities;
mod favorite_repository;
mod forum_repository;
mod photo_repository;
mod search;
mod user_repository;

pub use base::ReadRepository;
pub use brand_repository::{BrandRepository, BrandStore};
pub use car_repository::{CarRepository, CarStore};
pub use favorite_repository::{FavoriteRepository, FavoriteStore};
pub use forum_repository::{ForumRepository, ForumStore};
pub use photo_repository::{PhotoRepository, PhotoStore};
pub use user_repository::{NewUser, UserRepository, UserStore};

pub(crate) use photo_repository::replace_photos;

use base::impl_read_repository;

impl_read_repository!(UserStore, entities::user::Entity);
impl_read_repository!(BrandStore, entities::brand::Entity);
impl_read_repository!(BrandStore, entities::car_model::Entity);
impl_read_repository!(CarStore, entities::car::Entity);
impl_read_repository!(PhotoStore, entities::car_photo::Entity);
impl_read_repository!(FavoriteStore, entities::favorite::Entity);
impl_read_repository!(ForumStore, entities::forum_post::Entity);

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use brand_repository::MockBrandRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use car_repository::MockCarRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use favorite_repository::MockFavoriteRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use forum_repository::MockForumRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use photo_repository::MockPhotoRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
