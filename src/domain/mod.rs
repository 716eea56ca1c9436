//! Domain layer - Core business entities and logic
//!
//! Entities, value objects and the pure rules around them (listing
//! filters, price formatting, forum thread assembly). Nothing here
//! touches the database.

pub mod admin;
pub mod car;
pub mod catalog;
pub mod favorite;
pub mod forum;
pub mod password;
pub mod user;

pub use admin::{AdminQuery, ExportSelection};
pub use car::{
    format_price, validation_field_errors, Car, CarDetail, CarFilter, CarForm, CarInput,
    CarListing, CarOrderField, CarOrdering, CarPhoto, CarQuery, CarStatus, ListingPage,
    ListingScope, PhotoInput,
};
pub use catalog::{Brand, BrandInput, BrandOrdering, BrandQuery, CarModel, CarModelInput};
pub use favorite::{AddFavorite, Favorite};
pub use forum::{build_thread, ForumPost, ForumPostInput, ForumThread};
pub use password::Password;
pub use user::{LoginForm, RegisterForm, RegisterUser, UpdateUser, User, UserResponse, UserRole};
