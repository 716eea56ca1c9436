//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod brand;
pub mod car;
pub mod car_model;
pub mod car_photo;
pub mod favorite;
pub mod forum_post;
pub mod user;
