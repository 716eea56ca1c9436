//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod brand_handler;
pub mod car_handler;
pub mod favorite_handler;
pub mod forum_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::auth_routes;
pub use brand_handler::brand_routes;
pub use car_handler::car_routes;
pub use favorite_handler::favorite_routes;
pub use forum_handler::forum_routes;
