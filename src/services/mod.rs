//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod admin_service;
mod auth_service;
mod brand_service;
mod car_service;
pub mod container;
mod favorite_service;
mod forum_service;

#[cfg(test)]
mod testing;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use admin_service::{AdminConsole, AdminService};
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use brand_service::{BrandCatalog, BrandService};
pub use car_service::{CarCatalog, CarService, FormChoices};
pub use favorite_service::{FavoriteService, Favorites};
pub use forum_service::{Forum, ForumService};

#[cfg(any(test, feature = "test-utils"))]
pub use car_service::MockCarService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
