//! Service Container - Centralized service access.
//!
//! Built once at startup and shared by the API, the web pages and the
//! CLI commands.

use std::sync::Arc;

use super::{AdminService, AuthService, BrandService, CarService, FavoriteService, ForumService};
use crate::config::Config;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn cars(&self) -> Arc<dyn CarService>;

    fn brands(&self) -> Arc<dyn BrandService>;

    fn favorites(&self) -> Arc<dyn FavoriteService>;

    fn forum(&self) -> Arc<dyn ForumService>;

    fn admin(&self) -> Arc<dyn AdminService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    car_service: Arc<dyn CarService>,
    brand_service: Arc<dyn BrandService>,
    favorite_service: Arc<dyn FavoriteService>,
    forum_service: Arc<dyn ForumService>,
    admin_service: Arc<dyn AdminService>,
}

impl Services {
    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        use super::{AdminConsole, Authenticator, BrandCatalog, CarCatalog, Favorites, Forum};

        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            car_service: Arc::new(CarCatalog::new(uow.clone())),
            brand_service: Arc::new(BrandCatalog::new(uow.clone())),
            favorite_service: Arc::new(Favorites::new(uow.clone())),
            forum_service: Arc::new(Forum::new(uow.clone())),
            admin_service: Arc::new(AdminConsole::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn cars(&self) -> Arc<dyn CarService> {
        self.car_service.clone()
    }

    fn brands(&self) -> Arc<dyn BrandService> {
        self.brand_service.clone()
    }

    fn favorites(&self) -> Arc<dyn FavoriteService> {
        self.favorite_service.clone()
    }

    fn forum(&self) -> Arc<dyn ForumService> {
        self.forum_service.clone()
    }

    fn admin(&self) -> Arc<dyn AdminService> {
        self.admin_service.clone()
    }
}
