//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};

/// Application state shared by the API, the web pages and the admin
/// console.
#[derive(Clone)]
pub struct AppState {
    /// Application services
    pub services: Arc<dyn ServiceContainer>,
    /// Database connection
    pub database: Arc<Database>,
    /// Settings the HTTP layer reads (cookie lifetime)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let services = Arc::new(Services::from_connection(
            database.get_connection(),
            config.clone(),
        ));

        Self {
            services,
            database,
            config: Arc::new(config),
        }
    }

    /// Create application state with manually injected services.
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        database: Arc<Database>,
        config: Config,
    ) -> Self {
        Self {
            services,
            database,
            config: Arc::new(config),
        }
    }
}
