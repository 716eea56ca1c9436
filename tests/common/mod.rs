//! Shared setup for the integration tests: a migrated SQLite database
//! (in memory, or a temp file when a test needs a real pool) plus helpers
//! that seed it through the real services.

#![allow(dead_code)]

use std::sync::Arc;

use carhub::config::Config;
use carhub::domain::{
    Brand, BrandInput, CarInput, CarListing, CarModel, CarModelInput, CarStatus, RegisterUser,
    User, UserRole,
};
use carhub::infra::Database;
use carhub::services::{ServiceContainer, Services};
use carhub::AppState;
use tempfile::TempDir;

pub const TEST_SECRET: &str = "integration-test-secret-32-chars!!";
pub const PASSWORD: &str = "Str0ng-pass!";

pub struct Harness {
    pub config: Config,
    pub database: Arc<Database>,
    pub services: Arc<Services>,
    _dir: Option<TempDir>,
}

impl Harness {
    pub async fn new() -> Self {
        let config = Config::for_database("sqlite::memory:", TEST_SECRET);
        Self::build(config, None).await
    }

    /// File-backed database behind a pool of `connections`, so concurrent
    /// tasks really hold separate connections.
    pub async fn pooled(connections: u32) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("carhub.db").display());
        let mut config = Config::for_database(url, TEST_SECRET);
        config.database_max_connections = connections;
        Self::build(config, Some(dir)).await
    }

    async fn build(config: Config, dir: Option<TempDir>) -> Self {
        let database = Arc::new(
            Database::connect(&config)
                .await
                .expect("database with migrations"),
        );
        let services = Arc::new(Services::from_connection(
            database.get_connection(),
            config.clone(),
        ));

        Self {
            config,
            database,
            services,
            _dir: dir,
        }
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            self.services.clone(),
            self.database.clone(),
            self.config.clone(),
        )
    }

    pub async fn user(&self, username: &str) -> User {
        self.services
            .auth()
            .register(RegisterUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                phone: None,
                role: UserRole::Seller,
                password1: PASSWORD.to_string(),
                password2: PASSWORD.to_string(),
            })
            .await
            .expect("registered user")
    }

    pub async fn staff(&self, username: &str) -> User {
        self.services
            .auth()
            .create_staff(
                username.to_string(),
                format!("{}@example.com", username),
                PASSWORD.to_string(),
            )
            .await
            .expect("staff user")
    }

    pub async fn token(&self, username: &str) -> String {
        self.services
            .auth()
            .login(username.to_string(), PASSWORD.to_string())
            .await
            .expect("login")
            .access_token
    }

    /// Brand with one model
    pub async fn catalog(&self, brand: &str, model: &str) -> (Brand, CarModel) {
        let brand = self
            .services
            .brands()
            .create(BrandInput {
                name: brand.to_string(),
            })
            .await
            .expect("brand");
        let model = self
            .services
            .admin()
            .create_model(CarModelInput {
                brand_id: brand.id,
                name: model.to_string(),
            })
            .await
            .expect("model");
        (brand, model)
    }

    pub async fn listing(
        &self,
        seller: &User,
        model: &CarModel,
        year: i32,
        price: i64,
        status: CarStatus,
    ) -> CarListing {
        self.services
            .cars()
            .create(seller.id, car_input(model, year, price, status))
            .await
            .expect("listing")
    }
}

pub fn car_input(model: &CarModel, year: i32, price: i64, status: CarStatus) -> CarInput {
    CarInput {
        brand: model.brand_id,
        model: model.id,
        year,
        mileage: Some(45_000),
        price,
        description: "One owner, full service history".to_string(),
        main_image_url: "https://img.example.com/car.jpg".to_string(),
        status,
    }
}
