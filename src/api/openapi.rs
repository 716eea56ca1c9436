//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, auth_handler, brand_handler, car_handler, favorite_handler, forum_handler,
};
use crate::domain::{
    AddFavorite, Brand, BrandInput, Car, CarDetail, CarInput, CarListing, CarModel, CarPhoto,
    CarStatus, ExportSelection, Favorite, ForumPost, ForumPostInput, ForumThread, LoginForm,
    RegisterForm, UserResponse, UserRole,
};
use crate::services::TokenResponse;

/// OpenAPI documentation for the CarHub REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CarHub API",
        version = "0.1.0",
        description = "Vehicle classifieds: listings, brand catalog, favorites and forum"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::register,
        auth_handler::login,
        // Listings
        car_handler::list_cars,
        car_handler::cheap_cars,
        car_handler::get_car,
        car_handler::create_car,
        car_handler::update_car,
        car_handler::patch_car,
        car_handler::delete_car,
        car_handler::view_car,
        // Catalog
        brand_handler::list_brands,
        brand_handler::get_brand,
        brand_handler::create_brand,
        brand_handler::update_brand,
        brand_handler::delete_brand,
        brand_handler::brand_models,
        // Favorites
        favorite_handler::list_favorites,
        favorite_handler::add_favorite,
        favorite_handler::remove_favorite,
        // Forum
        forum_handler::list_topics,
        forum_handler::get_thread,
        forum_handler::create_post,
        forum_handler::delete_post,
        // Admin export
        admin_handler::export_cars,
        admin_handler::export_selected,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            RegisterForm,
            LoginForm,
            TokenResponse,
            CarStatus,
            Car,
            CarListing,
            CarPhoto,
            CarDetail,
            CarInput,
            car_handler::CarPatch,
            car_handler::ViewResponse,
            Brand,
            BrandInput,
            CarModel,
            Favorite,
            AddFavorite,
            ForumPost,
            ForumPostInput,
            ForumThread,
            ExportSelection,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User registration and login"),
        (name = "Cars", description = "Car listings"),
        (name = "Brands", description = "Brand and model catalog"),
        (name = "Favorites", description = "Bookmarked listings"),
        (name = "Forum", description = "Threaded discussion"),
        (name = "Admin", description = "Staff console")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}
