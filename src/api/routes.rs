//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    admin_routes, auth_routes, brand_routes, car_routes, favorite_routes, forum_routes,
};
use super::middleware::{identity_middleware, require_staff};
use super::openapi::ApiDoc;
use super::AppState;
use crate::web::web_routes;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // REST API
        .merge(auth_routes())
        .merge(car_routes())
        .merge(brand_routes())
        .merge(favorite_routes())
        .merge(forum_routes())
        // Staff console
        .merge(admin_routes().route_layer(middleware::from_fn(require_staff)))
        // Server-rendered pages
        .merge(web_routes(state.clone()))
        // Global middleware; identity runs before every handler
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with a database round trip
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status_code, database) = match state.database.ping().await {
        Ok(_) => (
            StatusCode::OK,
            ServiceStatus {
                status: "healthy",
                error: None,
            },
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ServiceStatus {
                    status: "unhealthy",
                    error: Some(e.to_string()),
                },
            )
        }
    };

    let response = HealthResponse {
        status: if status_code == StatusCode::OK {
            "healthy"
        } else {
            "degraded"
        },
        database,
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request},
    };
    use mockall::predicate::eq;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::errors::AppError;
    use crate::infra::Database;
    use crate::services::{CarService, MockCarService, MockServiceContainer};

    async fn router_with(cars: MockCarService) -> Router {
        let cars: Arc<dyn CarService> = Arc::new(cars);
        let mut services = MockServiceContainer::new();
        services.expect_cars().returning(move || cars.clone());

        let config = Config::for_database("sqlite::memory:", "x".repeat(32));
        let database = Database::connect_without_migrations(&config).await.unwrap();
        create_router(AppState::new(Arc::new(services), Arc::new(database), config))
    }

    async fn call(app: Router, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_listing_is_json_404() {
        let mut cars = MockCarService::new();
        cars.expect_detail()
            .with(eq(7))
            .returning(|_| Err(AppError::NotFound));

        let (status, body) = call(router_with(cars).await, Method::GET, "/api/cars/7/").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_view_reports_new_count() {
        let mut cars = MockCarService::new();
        cars.expect_record_view().with(eq(3)).returning(|_| Ok(42));

        let (status, body) = call(router_with(cars).await, Method::POST, "/api/cars/3/view/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Просмотр засчитан");
        assert_eq!(body["views"], 42);
    }

    #[tokio::test]
    async fn test_internal_details_stay_server_side() {
        let mut cars = MockCarService::new();
        cars.expect_detail()
            .returning(|_| Err(AppError::internal("pool exhausted")));

        let (status, body) = call(router_with(cars).await, Method::GET, "/api/cars/1/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("pool exhausted"));
    }

    #[tokio::test]
    async fn test_health_without_schema_still_pings() {
        let (status, body) = call(router_with(MockCarService::new()).await, Method::GET, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
