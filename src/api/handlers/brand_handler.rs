//! Brand catalog handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::StaffUser;
use crate::api::AppState;
use crate::domain::{Brand, BrandInput, BrandQuery, CarModel};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

/// Create brand routes
pub fn brand_routes() -> Router<AppState> {
    Router::new()
        .route("/api/brands/", get(list_brands).post(create_brand))
        .route(
            "/api/brands/:id/",
            get(get_brand).put(update_brand).delete(delete_brand),
        )
        .route("/api/brands/:id/models/", get(brand_models))
}

/// List brands
#[utoipa::path(
    get,
    path = "/api/brands/",
    tag = "Brands",
    params(BrandQuery),
    responses((status = 200, description = "Brands", body = Vec<Brand>))
)]
pub async fn list_brands(
    State(state): State<AppState>,
    Query(query): Query<BrandQuery>,
) -> AppResult<Json<Vec<Brand>>> {
    let brands = state.services.brands().list(query).await?;
    Ok(Json(brands))
}

#[utoipa::path(
    get,
    path = "/api/brands/{id}/",
    tag = "Brands",
    params(("id" = i64, Path, description = "Brand ID")),
    responses(
        (status = 200, description = "Brand", body = Brand),
        (status = 404, description = "Brand not found")
    )
)]
pub async fn get_brand(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Brand>> {
    let brand = state.services.brands().get(id).await?;
    Ok(Json(brand))
}

/// Create a brand (staff only)
#[utoipa::path(
    post,
    path = "/api/brands/",
    tag = "Brands",
    security(("bearer_auth" = [])),
    request_body = BrandInput,
    responses(
        (status = 201, description = "Brand created", body = Brand),
        (status = 400, description = "Empty or duplicate name"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_brand(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    ValidatedJson(input): ValidatedJson<BrandInput>,
) -> AppResult<Created<Brand>> {
    let brand = state.services.brands().create(input).await?;
    tracing::info!(brand_id = brand.id, staff = %staff.username, "Brand created");
    Ok(Created(brand))
}

/// Rename a brand (staff only)
#[utoipa::path(
    put,
    path = "/api/brands/{id}/",
    tag = "Brands",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Brand ID")),
    request_body = BrandInput,
    responses(
        (status = 200, description = "Brand updated", body = Brand),
        (status = 400, description = "Empty or duplicate name"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Brand not found")
    )
)]
pub async fn update_brand(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
    ValidatedJson(input): ValidatedJson<BrandInput>,
) -> AppResult<Json<Brand>> {
    let brand = state.services.brands().update(id, input).await?;
    Ok(Json(brand))
}

/// Delete a brand nobody lists cars under (staff only)
#[utoipa::path(
    delete,
    path = "/api/brands/{id}/",
    tag = "Brands",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Brand ID")),
    responses(
        (status = 204, description = "Brand deleted"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Brand not found"),
        (status = 409, description = "Listings still reference the brand")
    )
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> AppResult<NoContent> {
    state.services.brands().delete(id).await?;
    Ok(NoContent)
}

/// Models of one brand
#[utoipa::path(
    get,
    path = "/api/brands/{id}/models/",
    tag = "Brands",
    params(("id" = i64, Path, description = "Brand ID")),
    responses(
        (status = 200, description = "Models of the brand", body = Vec<CarModel>),
        (status = 404, description = "Brand not found")
    )
)]
pub async fn brand_models(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<CarModel>>> {
    let models = state.services.brands().models(id).await?;
    Ok(Json(models))
}
