//! Car listing handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CarDetail, CarInput, CarListing, CarQuery, CarStatus, ListingScope};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

/// Partial listing update; absent fields keep their value
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CarPatch {
    pub brand: Option<i64>,
    pub model: Option<i64>,
    pub year: Option<i32>,
    /// `null` clears the mileage
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub mileage: Option<Option<i32>>,
    pub price: Option<i64>,
    pub description: Option<String>,
    pub main_image_url: Option<String>,
    pub status: Option<CarStatus>,
}

/// PATCH field that tells "absent" (`None`) apart from explicit `null` (`Some(None)`)
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Response of the view counter
#[derive(Debug, Serialize, ToSchema)]
pub struct ViewResponse {
    #[schema(example = "Просмотр засчитан")]
    pub message: String,
    #[schema(example = 42)]
    pub views: i32,
}

/// Create listing routes
pub fn car_routes() -> Router<AppState> {
    Router::new()
        .route("/api/cars/", get(list_cars).post(create_car))
        .route("/api/cars/cheap/", get(cheap_cars))
        .route(
            "/api/cars/:id/",
            get(get_car)
                .put(update_car)
                .patch(patch_car)
                .delete(delete_car),
        )
        .route("/api/cars/:id/view/", post(view_car))
}

/// List active listings
#[utoipa::path(
    get,
    path = "/api/cars/",
    tag = "Cars",
    params(CarQuery),
    responses(
        (status = 200, description = "Active listings", body = Vec<CarListing>),
        (status = 400, description = "Invalid filter value")
    )
)]
pub async fn list_cars(
    State(state): State<AppState>,
    viewer: Option<CurrentUser>,
    Query(query): Query<CarQuery>,
) -> AppResult<Json<Vec<CarListing>>> {
    let filter = query.into_filter(viewer.map(|u| u.id))?;
    let cars = state.services.cars().list(filter).await?;
    Ok(Json(cars))
}

/// Active listings priced at most 1,000,000
#[utoipa::path(
    get,
    path = "/api/cars/cheap/",
    tag = "Cars",
    params(CarQuery),
    responses(
        (status = 200, description = "Cheap active listings", body = Vec<CarListing>)
    )
)]
pub async fn cheap_cars(
    State(state): State<AppState>,
    viewer: Option<CurrentUser>,
    Query(query): Query<CarQuery>,
) -> AppResult<Json<Vec<CarListing>>> {
    let filter = query.into_filter(viewer.map(|u| u.id))?;
    let cars = state.services.cars().cheap(filter).await?;
    Ok(Json(cars))
}

/// Get an active listing with its photos
#[utoipa::path(
    get,
    path = "/api/cars/{id}/",
    tag = "Cars",
    params(("id" = i64, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing", body = CarDetail),
        (status = 404, description = "No active listing with this ID")
    )
)]
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CarDetail>> {
    let car = state.services.cars().detail(id).await?;
    Ok(Json(car))
}

/// Create a listing owned by the caller
#[utoipa::path(
    post,
    path = "/api/cars/",
    tag = "Cars",
    security(("bearer_auth" = [])),
    request_body = CarInput,
    responses(
        (status = 201, description = "Listing created", body = CarListing),
        (status = 400, description = "Field errors"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_car(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CarInput>,
) -> AppResult<Created<CarListing>> {
    let car = state.services.cars().create(user.id, input).await?;
    Ok(Created(car))
}

/// Replace every field of the caller's listing
#[utoipa::path(
    put,
    path = "/api/cars/{id}/",
    tag = "Cars",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Listing ID")),
    request_body = CarInput,
    responses(
        (status = 200, description = "Listing updated", body = CarListing),
        (status = 400, description = "Field errors"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the seller"),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn update_car(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<CarInput>,
) -> AppResult<Json<CarListing>> {
    let car = state.services.cars().update(ListingScope::Active, user.id, id, input).await?;
    Ok(Json(car))
}

/// Change some fields of the caller's listing
#[utoipa::path(
    patch,
    path = "/api/cars/{id}/",
    tag = "Cars",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Listing ID")),
    request_body = CarPatch,
    responses(
        (status = 200, description = "Listing updated", body = CarListing),
        (status = 403, description = "Not the seller"),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn patch_car(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(patch): Json<CarPatch>,
) -> AppResult<Json<CarListing>> {
    let cars = state.services.cars();
    let current = cars.find_for_edit(ListingScope::Active, user.id, id).await?;

    let input = CarInput {
        brand: patch.brand.unwrap_or(current.brand_id),
        model: patch.model.unwrap_or(current.model_id),
        year: patch.year.unwrap_or(current.year),
        mileage: patch.mileage.unwrap_or(current.mileage),
        price: patch.price.unwrap_or(current.price),
        description: patch.description.unwrap_or(current.description),
        main_image_url: patch.main_image_url.unwrap_or(current.main_image_url),
        status: patch.status.unwrap_or(current.status),
    };

    let car = cars.update(ListingScope::Active, user.id, id, input).await?;
    Ok(Json(car))
}

/// Delete the caller's listing
#[utoipa::path(
    delete,
    path = "/api/cars/{id}/",
    tag = "Cars",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Listing ID")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 403, description = "Not the seller"),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn delete_car(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<NoContent> {
    state.services.cars().delete(ListingScope::Active, user.id, id).await?;
    Ok(NoContent)
}

/// Count one view of an active listing
#[utoipa::path(
    post,
    path = "/api/cars/{id}/view/",
    tag = "Cars",
    params(("id" = i64, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "View counted", body = ViewResponse),
        (status = 404, description = "No active listing with this ID")
    )
)]
pub async fn view_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ViewResponse>> {
    let views = state.services.cars().record_view(id).await?;
    Ok(Json(ViewResponse {
        message: "Просмотр засчитан".to_string(),
        views,
    }))
}
