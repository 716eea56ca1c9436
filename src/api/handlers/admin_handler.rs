//! Admin console JSON handlers.
//!
//! Served under `/admin/api` behind the `require_staff` route layer,
//! so none of these handlers repeat the staff check.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    AdminQuery, Brand, BrandInput, CarDetail, CarInput, CarListing, CarModel, CarModelInput,
    CarPhoto, ExportSelection, Favorite, ForumPost, ForumPostInput, PhotoInput, UpdateUser,
    UserResponse,
};
use crate::errors::AppResult;
use crate::export::ExportFormat;
use crate::infra::TableCounts;
use crate::types::{Attachment, Created, NoContent, Paginated};

/// Export format selector
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportParams {
    /// `xlsx` (default), `csv` or `json`
    pub format: Option<String>,
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/api/", get(overview))
        .route("/admin/api/users/", get(list_users))
        .route("/admin/api/users/:id/", get(get_user).put(update_user).delete(delete_user))
        .route("/admin/api/brands/", get(list_brands).post(create_brand))
        .route("/admin/api/brands/:id/", get(get_brand).put(update_brand).delete(delete_brand))
        .route("/admin/api/models/", get(list_models).post(create_model))
        .route("/admin/api/models/:id/", get(get_model).put(update_model).delete(delete_model))
        .route("/admin/api/cars/", get(list_cars))
        .route("/admin/api/cars/export", get(export_cars).post(export_selected))
        .route("/admin/api/cars/:id/", get(get_car).put(update_car).delete(delete_car))
        .route("/admin/api/cars/:id/photos", put(replace_photos))
        .route("/admin/api/photos/", get(list_photos))
        .route("/admin/api/photos/:id/", get(get_photo).put(update_photo).delete(delete_photo))
        .route("/admin/api/favorites/", get(list_favorites))
        .route("/admin/api/favorites/:id/", get(get_favorite).delete(delete_favorite))
        .route("/admin/api/forum/posts/", get(list_forum_posts))
        .route(
            "/admin/api/forum/posts/:id/",
            get(get_forum_post).put(update_forum_post).delete(delete_forum_post),
        )
}

/// Row counts per table
pub async fn overview(State(state): State<AppState>) -> AppResult<Json<TableCounts>> {
    Ok(Json(state.services.admin().overview().await?))
}

// Users

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    Ok(Json(state.services.admin().users(query).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserResponse>> {
    Ok(Json(state.services.admin().user(id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.admin().update_user(id, changes).await?;
    tracing::info!(user_id = id, "User updated from admin console");
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<NoContent> {
    state.services.admin().delete_user(id).await?;
    tracing::info!(user_id = id, "User deleted from admin console");
    Ok(NoContent)
}

// Brands

pub async fn list_brands(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> AppResult<Json<Paginated<Brand>>> {
    Ok(Json(state.services.admin().brands(query).await?))
}

pub async fn get_brand(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Brand>> {
    Ok(Json(state.services.brands().get(id).await?))
}

pub async fn create_brand(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<BrandInput>,
) -> AppResult<Created<Brand>> {
    Ok(Created(state.services.brands().create(input).await?))
}

pub async fn update_brand(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(input): ValidatedJson<BrandInput>,
) -> AppResult<Json<Brand>> {
    Ok(Json(state.services.brands().update(id, input).await?))
}

pub async fn delete_brand(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<NoContent> {
    state.services.brands().delete(id).await?;
    Ok(NoContent)
}

// Models

pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> AppResult<Json<Paginated<CarModel>>> {
    Ok(Json(state.services.admin().models(query).await?))
}

pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CarModel>> {
    Ok(Json(state.services.admin().model(id).await?))
}

pub async fn create_model(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CarModelInput>,
) -> AppResult<Created<CarModel>> {
    Ok(Created(state.services.admin().create_model(input).await?))
}

pub async fn update_model(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(input): ValidatedJson<CarModelInput>,
) -> AppResult<Json<CarModel>> {
    Ok(Json(state.services.admin().update_model(id, input).await?))
}

pub async fn delete_model(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<NoContent> {
    state.services.admin().delete_model(id).await?;
    Ok(NoContent)
}

// Listings

pub async fn list_cars(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> AppResult<Json<Paginated<CarListing>>> {
    Ok(Json(state.services.admin().cars(query).await?))
}

pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CarDetail>> {
    Ok(Json(state.services.admin().car(id).await?))
}

pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CarInput>,
) -> AppResult<Json<CarListing>> {
    Ok(Json(state.services.admin().update_car(id, input).await?))
}

pub async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<NoContent> {
    state.services.admin().delete_car(id).await?;
    Ok(NoContent)
}

/// Replace the whole photo set of a listing
pub async fn replace_photos(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(photos): Json<Vec<PhotoInput>>,
) -> AppResult<Json<Vec<CarPhoto>>> {
    Ok(Json(state.services.admin().replace_photos(id, photos).await?))
}

/// Download every active listing
#[utoipa::path(
    get,
    path = "/admin/api/cars/export",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(ExportParams),
    responses(
        (status = 200, description = "Report file", content_type = "application/octet-stream"),
        (status = 400, description = "Unsupported format"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn export_cars(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> AppResult<Attachment> {
    let format = match params.format.as_deref() {
        Some(raw) => ExportFormat::parse(raw)?,
        None => ExportFormat::default(),
    };
    let file = state.services.admin().export(format, None).await?;
    tracing::info!(rows = file.rows, format = file.format.extension(), "Listings exported");
    Ok(Attachment(file))
}

/// Download the selected active listings as a styled spreadsheet
#[utoipa::path(
    post,
    path = "/admin/api/cars/export",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = ExportSelection,
    responses(
        (status = 200, description = "XLSX report", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn export_selected(
    State(state): State<AppState>,
    Json(selection): Json<ExportSelection>,
) -> AppResult<Attachment> {
    let file = state
        .services
        .admin()
        .export(ExportFormat::Xlsx, Some(selection.ids))
        .await?;
    tracing::info!(rows = file.rows, "Selected listings exported");
    Ok(Attachment(file))
}

// Photos

pub async fn list_photos(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> AppResult<Json<Paginated<CarPhoto>>> {
    Ok(Json(state.services.admin().photos(query).await?))
}

pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CarPhoto>> {
    Ok(Json(state.services.admin().photo(id).await?))
}

pub async fn update_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(input): ValidatedJson<PhotoInput>,
) -> AppResult<Json<CarPhoto>> {
    Ok(Json(state.services.admin().update_photo(id, input).await?))
}

pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<NoContent> {
    state.services.admin().delete_photo(id).await?;
    Ok(NoContent)
}

// Favorites

pub async fn list_favorites(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> AppResult<Json<Paginated<Favorite>>> {
    Ok(Json(state.services.admin().favorites(query).await?))
}

pub async fn get_favorite(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Favorite>> {
    Ok(Json(state.services.admin().favorite(id).await?))
}

pub async fn delete_favorite(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<NoContent> {
    state.services.admin().delete_favorite(id).await?;
    Ok(NoContent)
}

// Forum

pub async fn list_forum_posts(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> AppResult<Json<Paginated<ForumPost>>> {
    Ok(Json(state.services.admin().forum_posts(query).await?))
}

pub async fn get_forum_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ForumPost>> {
    Ok(Json(state.services.admin().forum_post(id).await?))
}

pub async fn update_forum_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ForumPostInput>,
) -> AppResult<Json<ForumPost>> {
    Ok(Json(state.services.admin().update_forum_post(id, input).await?))
}

pub async fn delete_forum_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<NoContent> {
    state.services.admin().delete_forum_post(id).await?;
    Ok(NoContent)
}
