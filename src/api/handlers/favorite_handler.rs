//! Favorites of the current user.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get},
    Router,
};

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{AddFavorite, Favorite};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/api/favorites/", get(list_favorites).post(add_favorite))
        .route("/api/favorites/:car_id/", delete(remove_favorite))
}

#[utoipa::path(
    get,
    path = "/api/favorites/",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Bookmarked listings, newest first", body = Vec<Favorite>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Favorite>>> {
    let favorites = state.services.favorites().list_mine(user.id).await?;
    Ok(Json(favorites))
}

#[utoipa::path(
    post,
    path = "/api/favorites/",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    request_body = AddFavorite,
    responses(
        (status = 201, description = "Listing bookmarked", body = Favorite),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No active listing with this ID"),
        (status = 409, description = "Already bookmarked")
    )
)]
pub async fn add_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<AddFavorite>,
) -> AppResult<Created<Favorite>> {
    let favorite = state.services.favorites().add(user.id, body.car_id).await?;
    Ok(Created(favorite))
}

#[utoipa::path(
    delete,
    path = "/api/favorites/{car_id}/",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    params(("car_id" = i64, Path, description = "Listing ID")),
    responses(
        (status = 204, description = "Bookmark removed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not bookmarked")
    )
)]
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(car_id): Path<i64>,
) -> AppResult<NoContent> {
    state.services.favorites().remove(user.id, car_id).await?;
    Ok(NoContent)
}
