//! Forum handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{ForumPost, ForumPostInput, ForumThread};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Paginated, PaginationParams};

pub fn forum_routes() -> Router<AppState> {
    Router::new()
        .route("/api/forum/posts/", get(list_topics).post(create_post))
        .route("/api/forum/posts/:id/", get(get_thread).delete(delete_post))
}

/// Root posts, newest first
#[utoipa::path(
    get,
    path = "/api/forum/posts/",
    tag = "Forum",
    params(PaginationParams),
    responses((status = 200, description = "Paginated topics"))
)]
pub async fn list_topics(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<ForumPost>>> {
    let topics = state.services.forum().topics(params).await?;
    Ok(Json(topics))
}

/// Post with its nested replies
#[utoipa::path(
    get,
    path = "/api/forum/posts/{id}/",
    tag = "Forum",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Thread", body = ForumThread),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_thread(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ForumThread>> {
    let thread = state.services.forum().thread(id).await?;
    Ok(Json(thread))
}

/// Start a topic or reply to a post
#[utoipa::path(
    post,
    path = "/api/forum/posts/",
    tag = "Forum",
    security(("bearer_auth" = [])),
    request_body = ForumPostInput,
    responses(
        (status = 201, description = "Post created", body = ForumPost),
        (status = 400, description = "Field errors"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<ForumPostInput>,
) -> AppResult<Created<ForumPost>> {
    let post = state.services.forum().create(user.id, input).await?;
    Ok(Created(post))
}

#[utoipa::path(
    delete,
    path = "/api/forum/posts/{id}/",
    tag = "Forum",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post and its replies deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<NoContent> {
    state.services.forum().delete(user.id, id).await?;
    Ok(NoContent)
}
