//! Authentication handlers.

use axum::{extract::State, response::Json, routing::post, Router};

use crate::api::AppState;
use crate::domain::{LoginForm, RegisterForm, UserResponse};
use crate::errors::AppResult;
use crate::services::TokenResponse;
use crate::types::Created;

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterForm,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Field errors (format, mismatch, taken username or phone)")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> AppResult<Created<UserResponse>> {
    let input = form.parse()?;
    let user = state.services.auth().register(input).await?;

    Ok(Created(UserResponse::from(user)))
}

/// Login and get JWT token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .services
        .auth()
        .login(form.username, form.password)
        .await?;

    Ok(Json(token))
}
