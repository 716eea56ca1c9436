//! Identity resolution and the extractors built on it.
//!
//! The identity middleware runs on every route. It looks for a bearer
//! token first and the session cookie second, and stores the resolved
//! user in the request extensions. Handlers then ask for `CurrentUser`
//! (401 when anonymous), `Option<CurrentUser>` or `StaffUser`.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, SESSION_COOKIE_NAME};
use crate::domain::User;
use crate::errors::AppError;

/// Authenticated caller
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_staff: user.is_staff,
        }
    }
}

/// Authenticated caller with the staff flag set
#[derive(Clone, Debug)]
pub struct StaffUser(pub CurrentUser);

/// Resolve the caller from `Authorization: Bearer` or the session cookie.
///
/// A bad bearer token is rejected outright; a stale session cookie is
/// treated as anonymous so the login page stays reachable.
pub async fn identity_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| {
            h.strip_prefix(BEARER_TOKEN_PREFIX)
                .map(str::to_string)
                .ok_or(AppError::Unauthorized)
        })
        .transpose()?;

    let user = match bearer {
        Some(token) => Some(state.services.auth().authenticate(&token).await?),
        None => match jar.get(SESSION_COOKIE_NAME) {
            Some(cookie) => match state.services.auth().authenticate(cookie.value()).await {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::debug!("Ignoring session cookie: {}", e);
                    None
                }
            },
            None => None,
        },
    };

    if let Some(user) = user {
        request.extensions_mut().insert(CurrentUser::from(user));
    }

    Ok(next.run(request).await)
}

/// Route layer for the admin console
pub async fn require_staff(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<CurrentUser>() {
        None => Err(AppError::Unauthorized),
        Some(user) if !user.is_staff => Err(AppError::Forbidden),
        Some(_) => Ok(next.run(request).await),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.is_staff {
            Ok(StaffUser(user))
        } else {
            Err(AppError::Forbidden)
        }
    }
}
