//! Double-submit CSRF check for the HTML forms.
//!
//! Every page response carries a random token in a cookie and each POST
//! form echoes it in a hidden `csrfmiddlewaretoken` field (or the
//! `X-CSRFToken` header). A POST whose token does not match the cookie
//! gets a 403 page before the handler runs. The JSON API authenticates
//! with bearer tokens and sits outside this layer.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use axum::{
    async_trait,
    body::{to_bytes, Body, Bytes},
    extract::{FromRequest, FromRequestParts, Request, State},
    http::{header::CONTENT_TYPE, request::Parts, Method},
    middleware::Next,
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use super::error::PageError;
use crate::api::AppState;
use crate::config::{Config, CSRF_COOKIE_MAX_AGE_SECONDS, CSRF_COOKIE_NAME, MAX_FORM_BODY_BYTES};
use crate::errors::AppError;

const TOKEN_BYTES: usize = 32;

const CSRF_HEADER: &str = "x-csrftoken";

/// Token for the current request, rendered into the hidden form field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsrfToken(pub String);

#[derive(Debug, Default, Deserialize)]
struct SubmittedToken {
    #[serde(default)]
    csrfmiddlewaretoken: String,
}

/// 64 hex characters from the OS generator
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn well_formed(token: &str) -> bool {
    token.len() == TOKEN_BYTES * 2 && token.bytes().all(|b| b.is_ascii_hexdigit())
}

fn tokens_match(submitted: &str, expected: &str) -> bool {
    !submitted.is_empty() && bool::from(submitted.as_bytes().ct_eq(expected.as_bytes()))
}

fn csrf_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE_NAME, token))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(config.session_cookie_secure)
        .max_age(time::Duration::seconds(CSRF_COOKIE_MAX_AGE_SECONDS))
        .build()
}

/// Route layer for the web pages
pub async fn csrf_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(CSRF_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|t| well_formed(t));

    let mut request = if request.method() == Method::POST {
        match verify(request, existing.as_deref()).await {
            Ok(request) => request,
            Err(e) => return e.into_response(),
        }
    } else {
        request
    };

    let (token, fresh) = match existing {
        Some(token) => (token, false),
        None => (generate_token(), true),
    };
    request.extensions_mut().insert(CsrfToken(token.clone()));

    let response = next.run(request).await;
    if fresh {
        (jar.add(csrf_cookie(token, &state.config)), response).into_response()
    } else {
        response
    }
}

/// Compare the submitted token with the cookie and hand back a request
/// whose body the handler can still read.
async fn verify(request: Request, expected: Option<&str>) -> Result<Request, PageError> {
    let path = request.uri().path().to_string();
    let Some(expected) = expected else {
        tracing::warn!(path = %path, "CSRF cookie not set");
        return Err(PageError::CsrfFailed);
    };

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_FORM_BODY_BYTES)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let submitted = match parts.headers.get(CSRF_HEADER).and_then(|h| h.to_str().ok()) {
        Some(header) => header.to_string(),
        None => form_token(&parts, bytes.clone()).await,
    };

    if !tokens_match(&submitted, expected) {
        tracing::warn!(path = %path, "CSRF token missing or incorrect");
        return Err(PageError::CsrfFailed);
    }

    Ok(Request::from_parts(parts, Body::from(bytes)))
}

/// `csrfmiddlewaretoken` from an urlencoded body, empty when absent
async fn form_token(parts: &Parts, bytes: Bytes) -> String {
    let mut copy = Request::new(Body::from(bytes));
    *copy.method_mut() = Method::POST;
    if let Some(content_type) = parts.headers.get(CONTENT_TYPE) {
        copy.headers_mut().insert(CONTENT_TYPE, content_type.clone());
    }

    Form::<SubmittedToken>::from_request(copy, &())
        .await
        .map(|Form(submitted)| submitted.csrfmiddlewaretoken)
        .unwrap_or_default()
}

#[async_trait]
impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CsrfToken>()
            .cloned()
            .ok_or_else(|| AppError::Internal("CSRF layer is not installed".into()))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        http::{header::COOKIE, header::SET_COOKIE, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn test_generated_tokens_are_well_formed_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert!(well_formed(&a));
        assert_ne!(a, b);
        assert!(!well_formed("short"));
        assert!(!well_formed(&"z".repeat(64)));
    }

    #[test]
    fn test_tokens_match() {
        let token = generate_token();
        assert!(tokens_match(&token, &token));
        assert!(!tokens_match("", &token));
        assert!(!tokens_match(&generate_token(), &token));
        assert!(!tokens_match(&token[..10], &token));
    }

    async fn echo(CsrfToken(token): CsrfToken, body: String) -> String {
        format!("{}|{}", token, body)
    }

    /// The check alone, without the cookie-issuing half that needs app state
    async fn check_only(request: Request, next: Next) -> Response {
        let expected = CookieJar::from_headers(request.headers())
            .get(CSRF_COOKIE_NAME)
            .map(|c| c.value().to_string());
        match verify(request, expected.as_deref()).await {
            Ok(mut request) => {
                let token = expected.unwrap_or_default();
                request.extensions_mut().insert(CsrfToken(token));
                next.run(request).await
            }
            Err(e) => e.into_response(),
        }
    }

    fn app() -> Router {
        Router::new()
            .route("/form/", get(echo).post(echo))
            .layer(middleware::from_fn(check_only))
    }

    fn post(cookie: Option<&str>, body: String) -> Request {
        let mut builder = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/form/")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = cookie {
            builder = builder.header(COOKIE, format!("{}={}", CSRF_COOKIE_NAME, token));
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_matching_field_passes_and_body_survives() {
        let token = generate_token();
        let body = format!("csrfmiddlewaretoken={}&price=100", token);
        let response = app().oneshot(post(Some(&token), body.clone())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), format!("{}|{}", token, body));
    }

    #[tokio::test]
    async fn test_missing_or_foreign_token_is_forbidden() {
        let token = generate_token();

        let no_field = app().oneshot(post(Some(&token), "price=100".into())).await.unwrap();
        assert_eq!(no_field.status(), StatusCode::FORBIDDEN);

        let body = format!("csrfmiddlewaretoken={}", generate_token());
        let foreign = app().oneshot(post(Some(&token), body)).await.unwrap();
        assert_eq!(foreign.status(), StatusCode::FORBIDDEN);

        let body = format!("csrfmiddlewaretoken={}", token);
        let no_cookie = app().oneshot(post(None, body)).await.unwrap();
        assert_eq!(no_cookie.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_header_token_is_accepted() {
        let token = generate_token();
        let mut request = post(Some(&token), "price=100".into());
        request
            .headers_mut()
            .insert(CSRF_HEADER, token.parse().unwrap());

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
