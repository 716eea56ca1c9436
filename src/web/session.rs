//! Session cookie carrying the signed-in user's JWT.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::{Config, SESSION_COOKIE_NAME};

/// Store a fresh token in the jar
pub fn start_session(jar: CookieJar, token: String, config: &Config) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.session_cookie_secure)
        .max_age(time::Duration::seconds(config.session_max_age_seconds()))
        .build();
    jar.add(cookie)
}

pub fn end_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/").build())
}

/// Where to send the user after login.
///
/// Only same-site absolute paths are honored; anything else falls back
/// to the listing page.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}
