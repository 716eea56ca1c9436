//! Error responses for the HTML pages.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use super::templates::ErrorTemplate;
use crate::errors::AppError;

pub type PageResult<T> = Result<T, PageError>;

const CSRF_FAILED: &str = "CSRF verification failed. Request aborted.";

/// Failure while serving a page.
///
/// Anonymous access to a members-only page turns into a login redirect;
/// everything else renders the error page with the matching status.
#[derive(Debug)]
pub enum PageError {
    LoginRequired { next: String },
    /// Form token missing or not matching the CSRF cookie
    CsrfFailed,
    App(AppError),
}

impl From<AppError> for PageError {
    fn from(e: AppError) -> Self {
        PageError::App(e)
    }
}

impl From<askama::Error> for PageError {
    fn from(e: askama::Error) -> Self {
        PageError::App(AppError::Template(e))
    }
}

pub fn login_url(next: &str) -> String {
    format!(
        "/login/?next={}",
        utf8_percent_encode(next, NON_ALPHANUMERIC)
    )
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let error = match self {
            PageError::LoginRequired { next } => {
                return Redirect::to(&login_url(&next)).into_response()
            }
            PageError::CsrfFailed => {
                return render_error(StatusCode::FORBIDDEN, CSRF_FAILED.to_string())
            }
            PageError::App(error) => error,
        };

        let status = error.status();
        if status.is_server_error() {
            tracing::error!("Page failed: {}", error);
        }

        let message = match status {
            StatusCode::FORBIDDEN => "You do not have permission to access this page".to_string(),
            StatusCode::NOT_FOUND => "Page not found".to_string(),
            _ => error.user_message(),
        };

        render_error(status, message)
    }
}

fn render_error(status: StatusCode, message: String) -> Response {
    let page = ErrorTemplate {
        user: None,
        csrf_token: String::new(),
        status: status.as_u16(),
        message,
    };
    match page.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Error page failed to render: {}", e);
            status.into_response()
        }
    }
}
