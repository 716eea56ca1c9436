//! Sign-up, sign-in and sign-out pages.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::csrf::CsrfToken;
use super::error::PageResult;
use super::session::{end_session, safe_next, start_session};
use super::templates::{role_options, LoginTemplate, RegisterTemplate};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::RegisterForm;
use crate::errors::{AppError, FieldErrors};

const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(Debug, Default, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPageForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

fn register_page(
    user: Option<CurrentUser>,
    csrf_token: String,
    form: RegisterForm,
    errors: FieldErrors,
) -> PageResult<Html<String>> {
    let roles = role_options(&form.role);
    let page = RegisterTemplate {
        user,
        csrf_token,
        form: RegisterForm {
            password1: String::new(),
            password2: String::new(),
            ..form
        },
        errors,
        roles,
    };
    Ok(Html(page.render()?))
}

pub async fn register_form(
    user: Option<CurrentUser>,
    CsrfToken(csrf_token): CsrfToken,
) -> PageResult<Html<String>> {
    register_page(user, csrf_token, RegisterForm::default(), FieldErrors::new())
}

/// Create the account and sign the new user in
pub async fn register(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    CsrfToken(csrf_token): CsrfToken,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> PageResult<Response> {
    let auth = state.services.auth();

    let registered = match form.parse() {
        Ok(input) => auth.register(input).await,
        Err(e) => Err(e),
    };

    match registered {
        Ok(created) => {
            let token = auth.login(created.username, form.password1.clone()).await?;
            let jar = start_session(jar, token.access_token, &state.config);
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(AppError::FieldErrors(errors)) => {
            Ok(register_page(user, csrf_token, form, errors)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login_form(
    user: Option<CurrentUser>,
    CsrfToken(csrf_token): CsrfToken,
    Query(params): Query<NextParam>,
) -> PageResult<Html<String>> {
    let page = LoginTemplate {
        user,
        csrf_token,
        username: String::new(),
        next: safe_next(params.next.as_deref()),
        error: None,
    };
    Ok(Html(page.render()?))
}

pub async fn login(
    State(state): State<AppState>,
    CsrfToken(csrf_token): CsrfToken,
    jar: CookieJar,
    Form(form): Form<LoginPageForm>,
) -> PageResult<Response> {
    let next = safe_next(form.next.as_deref());

    match state
        .services
        .auth()
        .login(form.username.clone(), form.password)
        .await
    {
        Ok(token) => {
            let jar = start_session(jar, token.access_token, &state.config);
            Ok((jar, Redirect::to(&next)).into_response())
        }
        Err(AppError::InvalidCredentials) => {
            let page = LoginTemplate {
                user: None,
                csrf_token,
                username: form.username,
                next,
                error: Some(BAD_CREDENTIALS.to_string()),
            };
            Ok(Html(page.render()?).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (end_session(jar), Redirect::to("/"))
}
