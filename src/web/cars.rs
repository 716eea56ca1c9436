//! Listing pages: browse, detail and the seller's create, edit and
//! delete forms.

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use askama::Template;
use serde::Deserialize;

use super::csrf::CsrfToken;
use super::error::{PageError, PageResult};
use super::templates::{
    brand_options, model_options, status_options, CarConfirmDeleteTemplate, CarDetailTemplate,
    CarFormTemplate, CarListTemplate,
};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::DEFAULT_PAGE_NUMBER;
use crate::domain::{CarForm, ListingScope};
use crate::errors::{AppError, FieldErrors};
use crate::types::empty_as_none;

#[derive(Debug, Default, Deserialize)]
pub struct BrowseParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u64>,
}

/// Signed-in user, or a redirect to the login page that comes back here
pub(super) fn login_required(user: Option<CurrentUser>, uri: &Uri) -> PageResult<CurrentUser> {
    user.ok_or_else(|| PageError::LoginRequired {
        next: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
    })
}

pub async fn car_list(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    CsrfToken(csrf_token): CsrfToken,
    Query(params): Query<BrowseParams>,
) -> PageResult<Html<String>> {
    let page = state
        .services
        .cars()
        .browse(params.page.unwrap_or(DEFAULT_PAGE_NUMBER))
        .await?;

    Ok(Html(CarListTemplate { user, csrf_token, page }.render()?))
}

pub async fn car_detail(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    CsrfToken(csrf_token): CsrfToken,
    Path(id): Path<i64>,
) -> PageResult<Html<String>> {
    let detail = state.services.cars().detail(id).await?;
    let is_owner = user
        .as_ref()
        .is_some_and(|u| detail.listing.car.is_owned_by(u.id));

    Ok(Html(
        CarDetailTemplate {
            user,
            csrf_token,
            detail,
            is_owner,
        }
        .render()?,
    ))
}

async fn form_page(
    state: &AppState,
    user: CurrentUser,
    csrf_token: String,
    heading: &'static str,
    action: String,
    form: CarForm,
    errors: FieldErrors,
) -> PageResult<Html<String>> {
    let choices = state.services.cars().form_choices().await?;
    let page = CarFormTemplate {
        user: Some(user),
        csrf_token,
        heading,
        action,
        brands: brand_options(&choices.brands, &form.brand),
        models: model_options(&choices.models, &choices.brands, &form.model),
        statuses: status_options(&form.status),
        form,
        errors,
    };
    Ok(Html(page.render()?))
}

const ADD_HEADING: &str = "Новое объявление";
const EDIT_HEADING: &str = "Редактирование объявления";

pub async fn car_create_page(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    CsrfToken(csrf_token): CsrfToken,
    uri: Uri,
) -> PageResult<Html<String>> {
    let user = login_required(user, &uri)?;
    form_page(
        &state,
        user,
        csrf_token,
        ADD_HEADING,
        uri.path().to_string(),
        CarForm::default(),
        FieldErrors::new(),
    )
    .await
}

pub async fn car_create(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    CsrfToken(csrf_token): CsrfToken,
    uri: Uri,
    Form(form): Form<CarForm>,
) -> PageResult<Response> {
    let user = login_required(user, &uri)?;

    let result = match form.parse() {
        Ok(input) => state.services.cars().create(user.id, input).await.map(|_| ()),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(AppError::FieldErrors(errors)) => {
            let action = uri.path().to_string();
            let page = form_page(&state, user, csrf_token, ADD_HEADING, action, form, errors).await?;
            Ok(page.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn car_edit_page(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    CsrfToken(csrf_token): CsrfToken,
    uri: Uri,
    Path(id): Path<i64>,
) -> PageResult<Html<String>> {
    let user = login_required(user, &uri)?;
    let car = state.services.cars().find_for_edit(ListingScope::Any, user.id, id).await?;

    form_page(
        &state,
        user,
        csrf_token,
        EDIT_HEADING,
        uri.path().to_string(),
        CarForm::from_car(&car),
        FieldErrors::new(),
    )
    .await
}

pub async fn car_edit(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    CsrfToken(csrf_token): CsrfToken,
    uri: Uri,
    Path(id): Path<i64>,
    Form(form): Form<CarForm>,
) -> PageResult<Response> {
    let user = login_required(user, &uri)?;
    let cars = state.services.cars();
    // Ownership first so a stranger never sees validation feedback
    cars.find_for_edit(ListingScope::Any, user.id, id).await?;

    let result = match form.parse() {
        Ok(input) => cars.update(ListingScope::Any, user.id, id, input).await.map(|_| ()),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(AppError::FieldErrors(errors)) => {
            let action = uri.path().to_string();
            let page = form_page(&state, user, csrf_token, EDIT_HEADING, action, form, errors).await?;
            Ok(page.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn car_delete_page(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    CsrfToken(csrf_token): CsrfToken,
    uri: Uri,
    Path(id): Path<i64>,
) -> PageResult<Html<String>> {
    let user = login_required(user, &uri)?;
    let car = state.services.cars().find_for_edit(ListingScope::Any, user.id, id).await?;

    Ok(Html(
        CarConfirmDeleteTemplate {
            user: Some(user),
            csrf_token,
            car,
        }
        .render()?,
    ))
}

pub async fn car_delete(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    uri: Uri,
    Path(id): Path<i64>,
) -> PageResult<Redirect> {
    let user = login_required(user, &uri)?;
    state.services.cars().delete(ListingScope::Any, user.id, id).await?;
    tracing::info!(car_id = id, user_id = user.id, "Listing deleted from web page");
    Ok(Redirect::to("/"))
}
