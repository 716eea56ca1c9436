//! Server-rendered pages.
//!
//! The pages share the identity middleware with the JSON API; a signed-in
//! browser carries its JWT in the session cookie. Their POST forms are
//! guarded by the double-submit CSRF layer.

mod accounts;
mod cars;
mod csrf;
mod error;
mod session;
mod templates;

use axum::{middleware, routing::get, Router};

use crate::api::AppState;

pub use csrf::{csrf_middleware, CsrfToken};
pub use error::{login_url, PageError, PageResult};
pub use session::{end_session, safe_next, start_session};

pub fn web_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(cars::car_list))
        .route(
            "/car/add/",
            get(cars::car_create_page).post(cars::car_create),
        )
        .route("/car/:id/", get(cars::car_detail))
        .route(
            "/car/:id/edit/",
            get(cars::car_edit_page).post(cars::car_edit),
        )
        .route(
            "/car/:id/delete/",
            get(cars::car_delete_page).post(cars::car_delete),
        )
        .route(
            "/register/",
            get(accounts::register_form).post(accounts::register),
        )
        .route("/login/", get(accounts::login_form).post(accounts::login))
        .route("/logout/", get(accounts::logout).post(accounts::logout))
        .route_layer(middleware::from_fn_with_state(state, csrf_middleware))
}
