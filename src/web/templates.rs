//! Askama page templates.
//!
//! Every page carries the optional signed-in user so the shared layout
//! can render the navigation bar, plus the CSRF token its forms echo.

use askama::Template;

use crate::api::middleware::CurrentUser;
use crate::domain::{
    Brand, Car, CarDetail, CarForm, CarModel, CarStatus, ListingPage, RegisterForm, UserRole,
};
use crate::errors::FieldErrors;

/// `<option>` of a select box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: impl ToString, label: impl Into<String>, current: &str) -> Self {
        let value = value.to_string();
        let selected = value == current.trim();
        Self {
            value,
            label: label.into(),
            selected,
        }
    }
}

pub fn brand_options(brands: &[Brand], current: &str) -> Vec<SelectOption> {
    brands
        .iter()
        .map(|b| SelectOption::new(b.id, b.name.clone(), current))
        .collect()
}

/// Models are labelled with their brand so one flat list stays readable
pub fn model_options(models: &[CarModel], brands: &[Brand], current: &str) -> Vec<SelectOption> {
    models
        .iter()
        .map(|m| {
            let label = match brands.iter().find(|b| b.id == m.brand_id) {
                Some(brand) => format!("{} {}", brand.name, m.name),
                None => m.name.clone(),
            };
            SelectOption::new(m.id, label, current)
        })
        .collect()
}

pub fn status_options(current: &str) -> Vec<SelectOption> {
    let current = if current.trim().is_empty() {
        CarStatus::default().as_str()
    } else {
        current
    };
    CarStatus::all()
        .iter()
        .map(|s| SelectOption::new(s.as_str(), s.label(), current))
        .collect()
}

pub fn role_options(current: &str) -> Vec<SelectOption> {
    let current = if current.trim().is_empty() {
        UserRole::default().as_str()
    } else {
        current
    };
    UserRole::all()
        .iter()
        .map(|r| SelectOption::new(r.as_str(), r.label(), current))
        .collect()
}

#[derive(Template)]
#[template(path = "car_list.html")]
pub struct CarListTemplate {
    pub user: Option<CurrentUser>,
    pub csrf_token: String,
    pub page: ListingPage,
}

#[derive(Template)]
#[template(path = "car_detail.html")]
pub struct CarDetailTemplate {
    pub user: Option<CurrentUser>,
    pub csrf_token: String,
    pub detail: CarDetail,
    pub is_owner: bool,
}

#[derive(Template)]
#[template(path = "car_form.html")]
pub struct CarFormTemplate {
    pub user: Option<CurrentUser>,
    pub csrf_token: String,
    pub heading: &'static str,
    pub action: String,
    pub form: CarForm,
    pub errors: FieldErrors,
    pub brands: Vec<SelectOption>,
    pub models: Vec<SelectOption>,
    pub statuses: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "car_confirm_delete.html")]
pub struct CarConfirmDeleteTemplate {
    pub user: Option<CurrentUser>,
    pub csrf_token: String,
    pub car: Car,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub user: Option<CurrentUser>,
    pub csrf_token: String,
    pub form: RegisterForm,
    pub errors: FieldErrors,
    pub roles: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub csrf_token: String,
    pub username: String,
    pub next: String,
    pub error: Option<String>,
}

/// 403 and 404 pages
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub user: Option<CurrentUser>,
    pub csrf_token: String,
    pub status: u16,
    pub message: String,
}
