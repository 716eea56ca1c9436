//! Car listing domain types: status, listing, photos, input and query filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidateUrl};

use crate::config::{MAX_URL_LENGTH, STATUS_ACTIVE, STATUS_MODERATION, STATUS_SOLD};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::types::empty_as_none;

/// Listing lifecycle stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CarStatus {
    #[default]
    Moderation,
    Active,
    Sold,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Moderation => STATUS_MODERATION,
            CarStatus::Active => STATUS_ACTIVE,
            CarStatus::Sold => STATUS_SOLD,
        }
    }

    /// Localized label shown on pages and in reports
    pub fn label(&self) -> &'static str {
        match self {
            CarStatus::Moderation => "На модерации",
            CarStatus::Active => "Активно",
            CarStatus::Sold => "Продано",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            STATUS_MODERATION => Some(CarStatus::Moderation),
            STATUS_ACTIVE => Some(CarStatus::Active),
            STATUS_SOLD => Some(CarStatus::Sold),
            _ => None,
        }
    }

    pub fn all() -> [CarStatus; 3] {
        [CarStatus::Moderation, CarStatus::Active, CarStatus::Sold]
    }
}

impl std::fmt::Display for CarStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Car listing
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Car {
    pub id: i64,
    pub seller_id: i64,
    pub created_by: Option<i64>,
    pub brand_id: i64,
    pub model_id: i64,
    pub year: i32,
    pub mileage: Option<i32>,
    /// Price in whole rubles
    pub price: i64,
    pub description: String,
    pub main_image_url: String,
    pub status: CarStatus,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Car {
    pub fn is_active(&self) -> bool {
        self.status == CarStatus::Active
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.seller_id == user_id
    }
}

/// Which listings an owner-checked lookup can reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    /// REST API: active listings only, the rest answer 404
    Active,
    /// Seller's own pages: every status
    Any,
}

impl ListingScope {
    pub fn admits(self, car: &Car) -> bool {
        match self {
            ListingScope::Active => car.is_active(),
            ListingScope::Any => true,
        }
    }
}

/// Listing joined with the names of its brand, model and seller
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CarListing {
    #[serde(flatten)]
    pub car: Car,
    pub brand_name: String,
    pub model_name: String,
    /// `None` when the seller row is gone
    pub seller_username: Option<String>,
}

impl CarListing {
    /// Title used on pages: "Toyota Camry (2020)"
    pub fn full_name(&self) -> String {
        format!("{} {} ({})", self.brand_name, self.model_name, self.car.year)
    }

    pub fn price_display(&self) -> String {
        format_price(self.car.price)
    }

    pub fn status_label(&self) -> &'static str {
        self.car.status.label()
    }
}

/// Listing photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CarPhoto {
    pub id: i64,
    pub car_id: i64,
    pub image_url: String,
    pub is_main: bool,
    pub created_at: DateTime<Utc>,
}

/// Photo entry submitted through the admin inline editor
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PhotoInput {
    #[validate(url(message = "Enter a valid URL"), length(max = 255))]
    #[schema(example = "https://img.example.com/camry-1.jpg")]
    pub image_url: String,
    #[serde(default)]
    pub is_main: bool,
}

/// Validated listing fields used by create and update
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct CarInput {
    #[schema(example = 1)]
    pub brand: i64,
    #[schema(example = 3)]
    pub model: i64,
    #[validate(range(min = 0, message = "Year must be non-negative"))]
    #[schema(example = 2021)]
    pub year: i32,
    #[validate(range(min = 0, message = "Mileage must be non-negative"))]
    #[schema(example = 45000)]
    pub mileage: Option<i32>,
    #[validate(range(min = 0, message = "Price must be non-negative"))]
    #[schema(example = 1_200_000)]
    pub price: i64,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    #[validate(custom(function = "validate_optional_url"))]
    #[schema(example = "https://img.example.com/camry.jpg")]
    pub main_image_url: String,
    #[serde(default)]
    pub status: CarStatus,
}

/// Empty means "no image"; anything else must be an absolute http(s) URL
fn validate_optional_url(value: &str) -> Result<(), validator::ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let web_scheme = value.starts_with("https://") || value.starts_with("http://");
    if value.len() > MAX_URL_LENGTH as usize || !web_scheme || !value.validate_url() {
        let mut err = validator::ValidationError::new("url");
        err.message = Some("Enter a valid URL".into());
        return Err(err);
    }
    Ok(())
}

/// Raw HTML form fields; everything arrives as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarForm {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub mileage: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub main_image_url: String,
    #[serde(default)]
    pub status: String,
}

impl CarForm {
    /// Pre-fill the form from an existing listing (edit page)
    pub fn from_car(car: &Car) -> Self {
        Self {
            brand: car.brand_id.to_string(),
            model: car.model_id.to_string(),
            year: car.year.to_string(),
            mileage: car.mileage.map(|m| m.to_string()).unwrap_or_default(),
            price: car.price.to_string(),
            description: car.description.clone(),
            main_image_url: car.main_image_url.clone(),
            status: car.status.as_str().to_string(),
        }
    }

    /// Parse and validate, collecting one message per failing field.
    pub fn parse(&self) -> AppResult<CarInput> {
        let mut errors = FieldErrors::new();

        let brand = required_number::<i64>(&mut errors, "brand", &self.brand);
        let model = required_number::<i64>(&mut errors, "model", &self.model);
        let year = required_number::<i32>(&mut errors, "year", &self.year);
        let price = required_number::<i64>(&mut errors, "price", &self.price);
        let mileage = match self.mileage.trim() {
            "" => None,
            raw => match raw.parse::<i32>() {
                Ok(value) => Some(value),
                Err(_) => {
                    errors.insert("mileage".into(), "Enter a whole number".into());
                    None
                }
            },
        };
        let status = match self.status.trim() {
            "" => CarStatus::default(),
            raw => CarStatus::parse(raw).unwrap_or_else(|| {
                errors.insert("status".into(), format!("Select a valid choice. {} is not one of the available choices", raw));
                CarStatus::default()
            }),
        };

        if !errors.is_empty() {
            return Err(AppError::FieldErrors(errors));
        }

        let input = CarInput {
            brand: brand.unwrap_or_default(),
            model: model.unwrap_or_default(),
            year: year.unwrap_or_default(),
            mileage,
            price: price.unwrap_or_default(),
            description: self.description.trim().to_string(),
            main_image_url: self.main_image_url.trim().to_string(),
            status,
        };
        input.validate().map_err(validation_field_errors)?;
        Ok(input)
    }
}

fn required_number<T: std::str::FromStr>(
    errors: &mut FieldErrors,
    field: &str,
    raw: &str,
) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.insert(field.into(), "This field is required".into());
        return None;
    }
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.insert(field.into(), "Enter a whole number".into());
            None
        }
    }
}

/// Convert validator output into field-level messages
pub fn validation_field_errors(errors: validator::ValidationErrors) -> AppError {
    let fields: FieldErrors = errors
        .field_errors()
        .iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
        })
        .collect();
    AppError::FieldErrors(fields)
}

/// Sortable listing columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarOrderField {
    Price,
    Year,
    CreatedAt,
    Views,
}

/// One `ordering` term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarOrdering {
    pub field: CarOrderField,
    pub descending: bool,
}

impl CarOrdering {
    /// Parse `ordering=-price,year`; unknown fields are ignored.
    pub fn parse_list(raw: &str) -> Vec<CarOrdering> {
        raw.split(',')
            .filter_map(|term| {
                let term = term.trim();
                let (descending, name) = match term.strip_prefix('-') {
                    Some(name) => (true, name),
                    None => (false, term),
                };
                let field = match name {
                    "price" => CarOrderField::Price,
                    "year" => CarOrderField::Year,
                    "created_at" => CarOrderField::CreatedAt,
                    "views" => CarOrderField::Views,
                    _ => return None,
                };
                Some(CarOrdering { field, descending })
            })
            .collect()
    }
}

/// Every filter the listing API understands, as plain data.
///
/// The repository always scopes to active listings first, then applies
/// these on top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarFilter {
    /// Restrict to this seller (`my`, only for authenticated callers)
    pub seller_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub model_id: Option<i64>,
    pub year: Option<i32>,
    pub status: Option<CarStatus>,
    pub price: Option<i64>,
    /// Upper price bound (the `cheap` action)
    pub max_price: Option<i64>,
    pub cheap_new_not_moderation: bool,
    pub old_or_expensive_not_sold: bool,
    /// Whitespace-separated search terms
    pub search: Vec<String>,
    pub ordering: Vec<CarOrdering>,
}

/// Raw listing query string
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CarQuery {
    pub brand: Option<i64>,
    pub model: Option<i64>,
    pub year: Option<i32>,
    pub status: Option<String>,
    pub price: Option<i64>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    /// Presence flags: any value (including empty) switches them on
    pub my: Option<String>,
    pub cheap_new_not_moderation: Option<String>,
    pub old_or_expensive_not_sold: Option<String>,
}

impl CarQuery {
    /// Build the filter; `viewer` is the authenticated caller, if any.
    pub fn into_filter(self, viewer: Option<i64>) -> AppResult<CarFilter> {
        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(CarStatus::parse(raw).ok_or_else(|| {
                AppError::field("status", format!("Select a valid choice. {} is not one of the available choices", raw))
            })?),
        };

        Ok(CarFilter {
            seller_id: self.my.and(viewer),
            brand_id: self.brand,
            model_id: self.model,
            year: self.year,
            status,
            price: self.price,
            max_price: None,
            cheap_new_not_moderation: self.cheap_new_not_moderation.is_some(),
            old_or_expensive_not_sold: self.old_or_expensive_not_sold.is_some(),
            search: self
                .search
                .as_deref()
                .map(split_search_terms)
                .unwrap_or_default(),
            ordering: self
                .ordering
                .as_deref()
                .map(CarOrdering::parse_list)
                .unwrap_or_default(),
        })
    }
}

/// Split a search string on whitespace and commas, dropping empties
pub fn split_search_terms(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// `1200000` → `1,200,000 ₽`
pub fn format_price(price: i64) -> String {
    format!("{} ₽", group_thousands(price))
}

/// Insert a comma every three digits from the right
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Page of listings with the numbers the browse template needs
#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub cars: Vec<CarListing>,
    pub page: u64,
    pub total_pages: u64,
    pub total: u64,
}

impl ListingPage {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn previous_page(&self) -> u64 {
        self.page.saturating_sub(1).max(1)
    }

    pub fn next_page(&self) -> u64 {
        self.page + 1
    }
}

/// Listing with its photos (detail page)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CarDetail {
    #[serde(flatten)]
    pub listing: CarListing,
    pub photos: Vec<CarPhoto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_formatting() {
        assert_eq!(format_price(1_200_000), "1,200,000 ₽");
        assert_eq!(format_price(999), "999 ₽");
        assert_eq!(format_price(1000), "1,000 ₽");
        assert_eq!(format_price(0), "0 ₽");
    }

    #[test]
    fn test_ordering_parse() {
        let ordering = CarOrdering::parse_list("-price, year,unknown");
        assert_eq!(
            ordering,
            vec![
                CarOrdering { field: CarOrderField::Price, descending: true },
                CarOrdering { field: CarOrderField::Year, descending: false },
            ]
        );
    }

    #[test]
    fn test_my_flag_ignored_for_anonymous() {
        let query = CarQuery { my: Some(String::new()), ..Default::default() };
        assert_eq!(query.clone().into_filter(None).unwrap().seller_id, None);
        assert_eq!(query.into_filter(Some(7)).unwrap().seller_id, Some(7));
    }

    #[test]
    fn test_untouched_filter_form_means_no_filter() {
        use axum::{extract::Query, http::Uri};

        let uri: Uri = "/cars/?brand=&model=&year=&price=&status=&search=".parse().unwrap();
        let Query(query) = Query::<CarQuery>::try_from_uri(&uri).unwrap();
        let filter = query.into_filter(None).unwrap();
        assert_eq!(filter.brand_id, None);
        assert_eq!(filter.year, None);
        assert_eq!(filter.price, None);
        assert_eq!(filter.status, None);
        assert!(filter.search.is_empty());
    }

    #[test]
    fn test_invalid_status_filter() {
        let query = CarQuery { status: Some("draft".into()), ..Default::default() };
        assert!(matches!(query.into_filter(None), Err(AppError::FieldErrors(_))));
    }

    #[test]
    fn test_form_collects_field_errors() {
        let form = CarForm {
            brand: "1".into(),
            model: "".into(),
            year: "20x4".into(),
            price: "-5".into(),
            description: "Nice".into(),
            ..Default::default()
        };
        let err = form.parse().unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains_key("model"));
        assert!(fields.contains_key("year"));
    }

    #[test]
    fn test_form_rejects_negative_price() {
        let form = CarForm {
            brand: "1".into(),
            model: "2".into(),
            year: "2020".into(),
            price: "-5".into(),
            description: "Nice".into(),
            ..Default::default()
        };
        let err = form.parse().unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("price"));
    }

    #[test]
    fn test_form_parses_optional_mileage() {
        let form = CarForm {
            brand: "1".into(),
            model: "2".into(),
            year: "2020".into(),
            price: "1500000".into(),
            description: "Nice".into(),
            status: "active".into(),
            ..Default::default()
        };
        let input = form.parse().unwrap();
        assert_eq!(input.mileage, None);
        assert_eq!(input.status, CarStatus::Active);
    }

    #[test]
    fn test_image_url_validation() {
        assert!(validate_optional_url("").is_ok());
        assert!(validate_optional_url("https://img.example.com/a.jpg").is_ok());
        assert!(validate_optional_url("not a url").is_err());
        assert!(validate_optional_url("https://").is_err());
        assert!(validate_optional_url("ftp://files.example.com/a.jpg").is_err());
        assert!(validate_optional_url(&format!("https://a.com/{}", "x".repeat(500))).is_err());
    }

    #[test]
    fn test_search_terms() {
        assert_eq!(split_search_terms("  toyota  camry,red "), vec!["toyota", "camry", "red"]);
    }
}
