//! Column mapping from a listing to one report row.

use crate::config::EXPORT_DESCRIPTION_LIMIT;
use crate::domain::{format_price, CarListing};

/// Placeholder for listings whose seller account is gone
pub const MISSING_SELLER: &str = "— (удалённый пользователь)";

/// Placeholder for listings without a description
pub const MISSING_DESCRIPTION: &str = "Описание отсутствует";

/// Column headers, in report order
pub const COLUMNS: [&str; 9] = [
    "ID",
    "Марка автомобиля",
    "Модель автомобиля",
    "Год",
    "Пробег",
    "Цена",
    "Краткое описание",
    "Статус",
    "Продавец",
];

/// One report value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Number(i64),
    Text(String),
    Empty,
}

impl Cell {
    /// Text as written to CSV and used for column sizing
    pub fn display(&self) -> String {
        match self {
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Empty => String::new(),
        }
    }
}

/// Maps listings to report rows
pub struct CarResource;

impl CarResource {
    pub fn headers() -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn row(listing: &CarListing) -> Vec<Cell> {
        let car = &listing.car;
        vec![
            Cell::Number(car.id),
            Cell::Text(listing.brand_name.clone()),
            Cell::Text(listing.model_name.clone()),
            Cell::Number(car.year.into()),
            car.mileage
                .map(|m| Cell::Number(m.into()))
                .unwrap_or(Cell::Empty),
            Cell::Text(format_price(car.price)),
            Cell::Text(short_description(&car.description)),
            Cell::Text(car.status.label().to_string()),
            Cell::Text(seller(listing.seller_username.as_deref())),
        ]
    }

    pub fn rows(listings: &[CarListing]) -> Vec<Vec<Cell>> {
        listings.iter().map(Self::row).collect()
    }
}

fn short_description(description: &str) -> String {
    if description.is_empty() {
        return MISSING_DESCRIPTION.to_string();
    }
    if description.chars().count() > EXPORT_DESCRIPTION_LIMIT {
        let head: String = description.chars().take(EXPORT_DESCRIPTION_LIMIT).collect();
        format!("{}...", head)
    } else {
        description.to_string()
    }
}

fn seller(username: Option<&str>) -> String {
    match username {
        Some(name) => name.to_uppercase(),
        None => MISSING_SELLER.to_string(),
    }
}
