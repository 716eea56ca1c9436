//! Admin console list parameters.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::types::empty_as_none;

use super::car::split_search_terms;

/// Query string shared by every admin list.
///
/// Each list reads the filters that apply to it and ignores the rest.
/// `created_from` and `created_to` are inclusive calendar dates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub is_staff: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub is_main: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub brand: Option<i64>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub car: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub per_page: Option<u64>,
}

impl AdminQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(DEFAULT_PAGE_NUMBER).max(1)
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn search_terms(&self) -> Vec<String> {
        self.search
            .as_deref()
            .map(split_search_terms)
            .unwrap_or_default()
    }

    /// Half-open `[from, to)` timestamp range for the date filters
    pub fn created_range(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let start = |date: NaiveDate| date.and_time(NaiveTime::MIN).and_utc();
        let from = self.created_from.map(start);
        let to = self
            .created_to
            .and_then(|date| date.checked_add_days(Days::new(1)))
            .map(start);
        (from, to)
    }
}

/// Selection for the admin export action
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ExportSelection {
    pub ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_range_is_inclusive_of_last_day() {
        let query = AdminQuery {
            created_from: NaiveDate::from_ymd_opt(2024, 3, 1),
            created_to: NaiveDate::from_ymd_opt(2024, 3, 31),
            ..Default::default()
        };
        let (from, to) = query.created_range();
        assert_eq!(from.unwrap().to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(to.unwrap().to_rfc3339(), "2024-04-01T00:00:00+00:00");
    }

    #[test]
    fn test_per_page_is_clamped() {
        let query = AdminQuery { per_page: Some(10_000), page: Some(0), ..Default::default() };
        assert_eq!(query.per_page(), MAX_PAGE_SIZE);
        assert_eq!(query.page(), 1);
    }
}
