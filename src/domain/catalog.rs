//! Brand and model catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Car brand (make)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Brand {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Toyota")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Car model, unique per brand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CarModel {
    #[schema(example = 3)]
    pub id: i64,
    #[schema(example = 1)]
    pub brand_id: i64,
    #[schema(example = "Camry")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Brand create/update payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BrandInput {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[schema(example = "Toyota")]
    pub name: String,
}

/// Model create/update payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CarModelInput {
    #[schema(example = 1)]
    pub brand_id: i64,
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[schema(example = "Camry")]
    pub name: String,
}

/// Sort keys accepted by the brand list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrandOrdering {
    #[default]
    NameAsc,
    NameDesc,
    CreatedAtAsc,
    CreatedAtDesc,
}

impl BrandOrdering {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "-name" => BrandOrdering::NameDesc,
            "created_at" => BrandOrdering::CreatedAtAsc,
            "-created_at" => BrandOrdering::CreatedAtDesc,
            _ => BrandOrdering::NameAsc,
        }
    }
}

/// Brand list query
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BrandQuery {
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_ordering_defaults_to_name() {
        assert_eq!(BrandOrdering::parse(""), BrandOrdering::NameAsc);
        assert_eq!(BrandOrdering::parse("bogus"), BrandOrdering::NameAsc);
        assert_eq!(BrandOrdering::parse("-created_at"), BrandOrdering::CreatedAtDesc);
    }

    #[test]
    fn test_brand_input_validation() {
        assert!(BrandInput { name: String::new() }.validate().is_err());
        assert!(BrandInput { name: "Lada".into() }.validate().is_ok());
    }
}
