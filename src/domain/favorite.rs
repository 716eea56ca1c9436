//! Favorite (bookmarked listing).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub car_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Request body for bookmarking a listing
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddFavorite {
    #[schema(example = 42)]
    pub car_id: i64,
}
