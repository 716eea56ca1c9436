//! Base repository trait shared by the concrete stores.
//!
//! Holds the operations that look the same for every table, so each
//! store only spells out its domain-specific queries.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::errors::AppResult;

/// Read operations common to every table
#[async_trait]
pub trait ReadRepository<E>: Send + Sync
where
    E: EntityTrait,
    E::Model: Sync,
{
    /// Get database connection reference
    fn db(&self) -> &DatabaseConnection;

    /// Count all rows
    async fn count(&self) -> AppResult<u64> {
        E::find().count(self.db()).await.map_err(Into::into)
    }
}

macro_rules! impl_read_repository {
    ($store:ty, $entity:ty) => {
        impl $crate::infra::repositories::ReadRepository<$entity> for $store {
            fn db(&self) -> &sea_orm::DatabaseConnection {
                &self.db
            }
        }
    };
}

pub(crate) use impl_read_repository;
