//! Shared types used across handlers and services.

mod pagination;
mod query;
mod response;

pub use pagination::{Paginated, PaginationMeta, PaginationParams};
pub use query::empty_as_none;
pub use response::{Attachment, Created, NoContent};
