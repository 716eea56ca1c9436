//! API middleware.

mod auth;

pub use auth::{identity_middleware, require_staff, CurrentUser, StaffUser};
