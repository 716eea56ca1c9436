//! JSON side of the HTTP server.
//!
//! Public REST endpoints live under `/api/`, the staff console under
//! `/admin/api/`. Both share [`AppState`] and the identity middleware with
//! the HTML pages in [`crate::web`].

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
