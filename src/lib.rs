//! CarHub - vehicle classifieds marketplace
//!
//! Sellers post car listings, buyers browse, filter and bookmark them,
//! everyone talks on a threaded forum, and staff moderate the data and
//! export it as spreadsheets.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and rules
//! - **services**: Application use cases
//! - **infra**: Database, migrations, repositories, unit of work
//! - **export**: Listing reports (XLSX, CSV, JSON)
//! - **api**: JSON handlers, middleware and routes
//! - **web**: Server-rendered pages
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! carhub serve
//!
//! # Run migrations
//! carhub migrate up
//!
//! # Export active listings
//! carhub export --format csv --output listings.csv
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod export;
pub mod infra;
pub mod services;
pub mod types;
pub mod web;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User, UserRole};
pub use errors::{AppError, AppResult};
