//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `export` - Active listings report
//! - `create-staff` - Admin console account

pub mod args;

pub use args::{Cli, Commands};
