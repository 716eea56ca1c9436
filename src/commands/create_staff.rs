//! Create-staff command - Seeds an admin console account.

use crate::cli::args::CreateStaffArgs;
use crate::config::{Config, STAFF_PASSWORD_ENV};
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};

/// Execute the create-staff command
pub async fn execute(args: CreateStaffArgs, config: Config) -> AppResult<()> {
    let password = std::env::var(STAFF_PASSWORD_ENV)
        .map_err(|_| AppError::validation(format!("{} must be set", STAFF_PASSWORD_ENV)))?;

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let services = Services::from_connection(db.get_connection(), config);

    let user = services
        .auth()
        .create_staff(args.username, args.email, password)
        .await?;

    tracing::info!(user_id = user.id, "Staff account created");
    println!("Staff user '{}' created (id {})", user.username, user.id);

    Ok(())
}
