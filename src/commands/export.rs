//! Export command - Writes the active listings report to disk.

use std::path::PathBuf;

use crate::cli::args::ExportArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};

/// Execute the export command
pub async fn execute(args: ExportArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let services = Services::from_connection(db.get_connection(), config);

    let file = services.admin().export(args.format, None).await?;
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(file.file_name()));

    tokio::fs::write(&path, &file.bytes)
        .await
        .map_err(|e| AppError::internal(format!("Failed to write {}: {}", path.display(), e)))?;

    tracing::info!(rows = file.rows, path = %path.display(), "Listings exported");
    println!("{} listings written to {}", file.rows, path.display());

    Ok(())
}
