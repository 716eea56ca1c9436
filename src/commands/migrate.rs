//! `carhub migrate` - schema management without starting the server.

use sea_orm::DbErr;

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, MigrationState, Persistence, UnitOfWork};

fn db_failure(step: &'static str) -> impl Fn(DbErr) -> AppError {
    move |e| AppError::internal(format!("{} failed: {}", step, e))
}

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(db_failure("Database connection"))?;
    tracing::info!(backend = db.backend_name(), action = ?args.action, "Migration command");

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(db_failure("Migration"))?;
            report(&db.migration_status().await.map_err(db_failure("Status"))?);
        }
        MigrateAction::Down => {
            db.rollback_migration().await.map_err(db_failure("Rollback"))?;
            report(&db.migration_status().await.map_err(db_failure("Status"))?);
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(db_failure("Status"))?;
            for state in &status {
                println!("[{}] {}", if state.applied { "x" } else { " " }, state.name);
            }
            report(&status);
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping all tables, listings and accounts are lost");
            db.fresh_migrations().await.map_err(db_failure("Fresh migration"))?;

            // Sanity check: every table exists and is empty
            let counts = Persistence::new(db.get_connection()).table_counts().await?;
            tracing::info!(
                users = counts.users,
                cars = counts.cars,
                "Schema recreated"
            );
        }
    }

    Ok(())
}

fn report(status: &[MigrationState]) {
    let applied = status.iter().filter(|m| m.applied).count();
    tracing::info!(applied, pending = status.len() - applied, "Migration status");
}
