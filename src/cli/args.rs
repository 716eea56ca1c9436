//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT};
use crate::export::ExportFormat;

/// CarHub - vehicle classifieds marketplace
#[derive(Parser, Debug)]
#[command(name = "carhub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Write the active listings report to a file
    Export(ExportArgs),

    /// Create a staff account for the admin console
    CreateStaff(CreateStaffArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_SERVER_HOST, env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT, env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the export command
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Report format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Xlsx)]
    pub format: ExportFormat,

    /// Output file; defaults to the download name in the current directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the create-staff command.
///
/// The password is read from `CARHUB_STAFF_PASSWORD` so it never lands
/// in shell history.
#[derive(Parser, Debug)]
pub struct CreateStaffArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long)]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_command() {
        let cli = Cli::parse_from(["carhub", "export", "--format", "csv", "-o", "out.csv"]);
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.format, ExportFormat::Csv);
                assert_eq!(args.output, Some(PathBuf::from("out.csv")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_create_staff_with_global_verbose() {
        let cli = Cli::parse_from([
            "carhub",
            "create-staff",
            "--username",
            "boss",
            "--email",
            "boss@example.com",
            "--verbose",
        ]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::CreateStaff(ref a) if a.username == "boss"));
    }
}
