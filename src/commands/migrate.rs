//! Database migration management commands.

use clap::{Args, Subcommand};

use cdnstore_core::error::AppError;
use cdnstore_database::DatabasePool;
use cdnstore_database::migration;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, pool: &DatabasePool) -> Result<(), AppError> {
    match &args.command {
        MigrateCommand::Run => {
            let applied = migration::run_migrations(pool.pool()).await?;
            if applied == 0 {
                output::print_success("Database schema is up to date.");
            } else {
                output::print_success(&format!("Applied {applied} migration(s)."));
            }
        }
    }
    Ok(())
}
