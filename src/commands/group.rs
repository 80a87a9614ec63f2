//! Group lifecycle CLI commands.

use clap::{Args, Subcommand};

use cdnstore_core::error::AppError;
use cdnstore_entity::asset::SizeLabel;

use super::Services;
use crate::output::{self, OutputFormat};

/// Arguments for group commands
#[derive(Debug, Args)]
pub struct GroupArgs {
    /// Group subcommand
    #[command(subcommand)]
    pub command: GroupCommand,
}

/// Group subcommands
#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    /// Soft-delete every asset of a group
    Delete {
        /// Group code
        code: String,
        /// Only this size label
        #[arg(long)]
        size: Option<SizeLabel>,
    },
    /// Restore every soft-deleted asset of a group
    Restore {
        /// Group code
        code: String,
        /// Only this size label
        #[arg(long)]
        size: Option<SizeLabel>,
    },
    /// Permanently remove every asset of a group and their files
    Purge {
        /// Group code
        code: String,
        /// Only this size label
        #[arg(long)]
        size: Option<SizeLabel>,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Execute group commands
pub async fn execute(
    args: &GroupArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    let affected = match &args.command {
        GroupCommand::Delete { code, size } => {
            services.lifecycle.delete_group(code, size.as_ref()).await?
        }
        GroupCommand::Restore { code, size } => {
            services.lifecycle.restore_group(code, size.as_ref()).await?
        }
        GroupCommand::Purge { code, size, yes } => {
            let prompt = format!("Permanently remove group '{code}' and its files?");
            if !super::confirm(&prompt, *yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            services
                .lifecycle
                .force_delete_group(code, size.as_ref())
                .await?
        }
    };

    output::print_assets(&affected, format);
    Ok(())
}
