//! Sequence counter CLI commands.

use clap::{Args, Subcommand};

use cdnstore_core::error::AppError;

use super::Services;
use crate::output::{self, OutputFormat};

/// Arguments for sequence commands
#[derive(Debug, Args)]
pub struct SequenceArgs {
    /// Sequence subcommand
    #[command(subcommand)]
    pub command: SequenceCommand,
}

/// Sequence subcommands
#[derive(Debug, Subcommand)]
pub enum SequenceCommand {
    /// Seed a counter starting at 1 in today's period
    Init {
        /// Counter alias; the upload group alias when omitted
        alias: Option<String>,
        /// Prefix prepended to every code
        #[arg(long)]
        prefix: Option<String>,
        /// Suffix appended to every code
        #[arg(long)]
        suffix: Option<String>,
    },
    /// Show one counter, or all of them
    Show {
        /// Counter alias
        alias: Option<String>,
    },
    /// Print the next code
    Next {
        /// Counter alias; the upload group alias when omitted
        alias: Option<String>,
        /// Advance the counter instead of only previewing
        #[arg(long)]
        commit: bool,
    },
}

/// Execute sequence commands
pub async fn execute(
    args: &SequenceArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    let default_alias = || services.group_alias.clone();

    match &args.command {
        SequenceCommand::Init {
            alias,
            prefix,
            suffix,
        } => {
            let alias = alias.clone().unwrap_or_else(default_alias);
            let counter = services
                .allocator
                .seed(&alias, prefix.clone(), suffix.clone())
                .await?;
            output::print_counters(std::slice::from_ref(&counter), format);
        }
        SequenceCommand::Show { alias } => {
            let counters = match alias {
                Some(alias) => vec![services.allocator.counter(alias).await?],
                None => services.allocator.counters().await?,
            };
            output::print_counters(&counters, format);
        }
        SequenceCommand::Next { alias, commit } => {
            let alias = alias.clone().unwrap_or_else(default_alias);
            let code = services.allocator.next_code(&alias, *commit).await?;
            if code.starts_with("ER-") {
                output::print_warning(&format!(
                    "Counter '{alias}' is unavailable; this is a fallback code"
                ));
            }
            println!("{code}");
        }
    }

    Ok(())
}
