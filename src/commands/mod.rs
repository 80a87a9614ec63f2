//! CLI command definitions and dispatch.

pub mod asset;
pub mod group;
pub mod migrate;
pub mod sequence;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use cdnstore_core::config::AppConfig;
use cdnstore_core::error::AppError;
use cdnstore_core::traits::StorageProvider;
use cdnstore_database::DatabasePool;
use cdnstore_service::{
    AssetService, LifecycleManager, SequenceAllocator, UploadService,
};
use cdnstore_storage::{ImageVariantPipeline, LocalStorageProvider};

use crate::output::OutputFormat;

/// cdnstore: image asset store administration
#[derive(Debug, Parser)]
#[command(name = "cdnstore", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Sequence counter management
    Sequence(sequence::SequenceArgs),
    /// Single asset operations
    Asset(asset::AssetArgs),
    /// Whole-group lifecycle operations
    Group(group::GroupArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        let pool = DatabasePool::connect(&config.database).await?;

        let result = match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &pool).await,
            Commands::Sequence(args) => {
                let services = Services::build(&config, &pool).await?;
                sequence::execute(args, &services, self.format).await
            }
            Commands::Asset(args) => {
                let services = Services::build(&config, &pool).await?;
                asset::execute(args, &services, self.format).await
            }
            Commands::Group(args) => {
                let services = Services::build(&config, &pool).await?;
                group::execute(args, &services, self.format).await
            }
        };

        pool.close().await;
        result
    }
}

/// Every service a command may need, wired from configuration.
#[derive(Debug, Clone)]
pub struct Services {
    /// Counter alias upload group codes come from.
    pub group_alias: String,
    /// Code allocation.
    pub allocator: Arc<SequenceAllocator>,
    /// Asset queries.
    pub assets: Arc<AssetService>,
    /// Lifecycle transitions.
    pub lifecycle: Arc<LifecycleManager>,
    /// Upload orchestration.
    pub upload: Arc<UploadService>,
}

impl Services {
    /// Wire the services against PostgreSQL and the local file store.
    pub async fn build(config: &AppConfig, pool: &DatabasePool) -> Result<Self, AppError> {
        let asset_repo = Arc::new(pool.asset_repository());
        let sequence_repo = Arc::new(pool.sequence_repository());
        let storage: Arc<dyn StorageProvider> =
            Arc::new(LocalStorageProvider::new(&config.storage.root_path).await?);

        let allocator = Arc::new(SequenceAllocator::new(sequence_repo));
        let assets = Arc::new(AssetService::new(
            asset_repo.clone(),
            config.storage.public_url.clone(),
        ));
        let lifecycle = Arc::new(LifecycleManager::new(asset_repo, storage.clone()));
        let pipeline = Arc::new(ImageVariantPipeline::new(storage.clone(), &config.variants)?);
        let upload = Arc::new(UploadService::new(
            allocator.clone(),
            assets.clone(),
            lifecycle.clone(),
            storage,
            pipeline,
            config.storage.clone(),
            config.sequence.group_alias.clone(),
        ));

        Ok(Self {
            group_alias: config.sequence.group_alias.clone(),
            allocator,
            assets,
            lifecycle,
            upload,
        })
    }
}

/// Ask for confirmation unless `yes` was given.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool, AppError> {
    if yes {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
