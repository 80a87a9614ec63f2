//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod logging;
pub mod sequence;
pub mod storage;
pub mod variant;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::sequence::SequenceConfig;
pub use self::storage::StorageConfig;
pub use self::variant::{VariantConfig, VariantSpec};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (base file + environment overlay + env vars).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// File storage and upload settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Sequence code allocation settings.
    #[serde(default)]
    pub sequence: SequenceConfig,
    /// Derived size variant settings.
    #[serde(default)]
    pub variants: VariantConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Merges the given file with an environment-specific overlay
    /// (`config/{CDNSTORE_ENV}.toml`) and environment variables prefixed
    /// with `CDNSTORE__`.
    pub fn load(config_path: &str) -> Result<Self, AppError> {
        let env = std::env::var("CDNSTORE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CDNSTORE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
