//! Sequence code allocation configuration.

use serde::{Deserialize, Serialize};

/// Settings for the sequence code allocator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Counter alias used to allocate upload group codes.
    #[serde(default = "default_group_alias")]
    pub group_alias: String,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            group_alias: default_group_alias(),
        }
    }
}

fn default_group_alias() -> String {
    "gallery_group".to_string()
}

