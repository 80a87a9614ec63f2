//! Derived size variant configuration.

use serde::{Deserialize, Serialize};

/// One derived size produced from every uploaded original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSpec {
    /// Size label stored on the derived asset (e.g. `"small"`).
    pub label: String,
    /// Maximum width in pixels; height follows the aspect ratio.
    pub max_width: u32,
}

/// Variant pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Sizes to produce, in output order.
    #[serde(default = "default_sizes")]
    pub sizes: Vec<VariantSpec>,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            sizes: default_sizes(),
        }
    }
}

fn default_sizes() -> Vec<VariantSpec> {
    vec![
        VariantSpec {
            label: "small".to_string(),
            max_width: 320,
        },
        VariantSpec {
            label: "medium".to_string(),
            max_width: 768,
        },
        VariantSpec {
            label: "large".to_string(),
            max_width: 1280,
        },
    ]
}
