//! The rule bundle every operation reads from.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::traits::TraitTable;

/// Rate table plus trait lookup, shared read-only across all pets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ruleset {
    #[serde(default)]
    pub config: SimConfig,
    #[serde(default = "TraitTable::standard")]
    pub traits: TraitTable,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::standard()
    }
}

impl Ruleset {
    /// Default rates with the built-in breeds and personalities.
    pub fn standard() -> Self {
        Self {
            config: SimConfig::default(),
            traits: TraitTable::standard(),
        }
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            config,
            traits: TraitTable::standard(),
        }
    }
}
