use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Tunables shared by the question gate and the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Postal-code prefixes where school-period programs scale with income.
    pub income_sensitive_territories: BTreeSet<String>,
    /// Minimum remaining cost once aid would make a paid activity free.
    pub residual_floor: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            income_sensitive_territories: BTreeSet::from(["42".to_string()]),
            residual_floor: super::summary::DEFAULT_RESIDUAL_FLOOR,
        }
    }
}
