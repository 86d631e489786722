// crates/analysis/src/config.rs

use qkdbench_params::kem::HYBRID_ALIASES;
use serde::{Deserialize, Serialize};

// Default configuration for ingestion and aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub warmup: u32,                 // iterations <= warmup are dropped
    pub decimals: u32,               // rounding applied to every statistic
    pub hybrid_aliases: Vec<String>, // OQS names duplicating a pure catalog entry
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            warmup: 3,
            decimals: 3,
            hybrid_aliases: HYBRID_ALIASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// Builder methods for easy customization
impl AnalysisConfig {
    pub fn with_warmup(mut self, warmup: u32) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_hybrid_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hybrid_aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Round to the configured number of decimals
    pub fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.decimals as i32);
        (value * factor).round() / factor
    }
}
