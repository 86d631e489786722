// crates/cli/src/config.rs

use std::path::Path;

use qkdbench_analysis::AnalysisConfig;
use qkdbench_api::{ConfigError, ConfigResult};
use qkdbench_harness::HarnessConfig;
use serde::Deserialize;
use tracing::debug;

/// Settings file layout: a `[harness]` and an `[analysis]` table, each
/// overriding the defaults field by field
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub harness: HarnessConfig,
    pub analysis: AnalysisConfig,
}

impl BenchConfig {
    /// Defaults when no file is given
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, path)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn parse(text: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}
