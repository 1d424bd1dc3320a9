//! JSON configuration for the command-line tool.

use std::path::Path;

use anyhow::{Context, Result};
use facetsel_core::GrowParams;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings read from `--config`.
///
/// ```json
/// { "grow": { "angle_threshold_degrees": 5.0 } }
/// ```
///
/// Missing fields take their defaults; unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub grow: GrowParams,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Merge the optional config file with a command-line tolerance; the
    /// command line wins. The result is validated.
    pub fn resolve(path: Option<&Path>, angle: Option<f64>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(angle) = angle {
            config.grow.angle_threshold_degrees = angle;
        }
        config.grow.validate()?;
        Ok(config)
    }
}
