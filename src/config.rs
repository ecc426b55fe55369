//! Configuration layering: file, then environment, then flags.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use pageproof_core_types::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything the CLI needs beyond the engine defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,

    /// Directory diagnostic artifacts are written into.
    pub artifacts_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            artifacts_dir: PathBuf::from("artifacts"),
        }
    }
}

/// Load configuration. An explicit file is required to exist; the
/// default `pageproof` file (json/yaml/toml) is optional. Environment
/// variables use the `PAGEPROOF_` prefix with `__` separators, e.g.
/// `PAGEPROOF_ENGINE__DEFAULT_TIMEOUT_MS=10000`.
pub fn load(file: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    builder = match file {
        Some(path) => builder.add_source(File::from(path)),
        None => builder.add_source(File::with_name("pageproof").required(false)),
    };

    builder = builder.add_source(Environment::with_prefix("PAGEPROOF").separator("__"));

    let config = builder.build().context("failed to read configuration")?;
    config
        .try_deserialize()
        .context("invalid configuration values")
}
