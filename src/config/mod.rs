//! Configuration management
//!
//! Settings come from built-in defaults, then an optional TOML file, then
//! `EARMARK__SECTION__KEY` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::shared::{DomainError, Result};

pub const ENV_PREFIX: &str = "EARMARK";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the persisted catalog
    pub catalog_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub status_interval_ms: u64,
    pub default_track_ms: u64,
    pub playback_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/challenges.json"),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: 250,
            default_track_ms: 30_000,
            playback_rate: 1.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    pub fn default_track_length(&self) -> Duration {
        Duration::from_millis(self.default_track_ms)
    }
}

impl Config {
    /// Load configuration, layering `path` (if it exists) and the environment
    /// over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the simulated engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.engine.status_interval_ms == 0 {
            return Err(DomainError::ValidationError(
                "engine.status_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !(self.engine.playback_rate.is_finite() && self.engine.playback_rate > 0.0) {
            return Err(DomainError::ValidationError(format!(
                "engine.playback_rate must be positive, got {}",
                self.engine.playback_rate
            )));
        }
        Ok(())
    }
}
