//! Configuration management for watch clients.
//!
//! Sources are merged with increasing priority:
//! 1. Default values (hardcoded)
//! 2. File named by `WATCH_CONFIG_PATH`
//! 3. Files passed to [`WatchSettings::with_override_config`]
//! 4. Environment variables prefixed `WATCH__` (highest priority)

mod connection;
mod retry;
pub use connection::*;
pub use retry::*;


use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::CONFIG_ENV_PREFIX;
use crate::constants::CONFIG_PATH_ENV;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct WatchSettings {
    /// Endpoint and database of the listen streams
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Reconnect pacing
    #[serde(default)]
    pub backoff: BackoffPolicy,
}

impl WatchSettings {
    /// Defaults, then the file named by `WATCH_CONFIG_PATH`, then environment
    /// overrides.
    ///
    /// No validation happens here; call [`validate`](Self::validate) once all
    /// overrides are applied.
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let settings: Self = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Merges `path` over the current values; environment variables still win.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let settings: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn validate(self) -> Result<Self> {
        self.connection.validate()?;
        self.backoff.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(CONFIG_ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
