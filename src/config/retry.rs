use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_INITIAL_DELAY_MS;
use crate::constants::DEFAULT_MAX_DELAY_MS;
use crate::constants::DEFAULT_MULTIPLIER;
use crate::Error;
use crate::Result;

/// Reconnect pacing for watch streams
///
/// Pauses start at `initial_delay_ms`, grow by `multiplier` on every
/// consecutive failure and never exceed `max_delay_ms`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// First pause after a failure (unit: milliseconds)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Upper bound of any pause; also used as-is when the server reports
    /// resource exhaustion (unit: milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Growth factor applied after each pause
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Draw each pause uniformly from `[initial, current]` instead of using
    /// `current` exactly
    #[serde(default)]
    pub jitter: bool,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            jitter: false,
        }
    }
}

impl BackoffPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.initial_delay_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "backoff.initial_delay_ms must be greater than 0".into(),
            )));
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "backoff.max_delay_ms ({}) must be >= initial_delay_ms ({})",
                self.max_delay_ms, self.initial_delay_ms
            ))));
        }
        if !self.multiplier.is_finite() {
            return Err(Error::Config(ConfigError::Message(format!(
                "backoff.multiplier ({}) must be finite",
                self.multiplier
            ))));
        }
        if !(self.multiplier >= 1.0) {
            return Err(Error::Config(ConfigError::Message(format!(
                "backoff.multiplier ({}) must be >= 1.0",
                self.multiplier
            ))));
        }
        Ok(())
    }
}

fn default_initial_delay_ms() -> u64 {
    DEFAULT_INITIAL_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}
fn default_multiplier() -> f64 {
    DEFAULT_MULTIPLIER
}
