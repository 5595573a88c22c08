use std::time::Duration;

use super::WatchClient;
use crate::BackoffPolicy;
use crate::ConnectionConfig;
use crate::Result;
use crate::WatchSettings;

pub struct WatchClientBuilder {
    settings: WatchSettings,
}

impl WatchClientBuilder {
    /// Builder with default settings for the default database of `project_id`
    pub fn new(project_id: impl Into<String>) -> Self {
        let mut settings = WatchSettings::default();
        settings.connection.project_id = project_id.into();
        Self { settings }
    }

    /// Database within the project (default: `(default)`)
    pub fn database_id(
        mut self,
        database_id: impl Into<String>,
    ) -> Self {
        self.settings.connection.database_id = database_id.into();
        self
    }

    /// Service address (default: `https://firestore.googleapis.com`)
    pub fn endpoint(
        mut self,
        endpoint: impl Into<String>,
    ) -> Self {
        self.settings.connection.endpoint = endpoint.into();
        self
    }

    /// Set connection timeout (default: 5s)
    pub fn connect_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.settings.connection.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Enable/disable gzip on the listen stream (default: disabled)
    pub fn enable_compression(
        mut self,
        enable: bool,
    ) -> Self {
        self.settings.connection.enable_compression = enable;
        self
    }

    /// Disable for plaintext endpoints such as a local emulator (default: enabled)
    pub fn enable_tls(
        mut self,
        enable: bool,
    ) -> Self {
        self.settings.connection.enable_tls = enable;
        self
    }

    /// Reconnect pauses (default: 1s growing by 1.5x up to 60s)
    pub fn backoff(
        mut self,
        policy: BackoffPolicy,
    ) -> Self {
        self.settings.backoff = policy;
        self
    }

    /// Completely replaces the connection settings
    ///
    /// Discards anything set through [`endpoint`](Self::endpoint),
    /// [`database_id`](Self::database_id) and the other connection methods.
    pub fn set_connection(
        mut self,
        connection: ConnectionConfig,
    ) -> Self {
        self.settings.connection = connection;
        self
    }

    /// Validates the settings and builds a client over a lazily connected
    /// channel
    pub fn build(self) -> Result<WatchClient> {
        let settings = self.settings.validate()?;
        WatchClient::connect(&settings)
    }
}
