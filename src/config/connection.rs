use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;
use tonic::transport::Uri;

use crate::constants::DEFAULT_DATABASE_ID;
use crate::constants::DEFAULT_ENDPOINT;
use crate::DatabasePath;
use crate::Error;
use crate::Result;

/// Where and how to open listen streams
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// Service endpoint, e.g. `https://firestore.googleapis.com` or
    /// `http://localhost:8080` for an emulator
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub project_id: String,

    #[serde(default = "default_database_id")]
    pub database_id: String,

    /// TCP connect timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_tcp_keepalive_secs")]
    pub tcp_keepalive_secs: u64,

    /// HTTP2 keepalive ping interval in seconds
    #[serde(default = "default_h2_keepalive_interval_secs")]
    pub http2_keepalive_interval_secs: u64,

    /// HTTP2 keepalive timeout in seconds
    #[serde(default = "default_h2_keepalive_timeout_secs")]
    pub http2_keepalive_timeout_secs: u64,

    /// Gzip both directions of the listen stream
    #[serde(default)]
    pub enable_compression: bool,

    #[serde(default = "default_enable_tls")]
    pub enable_tls: bool,

    /// Extra CA certificate (PEM) trusted in addition to the system roots
    #[serde(default)]
    pub ca_cert_path: Option<PathBuf>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            project_id: String::new(),
            database_id: default_database_id(),
            connect_timeout_ms: default_connect_timeout_ms(),
            tcp_keepalive_secs: default_tcp_keepalive_secs(),
            http2_keepalive_interval_secs: default_h2_keepalive_interval_secs(),
            http2_keepalive_timeout_secs: default_h2_keepalive_timeout_secs(),
            enable_compression: false,
            enable_tls: default_enable_tls(),
            ca_cert_path: None,
        }
    }
}

impl ConnectionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.project_id.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "connection.project_id cannot be empty".into(),
            )));
        }
        if self.database_id.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "connection.database_id cannot be empty".into(),
            )));
        }
        if self.endpoint.parse::<Uri>().is_err() {
            return Err(Error::InvalidUri(self.endpoint.clone()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "connection.connect_timeout_ms must be greater than 0".into(),
            )));
        }
        Ok(())
    }

    pub fn database(&self) -> DatabasePath {
        DatabasePath::new(&self.project_id, &self.database_id)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn tcp_keepalive(&self) -> Duration {
        Duration::from_secs(self.tcp_keepalive_secs)
    }

    pub fn http2_keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.http2_keepalive_interval_secs)
    }

    pub fn http2_keepalive_timeout(&self) -> Duration {
        Duration::from_secs(self.http2_keepalive_timeout_secs)
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_database_id() -> String {
    DEFAULT_DATABASE_ID.to_string()
}
fn default_connect_timeout_ms() -> u64 {
    5000
}
fn default_tcp_keepalive_secs() -> u64 {
    300
}
fn default_h2_keepalive_interval_secs() -> u64 {
    60
}
fn default_h2_keepalive_timeout_secs() -> u64 {
    20
}
fn default_enable_tls() -> bool {
    true
}
