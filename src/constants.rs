// -
// Listen protocol

/// The fixed target identifier used for single-target streams.
///
/// Each watch stream adds exactly one target, so the only requirement on this
/// value is that it is unique within a connection.
pub const WATCH_TARGET_ID: i32 = 0x5741;

/// gRPC method path of the bidirectional listen stream
pub(crate) const LISTEN_METHOD_PATH: &str = "/google.firestore.v1.Firestore/Listen";

/// Routing headers attached to every listen stream
pub(crate) const RESOURCE_PREFIX_HEADER: &str = "google-cloud-resource-prefix";
pub(crate) const REQUEST_PARAMS_HEADER: &str = "x-goog-request-params";

// -
// Backoff defaults

pub(crate) const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;
pub(crate) const DEFAULT_MAX_DELAY_MS: u64 = 60_000;
pub(crate) const DEFAULT_MULTIPLIER: f64 = 1.5;

// -
// Connection defaults

pub(crate) const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com";
pub(crate) const DEFAULT_DATABASE_ID: &str = "(default)";

/// Environment variable naming an extra configuration file
pub(crate) const CONFIG_PATH_ENV: &str = "WATCH_CONFIG_PATH";
/// Prefix of configuration environment overrides, e.g. `WATCH__BACKOFF__MAX_DELAY_MS`
pub(crate) const CONFIG_ENV_PREFIX: &str = "WATCH";
