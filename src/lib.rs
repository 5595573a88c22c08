//! Resumable realtime watches over a Firestore-style `Listen` stream.
//!
//! A watch adds one target (a document or a query) to a bidirectional stream
//! and turns the server's incremental change messages into consistent
//! snapshots. Transient stream failures are survived transparently by
//! reconnecting with exponential backoff and the last resume token.
//!
//! Start with [`WatchClient`], or [`WatchSettings::new`] to load settings from
//! files and environment variables.

mod client;
mod config;
pub mod constants;
mod document;
mod errors;
mod network;
pub mod proto;
mod watch;

pub use client::*;
pub use config::*;
pub use document::*;
pub use errors::*;
pub use network::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(test)]
mod document_test;
#[cfg(test)]
mod errors_test;
