//! Resumable watch streams.
//!
//! A watch keeps one listen stream open for a single target and turns the
//! server's incremental messages into consistent snapshots:
//!
//! - `state`: per-message target change state machine
//! - `assembler`: folds pending changes into a snapshot
//! - `stream`: connection owner, reconnect loop and sticky errors
//! - `iterator`: public `next`/`stop` surface
//!
//! Transient stream failures are retried with exponential backoff and the
//! last resume token; everything else ends the watch for good.

mod assembler;
mod backoff;
mod iterator;
mod state;
mod stream;

pub use assembler::WatchSnapshot;
pub use iterator::*;
pub(crate) use stream::WatchStream;
