//! Watch Client Error Hierarchy
//!
//! Two layers:
//! - [`Error`]: crate-level failures while building a client (configuration,
//!   endpoint parsing, channel setup).
//! - [`WatchError`]: everything a running watch stream can report. It is
//!   `Clone` so that a terminated stream can hand back the very same error on
//!   every later call.

use config::ConfigError;
use tonic::Code;
use tonic::Status;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failures reported by a watch stream
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// gRPC channel setup failures
    #[error(transparent)]
    Transport(#[from] tonic::transport::Error),

    /// Malformed endpoint address
    #[error("Invalid URI format: {0}")]
    InvalidUri(String),

    /// Local file access (certificates)
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by watch streams and snapshot iterators
#[derive(Debug, Clone, thiserror::Error)]
pub enum WatchError {
    /// The server sent something this client cannot accept
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A transport status that is not worth retrying, or a failed stream open
    #[error("Listen stream failed: {0}")]
    Status(#[from] Status),

    /// A document in a snapshot could not be decoded
    #[error("Document decode failed: {0}")]
    Decode(String),

    /// The watched document path is malformed
    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    /// The caller's cancellation token fired
    #[error("Watch cancelled")]
    Cancelled,

    /// The iterator was stopped; iterators report this as the end of iteration
    #[error("Watch stopped")]
    Stopped,
}

/// Unexpected message sequences. None of these are ever retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Unexpected target ID sent by server: expected {expected}, got {got:?}")]
    UnexpectedTargetId { expected: i32, got: Option<i32> },

    #[error("Target removed by server ({code:?}): {message}")]
    TargetRemoved { code: Code, message: String },

    #[error("Unknown target change type {0}")]
    UnknownTargetChange(i32),

    #[error("Unknown listen response type")]
    UnknownResponse,

    #[error("Unsupported listen response type: {0}")]
    UnsupportedResponse(&'static str),

    #[error("Document change without a document")]
    MissingDocument,

    #[error("Invalid read time: {0}")]
    InvalidReadTime(String),
}

impl WatchError {
    /// gRPC code that best describes this error
    pub fn code(&self) -> Code {
        match self {
            WatchError::Protocol(ProtocolError::TargetRemoved { code, .. }) => *code,
            WatchError::Protocol(_) => Code::Internal,
            WatchError::Status(status) => status.code(),
            WatchError::Decode(_) => Code::Internal,
            WatchError::InvalidPath(_) => Code::InvalidArgument,
            WatchError::Cancelled => Code::Cancelled,
            WatchError::Stopped => Code::Cancelled,
        }
    }

    /// `true` when the error came from caller cancellation rather than the stream
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WatchError::Cancelled)
    }
}
