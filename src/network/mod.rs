//! Stream transport abstraction for listen streams.
//!
//! A [`ListenTransport`] opens one bidirectional stream per call and sends the
//! add-target request on it; the returned [`ListenConnection`] yields server
//! messages until the stream ends or fails. The watch driver owns all retry
//! decisions, transports never retry on their own.

pub mod grpc;
pub use grpc::*;

#[cfg(test)]
mod network_test;

#[cfg(test)]
use mockall::automock;
use tonic::async_trait;
use tonic::Code;
use tonic::Status;

use crate::proto::ListenResponse;
use crate::proto::Target;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ListenTransport: Send + Sync + 'static {
    /// Opens a listen stream and sends a single add-target request for
    /// `target`, including whatever resume token it currently carries.
    ///
    /// # Errors
    /// Any status returned here is treated as permanent by the caller.
    async fn open(
        &self,
        target: &Target,
    ) -> std::result::Result<Box<dyn ListenConnection>, Status>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ListenConnection: Send {
    /// Next server message.
    ///
    /// `Ok(None)` signals a clean end of stream, which callers treat as
    /// retryable.
    async fn receive(&mut self) -> std::result::Result<Option<ListenResponse>, Status>;

    /// Best-effort half-close of the request side
    async fn close(&mut self) -> std::result::Result<(), Status>;
}

/// Whether a transport status should end the watch instead of reconnecting.
///
/// `Cancelled` here is cancellation reported by the transport itself; caller
/// cancellation never reaches this function.
pub fn is_permanent_watch_error(status: &Status) -> bool {
    !matches!(
        status.code(),
        Code::Cancelled
            | Code::Unknown
            | Code::DeadlineExceeded
            | Code::ResourceExhausted
            | Code::Internal
            | Code::Unavailable
            | Code::Unauthenticated
    )
}
