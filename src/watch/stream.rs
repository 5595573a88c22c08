//! Watch stream driver.
//!
//! Owns the transport connection and the reconnect loop. Messages are fed to
//! the [`WatchState`] machine until it reports a consistent point or a
//! permanent error. Transient stream failures are absorbed here: pending
//! changes are dropped, the driver sleeps for a backoff pause and reopens the
//! stream with the stored resume token.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tonic::Code;
use tracing::debug;
use tracing::error;
use tracing::warn;

use super::assembler::SnapshotAssembler;
use super::assembler::WatchSnapshot;
use super::backoff::Backoff;
use super::state::Step;
use super::state::WatchState;
use crate::is_permanent_watch_error;
use crate::proto::ListenResponse;
use crate::proto::Target;
use crate::BackoffPolicy;
use crate::DatabasePath;
use crate::ListenConnection;
use crate::ListenTransport;
use crate::WatchError;

#[derive(Debug)]
enum StreamStatus {
    Active,
    /// Terminal; every later call returns this error unchanged
    Terminated(WatchError),
}

/// Not safe for concurrent use: exactly one consumer drives a stream.
pub(crate) struct WatchStream {
    transport: Arc<dyn ListenTransport>,
    connection: Option<Box<dyn ListenConnection>>,
    state: WatchState,
    assembler: SnapshotAssembler,
    backoff: Backoff,
    status: StreamStatus,
    /// Caller's cancellation
    ctx: CancellationToken,
    /// Fired by `stop`; independent of `ctx`
    stop: CancellationToken,
}

impl WatchStream {
    pub(crate) fn new(
        transport: Arc<dyn ListenTransport>,
        target: Target,
        database: DatabasePath,
        policy: &BackoffPolicy,
        ctx: CancellationToken,
    ) -> Self {
        let stop = CancellationToken::new();
        Self {
            transport,
            connection: None,
            state: WatchState::new(target, database),
            assembler: SnapshotAssembler::new(),
            backoff: Backoff::new(policy),
            status: StreamStatus::Active,
            ctx,
            stop,
        }
    }

    pub(crate) fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// `stop` was called, whether or not the caller also cancelled
    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.is_cancelled()
    }

    #[cfg(test)]
    pub(crate) fn read_time(&self) -> std::time::SystemTime {
        self.state.read_time()
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &WatchState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Blocks until the next consistent snapshot.
    ///
    /// Once an error has been returned, every later call returns that same
    /// error.
    pub(crate) async fn next_snapshot(&mut self) -> std::result::Result<WatchSnapshot, WatchError> {
        if let StreamStatus::Terminated(err) = &self.status {
            return Err(err.clone());
        }

        loop {
            let step = match self.recv().await {
                Ok(response) => self.state.handle_response(response, &mut self.backoff),
                Err(e) => Err(e),
            };
            match step {
                Ok(Step::Continue) => continue,
                Ok(Step::Consistent) => break,
                Err(e) => return Err(self.terminate(e).await),
            }
        }

        match self.assembler.assemble(&mut self.state) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => Err(self.terminate(e).await),
        }
    }

    /// Ends the stream after `stop`, closing the connection if one is open
    pub(crate) async fn shutdown(&mut self) {
        self.terminate(WatchError::Stopped).await;
    }

    /// Next server message, opening or reopening the stream as needed.
    ///
    /// Every error returned from here is final for the stream.
    async fn recv(&mut self) -> std::result::Result<ListenResponse, WatchError> {
        loop {
            if self.connection.is_none() {
                debug!(
                    target_id = self.state.target_id(),
                    resuming = self.state.target().resume_token().is_some(),
                    "opening listen stream"
                );
                let opened = tokio::select! {
                    biased;
                    _ = cancelled(&self.ctx, &self.stop) => None,
                    opened = self.transport.open(self.state.target()) => Some(opened),
                };
                // Open failures are not retried.
                match opened {
                    Some(Ok(connection)) => self.connection = Some(connection),
                    Some(Err(status)) => return Err(WatchError::Status(status)),
                    None => return Err(self.cancellation()),
                }
            }
            let Some(connection) = self.connection.as_mut() else {
                continue;
            };

            let received = tokio::select! {
                biased;
                _ = cancelled(&self.ctx, &self.stop) => None,
                received = connection.receive() => Some(received),
            };
            let status = match received {
                None => return Err(self.cancellation()),
                Some(Ok(Some(response))) => return Ok(response),
                Some(Ok(None)) => None,
                Some(Err(status)) if is_permanent_watch_error(&status) => {
                    return Err(WatchError::Status(status));
                }
                Some(Err(status)) => Some(status),
            };

            // Changes since the last consistent point can no longer be trusted.
            self.state.clear_pending();
            let mut pause = self.backoff.pause();
            if status.as_ref().is_some_and(|s| s.code() == Code::ResourceExhausted) {
                pause = self.backoff.max();
            }
            warn!(
                target_id = self.state.target_id(),
                pause = ?pause,
                code = ?status.as_ref().map(|s| s.code()),
                "listen stream interrupted, reopening"
            );

            let slept = tokio::select! {
                biased;
                _ = cancelled(&self.ctx, &self.stop) => false,
                _ = tokio::time::sleep(pause) => true,
            };
            if !slept {
                return Err(self.cancellation());
            }
            self.connection = None;
        }
    }

    fn cancellation(&self) -> WatchError {
        if self.stop.is_cancelled() {
            WatchError::Stopped
        } else {
            WatchError::Cancelled
        }
    }

    /// Records `err` as the terminal error unless one is already set and
    /// returns the error callers should see.
    async fn terminate(
        &mut self,
        err: WatchError,
    ) -> WatchError {
        if let StreamStatus::Terminated(existing) = &self.status {
            return existing.clone();
        }

        if let Some(mut connection) = self.connection.take() {
            if let Err(e) = connection.close().await {
                debug!(error = %e, "ignoring error while closing listen stream");
            }
        }

        match &err {
            WatchError::Stopped => debug!(target_id = self.state.target_id(), "watch stopped"),
            WatchError::Cancelled => debug!(target_id = self.state.target_id(), "watch cancelled"),
            e => error!(target_id = self.state.target_id(), error = %e, "watch terminated"),
        }
        self.status = StreamStatus::Terminated(err.clone());
        err
    }
}

/// Resolves once either the caller's token or the stop token fires.
async fn cancelled(
    ctx: &CancellationToken,
    stop: &CancellationToken,
) {
    tokio::select! {
        _ = ctx.cancelled() => {}
        _ = stop.cancelled() => {}
    }
}
