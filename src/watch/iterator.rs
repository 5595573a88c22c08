use std::time::SystemTime;

use futures::Stream;
use tokio_util::sync::CancellationToken;

use super::assembler::WatchSnapshot;
use super::stream::WatchStream;
use crate::DocumentSnapshot;
use crate::WatchError;

/// Stops a snapshot iterator from another task.
///
/// Obtained from `stop_handle()` on either iterator. Stopping is idempotent.
#[derive(Debug, Clone)]
pub struct WatchStopHandle {
    token: CancellationToken,
}

impl WatchStopHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// State of a single document as of `read_time`
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWatchSnapshot {
    /// Full resource name of the watched document
    pub name: String,
    pub read_time: SystemTime,
    /// `None` while the document does not exist
    pub document: Option<DocumentSnapshot>,
}

impl DocumentWatchSnapshot {
    pub fn exists(&self) -> bool {
        self.document.is_some()
    }
}

/// Pulls the next snapshot, turning a stop into the end of iteration.
async fn pull(stream: &mut WatchStream) -> std::result::Result<Option<WatchSnapshot>, WatchError> {
    if stream.stop_requested() {
        stream.shutdown().await;
        return Ok(None);
    }
    match stream.next_snapshot().await {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(_) if stream.stop_requested() => Ok(None),
        Err(WatchError::Stopped) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Successive snapshots of one document.
///
/// The first call to [`next`](Self::next) yields the current state of the
/// document, including when it does not exist. Later calls block until the
/// document changes.
pub struct DocumentSnapshotIterator {
    name: String,
    stream: WatchStream,
    read_time: Option<SystemTime>,
}

impl DocumentSnapshotIterator {
    pub(crate) fn new(
        name: String,
        stream: WatchStream,
    ) -> Self {
        Self {
            name,
            stream,
            read_time: None,
        }
    }

    /// Full resource name of the watched document
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next snapshot, or `Ok(None)` once [`stop`](Self::stop) was called.
    ///
    /// # Errors
    /// The first error is final: it is returned again on every later call.
    pub async fn next(&mut self) -> std::result::Result<Option<DocumentWatchSnapshot>, WatchError> {
        let Some(snapshot) = pull(&mut self.stream).await? else {
            return Ok(None);
        };
        self.read_time = Some(snapshot.read_time);

        let document = snapshot.documents.into_iter().find(|doc| doc.name == self.name);
        Ok(Some(DocumentWatchSnapshot {
            name: self.name.clone(),
            read_time: snapshot.read_time,
            document,
        }))
    }

    /// Ends the watch. A blocked `next` returns `Ok(None)` promptly.
    pub fn stop(&self) {
        self.stream.stop_token().cancel();
    }

    pub fn stop_handle(&self) -> WatchStopHandle {
        WatchStopHandle {
            token: self.stream.stop_token(),
        }
    }

    /// Read time of the last snapshot returned by `next`
    pub fn read_time(&self) -> Option<SystemTime> {
        self.read_time
    }

    pub fn into_stream(self) -> impl Stream<Item = std::result::Result<DocumentWatchSnapshot, WatchError>> + Send {
        futures::stream::unfold(Some(self), |iter| async move {
            let mut iter = iter?;
            match iter.next().await {
                Ok(Some(snapshot)) => Some((Ok(snapshot), Some(iter))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

/// Result set of a query as of `read_time`, ordered by document name
pub type QuerySnapshot = WatchSnapshot;

/// Successive result sets of a query
pub struct QuerySnapshotIterator {
    stream: WatchStream,
    read_time: Option<SystemTime>,
}

impl QuerySnapshotIterator {
    pub(crate) fn new(stream: WatchStream) -> Self {
        Self { stream, read_time: None }
    }

    /// Next result set, or `Ok(None)` once [`stop`](Self::stop) was called.
    ///
    /// # Errors
    /// The first error is final: it is returned again on every later call.
    pub async fn next(&mut self) -> std::result::Result<Option<QuerySnapshot>, WatchError> {
        let snapshot = pull(&mut self.stream).await?;
        if let Some(snapshot) = &snapshot {
            self.read_time = Some(snapshot.read_time);
        }
        Ok(snapshot)
    }

    pub fn stop(&self) {
        self.stream.stop_token().cancel();
    }

    pub fn stop_handle(&self) -> WatchStopHandle {
        WatchStopHandle {
            token: self.stream.stop_token(),
        }
    }

    pub fn read_time(&self) -> Option<SystemTime> {
        self.read_time
    }

    pub fn into_stream(self) -> impl Stream<Item = std::result::Result<QuerySnapshot, WatchError>> + Send {
        futures::stream::unfold(Some(self), |iter| async move {
            let mut iter = iter?;
            match iter.next().await {
                Ok(Some(snapshot)) => Some((Ok(snapshot), Some(iter))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}
