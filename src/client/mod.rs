//! Entry point for watching documents and queries.
//!
//! - [`WatchClient`] - builds listen targets and snapshot iterators
//! - [`WatchClientBuilder`] - configurable client construction
//!
//! # Basic Usage
//! ```no_run
//! use firestore_watch::WatchClient;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let client = WatchClient::builder("my-project")
//!         .endpoint("http://localhost:8080")
//!         .enable_tls(false)
//!         .build()
//!         .unwrap();
//!
//!     let mut snapshots = client
//!         .document_snapshots("users/alice", CancellationToken::new())
//!         .unwrap();
//!
//!     while let Some(snapshot) = snapshots.next().await.unwrap() {
//!         println!("exists={} at {:?}", snapshot.exists(), snapshot.read_time);
//!     }
//! }
//! ```

mod builder;

pub use builder::*;

#[cfg(test)]
mod client_test;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::constants::WATCH_TARGET_ID;
use crate::proto::target::QueryTarget;
use crate::proto::StructuredQuery;
use crate::proto::Target;
use crate::watch::WatchStream;
use crate::BackoffPolicy;
use crate::DatabasePath;
use crate::DocumentSnapshotIterator;
use crate::GrpcListenTransport;
use crate::ListenTransport;
use crate::QuerySnapshotIterator;
use crate::Result;
use crate::WatchError;
use crate::WatchSettings;

/// Watches documents and queries of one database.
///
/// Cheap to clone; every iterator owns its own listen stream.
#[derive(Clone)]
pub struct WatchClient {
    transport: Arc<dyn ListenTransport>,
    database: DatabasePath,
    backoff: BackoffPolicy,
}

impl WatchClient {
    pub fn new(
        transport: Arc<dyn ListenTransport>,
        database: DatabasePath,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            transport,
            database,
            backoff,
        }
    }

    pub fn builder(project_id: impl Into<String>) -> WatchClientBuilder {
        WatchClientBuilder::new(project_id)
    }

    /// Client over a gRPC channel described by `settings`
    pub fn connect(settings: &WatchSettings) -> Result<Self> {
        let transport = GrpcListenTransport::connect(&settings.connection)?;
        Ok(Self::new(
            Arc::new(transport),
            settings.connection.database(),
            settings.backoff,
        ))
    }

    pub fn database(&self) -> &DatabasePath {
        &self.database
    }

    /// Watches the document at `path`, relative to the documents root
    /// (e.g. `users/alice`).
    ///
    /// The stream is opened lazily by the first `next`. Cancelling `ctx` ends
    /// the watch with [`WatchError::Cancelled`].
    pub fn document_snapshots(
        &self,
        path: &str,
        ctx: CancellationToken,
    ) -> std::result::Result<DocumentSnapshotIterator, WatchError> {
        let name = self.database.document_name(path)?;
        debug!(document = %name, "watching document");

        let target = Target::document(name.clone(), WATCH_TARGET_ID);
        Ok(DocumentSnapshotIterator::new(name, self.stream(target, ctx)))
    }

    /// Watches the results of `query` over the collections below `parent`.
    ///
    /// `parent` is a document path relative to the documents root, or `None`
    /// for the root itself.
    pub fn query_snapshots(
        &self,
        parent: Option<&str>,
        query: StructuredQuery,
        ctx: CancellationToken,
    ) -> std::result::Result<QuerySnapshotIterator, WatchError> {
        let parent = match parent {
            Some(path) => self.database.document_name(path)?,
            None => self.database.documents_root(),
        };
        debug!(%parent, "watching query");

        let target = Target::query(
            QueryTarget {
                parent,
                structured_query: Some(query),
            },
            WATCH_TARGET_ID,
        );
        Ok(QuerySnapshotIterator::new(self.stream(target, ctx)))
    }

    fn stream(
        &self,
        target: Target,
        ctx: CancellationToken,
    ) -> WatchStream {
        WatchStream::new(
            self.transport.clone(),
            target,
            self.database.clone(),
            &self.backoff,
            ctx,
        )
    }
}
