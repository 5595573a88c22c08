use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use tonic::async_trait;
use tonic::Status;

use crate::proto::ListenResponse;
use crate::proto::Target;
use crate::ListenConnection;
use crate::ListenTransport;

pub(crate) type Script = Vec<std::result::Result<ListenResponse, Status>>;

enum Connection {
    /// Replays the script, then ends cleanly
    Ending(Script),
    /// Replays the script, then blocks forever
    Hanging(Script),
    FailedOpen(Status),
}

/// Replays one prepared script per opened stream.
///
/// Streams opened after every script has been used block forever.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    connections: Arc<Mutex<VecDeque<Connection>>>,
    opened: Arc<Mutex<Vec<Target>>>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Next stream replays `script` and then reports a clean end of stream
    pub(crate) fn stream(
        self,
        script: Script,
    ) -> Self {
        self.push(Connection::Ending(script))
    }

    /// Next stream replays `script` and then stays silent
    pub(crate) fn hanging_stream(
        self,
        script: Script,
    ) -> Self {
        self.push(Connection::Hanging(script))
    }

    /// Next open fails with `status`
    pub(crate) fn failed_open(
        self,
        status: Status,
    ) -> Self {
        self.push(Connection::FailedOpen(status))
    }

    fn push(
        self,
        connection: Connection,
    ) -> Self {
        self.connections.lock().unwrap().push_back(connection);
        self
    }

    /// Targets as presented on each open, in order
    pub(crate) fn opened_targets(&self) -> Vec<Target> {
        self.opened.lock().unwrap().clone()
    }

    pub(crate) fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub(crate) fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListenTransport for ScriptedTransport {
    async fn open(
        &self,
        target: &Target,
    ) -> std::result::Result<Box<dyn ListenConnection>, Status> {
        self.opened.lock().unwrap().push(target.clone());
        let next = self.connections.lock().unwrap().pop_front();
        let (responses, hang) = match next {
            Some(Connection::Ending(script)) => (script, false),
            Some(Connection::Hanging(script)) => (script, true),
            Some(Connection::FailedOpen(status)) => return Err(status),
            None => (Vec::new(), true),
        };
        Ok(Box::new(ScriptedConnection {
            responses: responses.into(),
            hang,
            closed: self.closed.clone(),
        }))
    }
}

pub(crate) struct ScriptedConnection {
    responses: VecDeque<std::result::Result<ListenResponse, Status>>,
    hang: bool,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl ListenConnection for ScriptedConnection {
    async fn receive(&mut self) -> std::result::Result<Option<ListenResponse>, Status> {
        match self.responses.pop_front() {
            Some(Ok(response)) => Ok(Some(response)),
            Some(Err(status)) => Err(status),
            None if self.hang => std::future::pending().await,
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> std::result::Result<(), Status> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
