//! Target change state machine.
//!
//! Consumes one [`ListenResponse`] at a time and tracks whether the target is
//! current, the read time of the last consistent point and the per-document
//! changes accumulated since the last snapshot. Every error raised here is a
//! protocol violation and therefore permanent.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::time::SystemTime;

use tracing::debug;
use tracing::trace;

use super::backoff::Backoff;
use crate::proto::listen_response::ResponseType;
use crate::proto::target_change::TargetChangeType;
use crate::proto::Document;
use crate::proto::DocumentChange;
use crate::proto::ListenResponse;
use crate::proto::Target;
use crate::proto::TargetChange;
use crate::DatabasePath;
use crate::ProtocolError;
use crate::WatchError;

/// What the driver should do after a message has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Keep reading messages
    Continue,
    /// The accumulated changes form a snapshot worth emitting
    Consistent,
}

/// Pending change for one document: `Some` for added/updated, `None` for gone
pub(crate) type PendingChanges = HashMap<String, Option<Document>>;

#[derive(Debug)]
pub(crate) struct WatchState {
    /// Watched target; carries the resume token presented on reconnect
    target: Target,
    database: DatabasePath,
    /// Saw CURRENT and no RESET since; precondition for a snapshot
    current: bool,
    /// Read time of the most recent consistent point
    read_time: SystemTime,
    pending: PendingChanges,
    has_emitted: bool,
    /// Names present in the last emitted snapshot
    emitted: BTreeSet<String>,
    /// RESET seen since the last snapshot
    resyncing: bool,
}

impl WatchState {
    pub(crate) fn new(
        target: Target,
        database: DatabasePath,
    ) -> Self {
        Self {
            target,
            database,
            current: false,
            read_time: SystemTime::UNIX_EPOCH,
            pending: HashMap::new(),
            has_emitted: false,
            emitted: BTreeSet::new(),
            resyncing: false,
        }
    }

    pub(crate) fn target(&self) -> &Target {
        &self.target
    }

    pub(crate) fn target_id(&self) -> i32 {
        self.target.target_id
    }

    pub(crate) fn database(&self) -> &DatabasePath {
        &self.database
    }

    pub(crate) fn read_time(&self) -> SystemTime {
        self.read_time
    }

    #[cfg(test)]
    pub(crate) fn is_current(&self) -> bool {
        self.current
    }

    #[cfg(test)]
    pub(crate) fn has_emitted(&self) -> bool {
        self.has_emitted
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> &PendingChanges {
        &self.pending
    }

    /// Hands the pending changes to the assembler and records the emission
    pub(crate) fn take_pending(&mut self) -> PendingChanges {
        self.has_emitted = true;
        self.resyncing = false;
        for (name, change) in &self.pending {
            if change.is_some() {
                self.emitted.insert(name.clone());
            } else {
                self.emitted.remove(name);
            }
        }
        std::mem::take(&mut self.pending)
    }

    /// Drops changes that can no longer be trusted after a stream failure
    pub(crate) fn clear_pending(&mut self) {
        self.pending.clear();
        if self.resyncing {
            self.mark_emitted_removed();
        }
    }

    /// Every emitted document counts as gone until the server sends it again
    fn mark_emitted_removed(&mut self) {
        for name in &self.emitted {
            self.pending.insert(name.clone(), None);
        }
    }

    pub(crate) fn handle_response(
        &mut self,
        response: ListenResponse,
        backoff: &mut Backoff,
    ) -> std::result::Result<Step, WatchError> {
        match response.response_type {
            Some(ResponseType::TargetChange(change)) => self.handle_target_change(change, backoff),
            Some(ResponseType::DocumentChange(change)) => {
                self.handle_document_change(change)?;
                Ok(Step::Continue)
            }
            Some(ResponseType::DocumentDelete(delete)) => {
                trace!(target_id = self.target_id(), document = %delete.document, "document deleted");
                self.pending.insert(delete.document, None);
                Ok(Step::Continue)
            }
            Some(ResponseType::DocumentRemove(remove)) => {
                trace!(target_id = self.target_id(), document = %remove.document, "document removed");
                self.pending.insert(remove.document, None);
                Ok(Step::Continue)
            }
            Some(ResponseType::Filter(_)) => Err(ProtocolError::UnsupportedResponse("existence filter").into()),
            None => Err(ProtocolError::UnknownResponse.into()),
        }
    }

    fn handle_document_change(
        &mut self,
        change: DocumentChange,
    ) -> std::result::Result<(), WatchError> {
        let document = change.document.ok_or(ProtocolError::MissingDocument)?;
        let target_id = self.target_id();

        if change.target_ids.contains(&target_id) {
            self.database.relative_path(&document.name)?;
            trace!(target_id, document = %document.name, "document changed");
            self.pending.insert(document.name.clone(), Some(document));
        } else if change.removed_target_ids.contains(&target_id) {
            trace!(target_id, document = %document.name, "document left target");
            self.pending.insert(document.name, None);
        }
        Ok(())
    }

    fn handle_target_change(
        &mut self,
        change: TargetChange,
        backoff: &mut Backoff,
    ) -> std::result::Result<Step, WatchError> {
        let target_id = self.target_id();
        let change_type = TargetChangeType::try_from(change.target_change_type)
            .map_err(|_| ProtocolError::UnknownTargetChange(change.target_change_type))?;
        trace!(target_id, change = change_type.as_str_name(), "target change");

        let step = match change_type {
            TargetChangeType::NoChange => match &change.read_time {
                Some(read_time) if change.target_ids.is_empty() && self.current => {
                    self.read_time = SystemTime::try_from(read_time.clone())
                        .map_err(|e| ProtocolError::InvalidReadTime(e.to_string()))?;
                    // An empty token keeps the stored one; only RESET clears it.
                    if !change.resume_token.is_empty() {
                        self.target.set_resume_token(change.resume_token.clone());
                    }
                    // Only emit when something changed, or nothing was emitted yet.
                    if !self.has_emitted || !self.pending.is_empty() {
                        Step::Consistent
                    } else {
                        Step::Continue
                    }
                }
                _ => Step::Continue,
            },

            TargetChangeType::Add => {
                let acknowledged = change.target_ids.first().copied();
                if acknowledged != Some(target_id) {
                    return Err(ProtocolError::UnexpectedTargetId {
                        expected: target_id,
                        got: acknowledged,
                    }
                    .into());
                }
                if !change.resume_token.is_empty() {
                    self.target.set_resume_token(change.resume_token.clone());
                }
                Step::Continue
            }

            // The sole target of this stream must never be removed.
            TargetChangeType::Remove => {
                let (code, message) = match &change.cause {
                    Some(cause) => (tonic::Code::from_i32(cause.code), cause.message.clone()),
                    None => (tonic::Code::Internal, "internal error (client)".to_string()),
                };
                return Err(ProtocolError::TargetRemoved { code, message }.into());
            }

            TargetChangeType::Current => {
                self.current = true;
                Step::Continue
            }

            TargetChangeType::Reset => {
                debug!(target_id, discarded = self.pending.len(), "target reset");
                self.reset();
                Step::Continue
            }
        };

        // A resume token for this target means the stream is healthy again.
        if !change.resume_token.is_empty() && change.applies_to(target_id) {
            backoff.reset();
        }
        Ok(step)
    }

    fn reset(&mut self) {
        self.target.clear_resume_token();
        self.current = false;
        self.resyncing = true;
        self.pending.clear();
        self.mark_emitted_removed();
    }
}
