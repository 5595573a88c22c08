use std::collections::BTreeMap;
use std::time::SystemTime;

use tracing::debug;

use super::state::WatchState;
use crate::DocumentSnapshot;
use crate::WatchError;

/// A consistent view of the watched target as of `read_time`
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSnapshot {
    pub read_time: SystemTime,
    /// Every document currently matching the target, ordered by name
    pub documents: Vec<DocumentSnapshot>,
}

impl WatchSnapshot {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document with the given full resource name
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&DocumentSnapshot> {
        self.documents
            .binary_search_by(|doc| doc.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.documents[i])
    }
}

/// Folds pending changes into the document set of the previous snapshot.
///
/// Documents are decoded here, never while messages are being consumed.
#[derive(Debug, Default)]
pub(crate) struct SnapshotAssembler {
    documents: BTreeMap<String, DocumentSnapshot>,
}

impl SnapshotAssembler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Applies the pending changes of `state`, clears them and marks a
    /// snapshot as emitted.
    pub(crate) fn assemble(
        &mut self,
        state: &mut WatchState,
    ) -> std::result::Result<WatchSnapshot, WatchError> {
        let read_time = state.read_time();
        let database = state.database().clone();
        let pending = state.take_pending();
        let changed = pending.len();

        for (name, change) in pending {
            match change {
                Some(document) => {
                    let snapshot = DocumentSnapshot::from_proto(document, &database)?;
                    self.documents.insert(name, snapshot);
                }
                None => {
                    self.documents.remove(&name);
                }
            }
        }

        debug!(
            target_id = state.target_id(),
            changed,
            size = self.documents.len(),
            "snapshot assembled"
        );
        Ok(WatchSnapshot {
            read_time,
            documents: self.documents.values().cloned().collect(),
        })
    }
}
