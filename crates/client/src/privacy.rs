//! Optimistic privacy toggling with compensating revert
//!
//! Every toggle takes the next sequence number for its document. The flip
//! is written to the [`DocumentList`] before the request leaves, and a
//! settlement only touches the list when it belongs to the newest toggle
//! issued for that document. Older settlements are reported as
//! [`ToggleOutcome::Superseded`] and discarded.

use crate::backend::VaultBackend;
use crate::documents::DocumentList;
use docvault_core::{DocumentId, Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// How one toggle settled
#[derive(Debug)]
pub enum ToggleOutcome {
    /// The backend accepted the change; the optimistic value stands
    Committed { is_public: bool },
    /// The backend rejected the change and the flag was put back
    RolledBack { previous: bool, error: Error },
    /// A newer toggle was issued before this one settled; nothing applied
    Superseded { sequence: u64 },
}

impl ToggleOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, ToggleOutcome::Committed { .. })
    }
}

#[derive(Clone)]
pub struct PrivacyReconciler {
    backend: Arc<dyn VaultBackend>,
    documents: DocumentList,
    // Latest sequence issued per document. Never reset, so a late reply can
    // not collide with a later toggle's number.
    sequences: Arc<Mutex<HashMap<DocumentId, u64>>>,
}

impl PrivacyReconciler {
    pub fn new(backend: Arc<dyn VaultBackend>, documents: DocumentList) -> Self {
        Self {
            backend,
            documents,
            sequences: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn documents(&self) -> &DocumentList {
        &self.documents
    }

    /// Newest sequence number issued for a document, zero if never toggled
    pub fn latest_sequence(&self, document_id: &DocumentId) -> u64 {
        self.sequences.lock().get(document_id).copied().unwrap_or(0)
    }

    /// Flip the document's public flag and reconcile with the backend.
    ///
    /// Does not retry. A rejection reverts the flag to the value it had
    /// when this toggle started.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn toggle(&self, document_id: &DocumentId) -> Result<ToggleOutcome> {
        let pending = self.issue(document_id)?;
        Ok(self.settle(pending).await)
    }

    /// Apply the optimistic flip and take the next sequence number
    pub(crate) fn issue(&self, document_id: &DocumentId) -> Result<PendingToggle> {
        let mut sequences = self.sequences.lock();
        let previous = self
            .documents
            .is_public(document_id)
            .ok_or_else(|| Error::document_not_found(document_id))?;
        self.documents.set_public(document_id, !previous);

        let sequence = sequences.entry(document_id.clone()).or_insert(0);
        *sequence += 1;
        tracing::debug!(sequence = *sequence, requested = !previous, "optimistic privacy flip");

        Ok(PendingToggle {
            document_id: document_id.clone(),
            sequence: *sequence,
            previous,
        })
    }

    /// Send the request for an issued toggle and apply its answer if it is
    /// still the newest
    pub(crate) async fn settle(&self, pending: PendingToggle) -> ToggleOutcome {
        let PendingToggle {
            document_id,
            sequence,
            previous,
        } = pending;
        let requested = !previous;

        let result = self.backend.set_privacy(&document_id, requested).await;

        let sequences = self.sequences.lock();
        let latest = sequences.get(&document_id).copied().unwrap_or(0);
        if sequence != latest {
            tracing::debug!(
                sequence,
                latest,
                ok = result.is_ok(),
                "discarding stale privacy settlement"
            );
            return ToggleOutcome::Superseded { sequence };
        }

        match result {
            Ok(()) => {
                self.documents.set_public(&document_id, requested);
                tracing::info!(is_public = requested, "privacy updated");
                ToggleOutcome::Committed {
                    is_public: requested,
                }
            }
            Err(error) => {
                self.documents.set_public(&document_id, previous);
                tracing::warn!(error = %error, previous, "privacy update rejected; reverted");
                ToggleOutcome::RolledBack { previous, error }
            }
        }
    }
}

/// A flip that has been applied locally but not yet answered
#[derive(Debug)]
pub(crate) struct PendingToggle {
    document_id: DocumentId,
    sequence: u64,
    previous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{document, FakeBackend};

    fn setup(is_public: bool) -> (Arc<FakeBackend>, PrivacyReconciler, DocumentId) {
        let backend = Arc::new(FakeBackend::new());
        let documents = DocumentList::from_documents([document("42", is_public)]);
        let reconciler = PrivacyReconciler::new(backend.clone(), documents);
        (backend, reconciler, DocumentId::new("42"))
    }

    #[tokio::test]
    async fn test_commit_keeps_optimistic_value() {
        let (backend, reconciler, id) = setup(false);

        let outcome = reconciler.toggle(&id).await.unwrap();

        assert!(matches!(outcome, ToggleOutcome::Committed { is_public: true }));
        assert_eq!(reconciler.documents().is_public(&id), Some(true));
        assert_eq!(backend.privacy_requests(), vec![(id.clone(), true)]);
    }

    #[tokio::test]
    async fn test_rejection_reverts() {
        let (backend, reconciler, id) = setup(true);
        backend.fail_privacy(Error::service("update privacy", Some(500), "boom"));

        let outcome = reconciler.toggle(&id).await.unwrap();

        match outcome {
            ToggleOutcome::RolledBack { previous, error } => {
                assert!(previous);
                assert_eq!(error.advisory(), "boom");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(reconciler.documents().is_public(&id), Some(true));
    }

    #[tokio::test]
    async fn test_flip_is_visible_before_settlement() {
        let (backend, reconciler, id) = setup(false);
        let gate = backend.gate_privacy();

        let task = tokio::spawn({
            let reconciler = reconciler.clone();
            let id = id.clone();
            async move { reconciler.toggle(&id).await }
        });
        backend.wait_for_privacy_calls(1).await;

        assert_eq!(reconciler.documents().is_public(&id), Some(true));

        gate.release(0, Ok(()));
        assert!(task.await.unwrap().unwrap().is_committed());
    }

    #[tokio::test]
    async fn test_late_settlement_is_discarded() {
        let (backend, reconciler, id) = setup(false);
        let gate = backend.gate_privacy();

        // R1: false -> true, R2: true -> false
        let r1 = tokio::spawn({
            let reconciler = reconciler.clone();
            let id = id.clone();
            async move { reconciler.toggle(&id).await }
        });
        backend.wait_for_privacy_calls(1).await;
        let r2 = tokio::spawn({
            let reconciler = reconciler.clone();
            let id = id.clone();
            async move { reconciler.toggle(&id).await }
        });
        backend.wait_for_privacy_calls(2).await;

        gate.release(1, Ok(()));
        let second = r2.await.unwrap().unwrap();
        assert!(matches!(second, ToggleOutcome::Committed { is_public: false }));

        gate.release(0, Err(Error::service("update privacy", Some(500), "late")));
        let first = r1.await.unwrap().unwrap();
        assert!(matches!(first, ToggleOutcome::Superseded { sequence: 1 }));

        assert_eq!(reconciler.documents().is_public(&id), Some(false));
    }

    #[tokio::test]
    async fn test_last_rejection_restores_value_before_that_toggle() {
        let (backend, reconciler, id) = setup(false);
        let gate = backend.gate_privacy();

        let mut tasks = Vec::new();
        for n in 1..=3 {
            tasks.push(tokio::spawn({
                let reconciler = reconciler.clone();
                let id = id.clone();
                async move { reconciler.toggle(&id).await }
            }));
            backend.wait_for_privacy_calls(n).await;
        }
        // Value before the third toggle was initiated
        let before_last = !reconciler.documents().is_public(&id).unwrap();

        gate.release(0, Ok(()));
        gate.release(2, Err(Error::network("update privacy", "connection reset")));
        gate.release(1, Ok(()));
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(reconciler.documents().is_public(&id), Some(before_last));
        assert_eq!(reconciler.latest_sequence(&id), 3);
    }

    #[tokio::test]
    async fn test_unknown_document() {
        let (backend, reconciler, _) = setup(false);

        let err = reconciler.toggle(&DocumentId::new("nope")).await.unwrap_err();

        assert!(matches!(err, Error::DocumentNotFound { .. }));
        assert!(backend.privacy_requests().is_empty());
    }
}
