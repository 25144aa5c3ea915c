//! The cached document list shared by every per-row component
//!
//! Rows are keyed by [`DocumentId`], never by position, so re-sorting or
//! filtering the view cannot move state between documents. Only confirmed
//! server responses write here, with the single exception of the
//! optimistic privacy flag.

use crate::backend::VaultBackend;
use docvault_core::{Document, DocumentId, Result, ResultExt};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct DocumentList {
    inner: Arc<RwLock<IndexMap<DocumentId, Document>>>,
}

impl std::fmt::Debug for DocumentList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentList")
            .field("len", &self.len())
            .finish()
    }
}

impl DocumentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let list = Self::new();
        list.replace_all(documents);
        list
    }

    /// Fetch the list from the backend and replace the cache
    pub async fn refresh(&self, backend: &dyn VaultBackend) -> Result<usize> {
        let documents = backend
            .list_documents()
            .await
            .context("refreshing document list")?;
        let count = documents.len();
        self.replace_all(documents);
        tracing::debug!(count, "document list refreshed");
        Ok(count)
    }

    pub fn replace_all(&self, documents: impl IntoIterator<Item = Document>) {
        let mut guard = self.inner.write();
        guard.clear();
        guard.extend(documents.into_iter().map(|doc| (doc.id.clone(), doc)));
    }

    pub fn get(&self, id: &DocumentId) -> Option<Document> {
        self.inner.read().get(id).cloned()
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.inner.read().contains_key(id)
    }

    /// Insert or update a document confirmed by the backend
    pub fn upsert(&self, document: Document) {
        self.inner.write().insert(document.id.clone(), document);
    }

    /// Remove a document, keeping the order of the rest
    pub fn remove(&self, id: &DocumentId) -> Option<Document> {
        self.inner.write().shift_remove(id)
    }

    pub fn is_public(&self, id: &DocumentId) -> Option<bool> {
        self.inner.read().get(id).map(|doc| doc.is_public)
    }

    /// Set the public flag, returning the previous value
    pub fn set_public(&self, id: &DocumentId, is_public: bool) -> Option<bool> {
        self.inner
            .write()
            .get_mut(id)
            .map(|doc| std::mem::replace(&mut doc.is_public, is_public))
    }

    pub fn snapshot(&self) -> Vec<Document> {
        self.inner.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{document, FakeBackend};

    #[test]
    fn test_keyed_by_id_and_ordered() {
        let list = DocumentList::from_documents([
            document("1", false),
            document("2", true),
            document("3", false),
        ]);

        assert_eq!(list.len(), 3);
        assert_eq!(list.remove(&DocumentId::new("2")).map(|d| d.is_public), Some(true));

        let ids: Vec<String> = list.snapshot().into_iter().map(|d| d.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_set_public_returns_previous() {
        let list = DocumentList::from_documents([document("1", false)]);
        let id = DocumentId::new("1");

        assert_eq!(list.set_public(&id, true), Some(false));
        assert_eq!(list.is_public(&id), Some(true));
        assert_eq!(list.set_public(&DocumentId::new("missing"), true), None);
    }

    #[tokio::test]
    async fn test_refresh_replaces_cache() {
        let backend = FakeBackend::new();
        backend.set_documents(vec![document("7", true), document("8", false)]);
        let list = DocumentList::from_documents([document("1", false)]);

        let count = list.refresh(&backend).await.unwrap();

        assert_eq!(count, 2);
        assert!(!list.contains(&DocumentId::new("1")));
        assert_eq!(list.is_public(&DocumentId::new("7")), Some(true));
    }
}
