//! In-memory fakes for the backend seams

use crate::backend::{
    DocumentUpdate, DocumentUpload, FetchedContent, FilePart, SharedDocumentSource, VaultBackend,
};
use async_trait::async_trait;
use bytes::Bytes;
use docvault_core::{Document, DocumentId, Error, Result, ShareOptions, ShareToken};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

pub(crate) fn document(id: &str, is_public: bool) -> Document {
    Document {
        id: DocumentId::new(id),
        name: format!("document-{id}.pdf"),
        content_type: "application/pdf".to_string(),
        size: 2048,
        category: None,
        uploaded_at: None,
        is_public,
    }
}

pub(crate) fn file(bytes: &'static [u8], content_type: &str, filename: &str) -> FilePart {
    FilePart {
        filename: filename.to_string(),
        content_type: content_type.to_string(),
        bytes: Bytes::from_static(bytes),
    }
}

pub(crate) fn content(
    bytes: &'static [u8],
    content_type: &str,
    filename: Option<&str>,
) -> FetchedContent {
    FetchedContent {
        bytes: Bytes::from_static(bytes),
        content_type: content_type.to_string(),
        filename: filename.map(str::to_string),
    }
}

type Settlement = oneshot::Sender<Result<()>>;

/// Holds privacy requests until the test settles them, in any order
#[derive(Clone, Default)]
pub(crate) struct PrivacyGate {
    pending: Arc<Mutex<Vec<Option<Settlement>>>>,
}

impl PrivacyGate {
    /// Settle the `index`-th privacy request (zero-based, in issue order)
    pub fn release(&self, index: usize, result: Result<()>) {
        let sender = self.pending.lock().get_mut(index).and_then(Option::take);
        if let Some(sender) = sender {
            let _ = sender.send(result);
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    documents: Mutex<Vec<Document>>,
    share_tokens: Mutex<VecDeque<String>>,
    share_failure: Mutex<Option<Error>>,
    share_calls: AtomicUsize,
    share_hold: Mutex<Option<oneshot::Receiver<()>>>,
    privacy_requests: Mutex<Vec<(DocumentId, bool)>>,
    privacy_failure: Mutex<Option<Error>>,
    privacy_gate: Mutex<Option<PrivacyGate>>,
    content: Mutex<Option<FetchedContent>>,
    view_failure: Mutex<Option<Error>>,
    view_calls: AtomicUsize,
    view_hold: Mutex<Option<oneshot::Receiver<()>>>,
    download_failure: Mutex<Option<Error>>,
    download_calls: AtomicUsize,
    delete_failure: Mutex<Option<Error>>,
    delete_calls: AtomicUsize,
    uploads: Mutex<Vec<DocumentUpload>>,
    updates: Mutex<Vec<(DocumentId, DocumentUpdate)>>,
    update_failure: Mutex<Option<Error>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_documents(&self, documents: Vec<Document>) {
        *self.documents.lock() = documents;
    }

    pub fn push_share_token(&self, token: &str) {
        self.share_tokens.lock().push_back(token.to_string());
    }

    pub fn fail_share(&self, error: Error) {
        *self.share_failure.lock() = Some(error);
    }

    /// Park the next share request until the returned sender fires
    pub fn hold_share(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.share_hold.lock() = Some(rx);
        tx
    }

    pub fn share_calls(&self) -> usize {
        self.share_calls.load(Ordering::SeqCst)
    }

    pub fn fail_privacy(&self, error: Error) {
        *self.privacy_failure.lock() = Some(error);
    }

    /// Hold every following privacy request until released through the gate
    pub fn gate_privacy(&self) -> PrivacyGate {
        let gate = PrivacyGate::default();
        *self.privacy_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn privacy_requests(&self) -> Vec<(DocumentId, bool)> {
        self.privacy_requests.lock().clone()
    }

    pub async fn wait_for_privacy_calls(&self, count: usize) {
        while self.privacy_requests.lock().len() < count {
            tokio::task::yield_now().await;
        }
    }

    pub fn set_content(&self, content: FetchedContent) {
        *self.content.lock() = Some(content);
    }

    pub fn fail_view(&self, error: Error) {
        *self.view_failure.lock() = Some(error);
    }

    pub fn hold_view(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.view_hold.lock() = Some(rx);
        tx
    }

    pub fn view_calls(&self) -> usize {
        self.view_calls.load(Ordering::SeqCst)
    }

    pub fn fail_download(&self, error: Error) {
        *self.download_failure.lock() = Some(error);
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub fn fail_delete(&self, error: Error) {
        *self.delete_failure.lock() = Some(error);
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<DocumentUpload> {
        self.uploads.lock().clone()
    }

    pub fn updates(&self) -> Vec<(DocumentId, DocumentUpdate)> {
        self.updates.lock().clone()
    }

    pub fn fail_update(&self, error: Error) {
        *self.update_failure.lock() = Some(error);
    }

    /// Calls that would have reached the network, list excluded
    pub fn network_calls(&self) -> usize {
        self.share_calls()
            + self.privacy_requests.lock().len()
            + self.view_calls()
            + self.download_calls()
            + self.delete_calls()
            + self.uploads.lock().len()
            + self.updates.lock().len()
    }

    fn current_content(&self) -> FetchedContent {
        self.content
            .lock()
            .clone()
            .unwrap_or_else(|| content(b"%PDF-1.7", "application/pdf", None))
    }
}

#[async_trait]
impl VaultBackend for FakeBackend {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.lock().clone())
    }

    async fn share_document(
        &self,
        document_id: &DocumentId,
        _options: &ShareOptions,
    ) -> Result<ShareToken> {
        self.share_calls.fetch_add(1, Ordering::SeqCst);
        let hold = self.share_hold.lock().take();
        if let Some(hold) = hold {
            let _ = hold.await;
        }
        if let Some(error) = self.share_failure.lock().take() {
            return Err(error);
        }
        let token = self
            .share_tokens
            .lock()
            .pop_front()
            .unwrap_or_else(|| format!("token-{document_id}"));
        ShareToken::new(token)
    }

    async fn set_privacy(&self, document_id: &DocumentId, is_public: bool) -> Result<()> {
        let waiter = {
            self.privacy_requests
                .lock()
                .push((document_id.clone(), is_public));
            self.privacy_gate.lock().as_ref().map(|gate| {
                let (tx, rx) = oneshot::channel();
                gate.pending.lock().push(Some(tx));
                rx
            })
        };

        if let Some(rx) = waiter {
            return rx
                .await
                .unwrap_or_else(|_| Err(Error::network("update privacy", "gate dropped")));
        }
        match self.privacy_failure.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn view_document(&self, _document_id: &DocumentId) -> Result<FetchedContent> {
        self.view_calls.fetch_add(1, Ordering::SeqCst);
        let hold = self.view_hold.lock().take();
        if let Some(hold) = hold {
            let _ = hold.await;
        }
        if let Some(error) = self.view_failure.lock().take() {
            return Err(error);
        }
        Ok(self.current_content())
    }

    async fn download_document(&self, _document_id: &DocumentId) -> Result<FetchedContent> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.download_failure.lock().take() {
            return Err(error);
        }
        Ok(self.current_content())
    }

    async fn delete_document(&self, _document_id: &DocumentId) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        match self.delete_failure.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn upload_document(&self, upload: &DocumentUpload) -> Result<Document> {
        let mut uploads = self.uploads.lock();
        uploads.push(upload.clone());
        Ok(Document {
            id: DocumentId::new(format!("new-{}", uploads.len())),
            name: upload
                .filename
                .clone()
                .unwrap_or_else(|| upload.file.filename.clone()),
            content_type: upload.file.content_type.clone(),
            size: upload.file.bytes.len() as u64,
            category: Some(upload.category.clone()),
            uploaded_at: None,
            is_public: false,
        })
    }

    async fn update_document(
        &self,
        document_id: &DocumentId,
        update: &DocumentUpdate,
    ) -> Result<Document> {
        self.updates
            .lock()
            .push((document_id.clone(), update.clone()));
        if let Some(error) = self.update_failure.lock().take() {
            return Err(error);
        }

        let mut updated = self
            .documents
            .lock()
            .iter()
            .find(|doc| &doc.id == document_id)
            .cloned()
            .unwrap_or_else(|| document(document_id.as_str(), false));
        if let Some(category) = &update.category {
            updated.category = Some(category.clone());
        }
        if let Some(filename) = &update.filename {
            updated.name = filename.clone();
        }
        if let Some(file) = &update.file {
            updated.content_type = file.content_type.clone();
            updated.size = file.bytes.len() as u64;
        }
        Ok(updated)
    }
}

/// Anonymous source answering from a queue of canned results
#[derive(Default)]
pub(crate) struct FakeSharedSource {
    responses: Mutex<VecDeque<Result<FetchedContent>>>,
    calls: AtomicUsize,
}

impl FakeSharedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: Result<FetchedContent>) {
        self.responses.lock().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SharedDocumentSource for FakeSharedSource {
    async fn fetch_shared(&self, token: &ShareToken) -> Result<FetchedContent> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::link_expired(token.as_str())))
    }
}
