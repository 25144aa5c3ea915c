//! Seams between the sharing components and the document-store backend

use async_trait::async_trait;
use bytes::Bytes;
use docvault_core::{Document, DocumentId, Result, ShareOptions, ShareToken};

/// A fetched payload with the metadata the response carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedContent {
    pub bytes: Bytes,
    /// `Content-Type` as sent, or `application/octet-stream` when absent
    pub content_type: String,
    /// Filename hint from `Content-Disposition`, if any
    pub filename: Option<String>,
}

/// A file to send to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A new document: the file plus the category it is filed under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file: FilePart,
    pub category: String,
    /// Name to store the document under; the file's own name when absent
    pub filename: Option<String>,
}

/// Changes to a stored document. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentUpdate {
    pub file: Option<FilePart>,
    pub category: Option<String>,
    pub filename: Option<String>,
}

impl DocumentUpdate {
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.category.is_none() && self.filename.is_none()
    }
}

/// Authenticated document operations
#[async_trait]
pub trait VaultBackend: Send + Sync {
    /// List every document the credential can see
    async fn list_documents(&self) -> Result<Vec<Document>>;

    /// Mint a capability token. Each call may return a new token.
    async fn share_document(
        &self,
        document_id: &DocumentId,
        options: &ShareOptions,
    ) -> Result<ShareToken>;

    /// Set the public flag. Only success or failure is meaningful.
    async fn set_privacy(&self, document_id: &DocumentId, is_public: bool) -> Result<()>;

    /// Fetch the bytes for an in-app preview
    async fn view_document(&self, document_id: &DocumentId) -> Result<FetchedContent>;

    /// Fetch the bytes for saving to disk
    async fn download_document(&self, document_id: &DocumentId) -> Result<FetchedContent>;

    /// Delete a document. An already-deleted document counts as success.
    async fn delete_document(&self, document_id: &DocumentId) -> Result<()>;

    /// Store a new document, returning the record the backend created
    async fn upload_document(&self, upload: &DocumentUpload) -> Result<Document>;

    /// Replace a document's file or metadata, returning the updated record
    async fn update_document(
        &self,
        document_id: &DocumentId,
        update: &DocumentUpdate,
    ) -> Result<Document>;
}

/// Anonymous access to a shared document. Possession of the token is the
/// only authorization; implementations never attach a credential.
#[async_trait]
pub trait SharedDocumentSource: Send + Sync {
    async fn fetch_shared(&self, token: &ShareToken) -> Result<FetchedContent>;
}
