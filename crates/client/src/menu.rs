//! Per-document action menu
//!
//! State lives in a map keyed by [`DocumentId`]. A document with no entry
//! is closed and idle. At most one busy state is active per document, and
//! an action that is not enabled is refused before any network call is
//! made.

use crate::backend::{DocumentUpdate, DocumentUpload, VaultBackend};
use crate::documents::DocumentList;
use crate::privacy::{PrivacyReconciler, ToggleOutcome};
use crate::share::ShareLinkService;
use bytes::Bytes;
use docvault_config::VaultConfig;
use docvault_core::{safe_file_name, Document, DocumentId, Error, Result, ShareLink, ShareOptions};
use docvault_utils::{BlobLease, BlobManager};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// The network operation a menu is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Busy {
    #[default]
    None,
    Viewing,
    GeneratingLink,
    Deleting,
}

impl fmt::Display for Busy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Busy::None => "idle",
            Busy::Viewing => "viewing",
            Busy::GeneratingLink => "generating link",
            Busy::Deleting => "deleting",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    View,
    Edit,
    Download,
    Share,
    Delete,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::View => "view",
            MenuAction::Edit => "edit",
            MenuAction::Download => "download",
            MenuAction::Share => "share",
            MenuAction::Delete => "delete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionMenuState {
    pub open: bool,
    pub busy: Busy,
}

impl ActionMenuState {
    pub const CLOSED: Self = Self {
        open: false,
        busy: Busy::None,
    };

    /// Dismissal is refused while a link or a delete is outstanding
    pub fn can_dismiss(&self) -> bool {
        !matches!(self.busy, Busy::GeneratingLink | Busy::Deleting)
    }
}

/// Result of a view request. Failures degrade to an advisory.
#[derive(Debug)]
pub enum ViewOutcome {
    Opened(BlobLease),
    Advisory { message: String, error: Error },
}

#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted(Document),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Clone)]
pub struct ActionMenuController {
    backend: Arc<dyn VaultBackend>,
    documents: DocumentList,
    share: ShareLinkService,
    privacy: PrivacyReconciler,
    blobs: BlobManager,
    preview_ttl: Duration,
    share_defaults: ShareOptions,
    states: Arc<Mutex<HashMap<DocumentId, ActionMenuState>>>,
}

impl ActionMenuController {
    pub fn new(
        backend: Arc<dyn VaultBackend>,
        documents: DocumentList,
        blobs: BlobManager,
        config: &VaultConfig,
    ) -> Self {
        Self {
            share: ShareLinkService::from_config(backend.clone(), config),
            privacy: PrivacyReconciler::new(backend.clone(), documents.clone()),
            backend,
            documents,
            blobs,
            preview_ttl: config.preview_blob_ttl,
            share_defaults: config.share_defaults,
            states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn documents(&self) -> &DocumentList {
        &self.documents
    }

    pub fn state(&self, document_id: &DocumentId) -> ActionMenuState {
        self.states
            .lock()
            .get(document_id)
            .copied()
            .unwrap_or(ActionMenuState::CLOSED)
    }

    pub fn open(&self, document_id: &DocumentId) -> Result<()> {
        if !self.documents.contains(document_id) {
            return Err(Error::document_not_found(document_id));
        }
        self.states
            .lock()
            .entry(document_id.clone())
            .or_default()
            .open = true;
        Ok(())
    }

    /// Close the menu on outside-click or explicit dismiss.
    ///
    /// A pending view does not hold the menu open; its busy state clears
    /// when the fetch settles.
    pub fn dismiss(&self, document_id: &DocumentId) -> Result<()> {
        let mut states = self.states.lock();
        let Some(state) = states.get_mut(document_id) else {
            return Ok(());
        };
        if !state.can_dismiss() {
            return Err(Error::ActionBusy {
                document_id: document_id.to_string(),
                busy: state.busy.to_string(),
            });
        }
        state.open = false;
        if state.busy == Busy::None {
            states.remove(document_id);
        }
        Ok(())
    }

    /// Whether `action` may be triggered right now
    pub fn is_enabled(&self, document_id: &DocumentId, action: MenuAction) -> bool {
        self.check_enabled(document_id, action).is_ok()
    }

    fn check_enabled(&self, document_id: &DocumentId, action: MenuAction) -> Result<Document> {
        let states = self.states.lock();
        self.gate(&states, document_id, action)
    }

    // Check and enter the busy state under one lock so a second trigger
    // sees the first.
    fn begin(
        &self,
        document_id: &DocumentId,
        action: MenuAction,
        busy: Busy,
        after: AfterBusy,
    ) -> Result<(Document, BusyGuard<'_>)> {
        let mut states = self.states.lock();
        let document = self.gate(&states, document_id, action)?;
        states.insert(document_id.clone(), ActionMenuState { open: true, busy });
        let guard = BusyGuard {
            states: &self.states,
            document_id: document_id.clone(),
            after,
        };
        Ok((document, guard))
    }

    fn gate(
        &self,
        states: &HashMap<DocumentId, ActionMenuState>,
        document_id: &DocumentId,
        action: MenuAction,
    ) -> Result<Document> {
        let document = self
            .documents
            .get(document_id)
            .ok_or_else(|| Error::document_not_found(document_id))?;
        if action == MenuAction::Share && !document.is_public {
            return Err(Error::ShareRequiresPublic {
                document_id: document_id.to_string(),
            });
        }

        let state = states
            .get(document_id)
            .copied()
            .unwrap_or(ActionMenuState::CLOSED);
        if state.busy != Busy::None {
            return Err(Error::ActionBusy {
                document_id: document_id.to_string(),
                busy: state.busy.to_string(),
            });
        }
        if !state.open {
            return Err(Error::ActionUnavailable {
                document_id: document_id.to_string(),
                action: action.to_string(),
                reason: "menu is closed".to_string(),
            });
        }
        Ok(document)
    }

    fn close(&self, document_id: &DocumentId) {
        self.states.lock().remove(document_id);
    }

    /// Fetch the document for in-app preview.
    ///
    /// The blob lives for the preview window and is reclaimed earlier if the
    /// lease is dropped. The menu closes once the fetch settles.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn view(&self, document_id: &DocumentId) -> Result<ViewOutcome> {
        let (_, _busy) =
            self.begin(document_id, MenuAction::View, Busy::Viewing, AfterBusy::Close)?;

        let outcome = match self.backend.view_document(document_id).await {
            Ok(content) => ViewOutcome::Opened(self.blobs.lease(
                content.bytes,
                content.content_type,
                self.preview_ttl,
            )),
            Err(error) => {
                tracing::warn!(error = %error, "view failed");
                ViewOutcome::Advisory {
                    message: error.advisory(),
                    error,
                }
            }
        };
        Ok(outcome)
    }

    /// Mint a share link. Refused locally for private documents.
    #[instrument(skip(self, options), fields(document_id = %document_id))]
    pub async fn share(
        &self,
        document_id: &DocumentId,
        options: Option<ShareOptions>,
    ) -> Result<ShareLink> {
        let (_, _busy) = self.begin(
            document_id,
            MenuAction::Share,
            Busy::GeneratingLink,
            AfterBusy::Close,
        )?;

        let options = options.unwrap_or(self.share_defaults);
        self.share.request_link(document_id, options).await
    }

    /// Delete after `confirm` approves. A refusal leaves the menu open and idle.
    #[instrument(skip(self, confirm), fields(document_id = %document_id))]
    pub async fn delete<F>(&self, document_id: &DocumentId, confirm: F) -> Result<DeleteOutcome>
    where
        F: FnOnce(&Document) -> bool,
    {
        let document = self.check_enabled(document_id, MenuAction::Delete)?;
        if !confirm(&document) {
            tracing::debug!("delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        let (document, mut busy) =
            self.begin(document_id, MenuAction::Delete, Busy::Deleting, AfterBusy::Idle)?;
        match self.backend.delete_document(document_id).await {
            Ok(()) => {
                self.documents.remove(document_id);
                busy.after = AfterBusy::Close;
                tracing::info!("document deleted");
                Ok(DeleteOutcome::Deleted(document))
            }
            Err(error) => {
                tracing::warn!(error = %error, "delete failed");
                Err(error)
            }
        }
    }

    /// Download the document. The menu closes as the download starts.
    ///
    /// The filename comes from the response, then the document name, then
    /// `document-<id>`.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn download(&self, document_id: &DocumentId) -> Result<DownloadedFile> {
        let document = self.check_enabled(document_id, MenuAction::Download)?;
        self.close(document_id);

        let content = self.backend.download_document(document_id).await?;
        let filename = content
            .filename
            .as_deref()
            .and_then(safe_file_name)
            .or_else(|| safe_file_name(&document.name))
            .unwrap_or_else(|| format!("document-{document_id}"));

        Ok(DownloadedFile {
            filename,
            content_type: content.content_type,
            bytes: content.bytes,
        })
    }

    /// Hand the document to the editor and close the menu
    pub fn edit(&self, document_id: &DocumentId) -> Result<Document> {
        let document = self.check_enabled(document_id, MenuAction::Edit)?;
        self.close(document_id);
        Ok(document)
    }

    /// Submit an edit. The confirmed record replaces the cached one.
    ///
    /// Refused while the document is being deleted.
    #[instrument(skip(self, update), fields(document_id = %document_id))]
    pub async fn save_edit(
        &self,
        document_id: &DocumentId,
        update: DocumentUpdate,
    ) -> Result<Document> {
        if !self.documents.contains(document_id) {
            return Err(Error::document_not_found(document_id));
        }
        self.refuse_while(document_id, &[Busy::Deleting])?;
        if update.is_empty() {
            return Err(Error::ActionUnavailable {
                document_id: document_id.to_string(),
                action: MenuAction::Edit.to_string(),
                reason: "nothing to change".to_string(),
            });
        }

        let document = self.backend.update_document(document_id, &update).await?;
        if &document.id != document_id {
            tracing::warn!(returned = %document.id, "update answered for a different document");
        }
        self.documents.upsert(document.clone());
        tracing::info!("document updated");
        Ok(document)
    }

    /// Store a new document and add the confirmed record to the list
    #[instrument(skip_all, fields(filename = %upload.file.filename))]
    pub async fn upload(&self, upload: DocumentUpload) -> Result<Document> {
        let document = self.backend.upload_document(&upload).await?;
        self.documents.upsert(document.clone());
        tracing::info!(document_id = %document.id, "document uploaded");
        Ok(document)
    }

    /// Flip the document's public flag.
    ///
    /// Refused while a link is being minted or the document deleted, so a
    /// link is never issued for a document that has just gone private.
    pub async fn toggle_privacy(&self, document_id: &DocumentId) -> Result<ToggleOutcome> {
        let pending = {
            let states = self.states.lock();
            Self::refuse_busy(&states, document_id, &[Busy::GeneratingLink, Busy::Deleting])?;
            self.privacy.issue(document_id)?
        };
        Ok(self.privacy.settle(pending).await)
    }

    fn refuse_while(&self, document_id: &DocumentId, blocking: &[Busy]) -> Result<()> {
        Self::refuse_busy(&self.states.lock(), document_id, blocking)
    }

    fn refuse_busy(
        states: &HashMap<DocumentId, ActionMenuState>,
        document_id: &DocumentId,
        blocking: &[Busy],
    ) -> Result<()> {
        match states.get(document_id) {
            Some(state) if blocking.contains(&state.busy) => Err(Error::ActionBusy {
                document_id: document_id.to_string(),
                busy: state.busy.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Where a row lands once its busy state ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterBusy {
    Close,
    Idle,
}

/// Holds a row's busy marker. Dropping it, including when the action's
/// future is dropped mid-flight, clears the marker.
struct BusyGuard<'a> {
    states: &'a Mutex<HashMap<DocumentId, ActionMenuState>>,
    document_id: DocumentId,
    after: AfterBusy,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut states = self.states.lock();
        match self.after {
            AfterBusy::Close => {
                states.remove(&self.document_id);
            }
            AfterBusy::Idle => {
                states.insert(
                    self.document_id.clone(),
                    ActionMenuState {
                        open: true,
                        busy: Busy::None,
                    },
                );
            }
        }
    }
}
