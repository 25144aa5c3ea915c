//! Anonymous viewer for capability links
//!
//! A [`SharedViewerFetcher`] is bound to one token. It starts in
//! [`ViewerState::Loading`] and settles exactly once into a terminal state.
//! A failed fetch is not retried; a new fetcher is needed for another
//! attempt.

use crate::backend::SharedDocumentSource;
use bytes::Bytes;
use docvault_config::VaultConfig;
use docvault_core::{
    constants::{
        NETWORK_ERROR_MESSAGE, SHARED_DOCUMENT_FALLBACK_NAME, SHARED_FETCH_FAILED_MESSAGE,
        SHARED_NOT_FOUND_MESSAGE,
    },
    file_type_label, safe_file_name, ContentKind, Error, RenderMode, Result, ShareToken,
};
use docvault_utils::{format_file_size, BlobAddress, BlobLease, BlobManager};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Not found: expired, out of views, or revoked
    LinkExpiredOrInvalid,
    FetchFailed,
}

#[derive(Debug)]
pub struct ViewerFailure {
    pub kind: FailureKind,
    pub error: Error,
}

impl ViewerFailure {
    fn from_error(error: Error) -> Self {
        let kind = match error.root() {
            Error::LinkExpiredOrInvalid { .. } => FailureKind::LinkExpiredOrInvalid,
            _ => FailureKind::FetchFailed,
        };
        Self { kind, error }
    }

    pub fn message(&self) -> &'static str {
        match self.kind {
            FailureKind::LinkExpiredOrInvalid => SHARED_NOT_FOUND_MESSAGE,
            FailureKind::FetchFailed if self.error.is_transient() => NETWORK_ERROR_MESSAGE,
            FailureKind::FetchFailed => SHARED_FETCH_FAILED_MESSAGE,
        }
    }

    pub fn hint(&self) -> &'static str {
        match self.kind {
            FailureKind::LinkExpiredOrInvalid => {
                "The link may have expired, reached its view limit, or been revoked."
            }
            FailureKind::FetchFailed => "Reload the page to try again.",
        }
    }
}

/// A fetched shared document held in a blob lease
#[derive(Debug)]
pub struct SharedDocument {
    lease: BlobLease,
    pub content_type: String,
    pub kind: ContentKind,
    pub filename: Option<String>,
    pub size: usize,
}

impl SharedDocument {
    pub fn render_mode(&self) -> RenderMode {
        self.kind.render_mode()
    }

    /// Local address for the embedded frame or the download action
    pub fn address(&self) -> &BlobAddress {
        self.lease.address()
    }

    pub fn lease(&self) -> &BlobLease {
        &self.lease
    }

    /// `None` once the retention window has passed
    pub fn bytes(&self) -> Option<Bytes> {
        self.lease.bytes()
    }

    /// Literal text for plain-text content; `None` for every other mode
    pub fn text(&self) -> Option<String> {
        if self.render_mode() != RenderMode::LiteralText {
            return None;
        }
        self.bytes()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn display_name(&self) -> &str {
        self.filename
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(SHARED_DOCUMENT_FALLBACK_NAME)
    }

    pub fn size_label(&self) -> String {
        format_file_size(self.size as u64)
    }

    pub fn type_label(&self) -> String {
        file_type_label(&self.content_type)
    }
}

#[derive(Debug)]
pub enum ViewerState {
    Loading,
    /// Image, PDF, or plain text
    Displayed(SharedDocument),
    /// Fetched but not previewable; offer the download instead
    Unavailable(SharedDocument),
    Errored(ViewerFailure),
}

impl ViewerState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ViewerState::Loading)
    }

    pub fn document(&self) -> Option<&SharedDocument> {
        match self {
            ViewerState::Displayed(doc) | ViewerState::Unavailable(doc) => Some(doc),
            _ => None,
        }
    }
}

pub struct SharedViewerFetcher {
    source: Arc<dyn SharedDocumentSource>,
    blobs: BlobManager,
    retention: Duration,
    token: ShareToken,
    state: ViewerState,
}

impl std::fmt::Debug for SharedViewerFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedViewerFetcher")
            .field("blobs", &self.blobs)
            .field("retention", &self.retention)
            .field("token", &self.token)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SharedViewerFetcher {
    pub fn new(
        source: Arc<dyn SharedDocumentSource>,
        blobs: BlobManager,
        retention: Duration,
        token: ShareToken,
    ) -> Self {
        Self {
            source,
            blobs,
            retention,
            token,
            state: ViewerState::Loading,
        }
    }

    /// Bind to the token in a `<origin>/shared/<token>` address or a bare token
    pub fn from_address(
        source: Arc<dyn SharedDocumentSource>,
        blobs: BlobManager,
        config: &VaultConfig,
        address: &str,
    ) -> Result<Self> {
        let token = ShareToken::from_address(address)?;
        Ok(Self::new(source, blobs, config.shared_blob_ttl, token))
    }

    pub fn token(&self) -> &ShareToken {
        &self.token
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Fetch and classify. Once settled, further calls return the same state
    /// without touching the network.
    #[instrument(skip(self), fields(token = ?self.token))]
    pub async fn load(&mut self) -> &ViewerState {
        if self.state.is_terminal() {
            return &self.state;
        }

        self.state = match self.source.fetch_shared(&self.token).await {
            Ok(content) => {
                let kind = ContentKind::classify(&content.content_type);
                let size = content.bytes.len();
                let lease = self
                    .blobs
                    .lease(content.bytes, content.content_type.clone(), self.retention);
                let document = SharedDocument {
                    lease,
                    content_type: content.content_type,
                    kind,
                    filename: content.filename.as_deref().and_then(safe_file_name),
                    size,
                };
                tracing::info!(?kind, size, "shared document loaded");
                if kind.is_displayable() {
                    ViewerState::Displayed(document)
                } else {
                    ViewerState::Unavailable(document)
                }
            }
            Err(error) => {
                let failure = ViewerFailure::from_error(error);
                tracing::warn!(
                    kind = ?failure.kind,
                    error = %failure.error,
                    "shared document fetch failed"
                );
                ViewerState::Errored(failure)
            }
        };
        &self.state
    }

    /// Split off a fetch failure, keeping the viewer for every other state
    pub fn into_result(self) -> std::result::Result<Self, ViewerFailure> {
        match self.state {
            ViewerState::Errored(failure) => Err(failure),
            state => Ok(Self { state, ..self }),
        }
    }

    /// Leave the viewer, releasing the blob now if the timer has not
    pub fn teardown(self) -> bool {
        match self.state {
            ViewerState::Displayed(doc) | ViewerState::Unavailable(doc) => doc.lease.release(),
            _ => false,
        }
    }
}
