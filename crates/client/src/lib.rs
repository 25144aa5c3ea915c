//! Document sharing and access negotiation for the docvault client.
//!
//! ## Key Components
//!
//! - **`share`**: [`ShareLinkService`] mints capability links for a document.
//! - **`privacy`**: [`PrivacyReconciler`] flips a document's public flag
//!   optimistically and reconciles it with the backend's answer.
//! - **`menu`**: [`ActionMenuController`] gates the per-document actions and
//!   their busy states, and applies confirmed uploads and edits to the
//!   [`DocumentList`].
//! - **`viewer`**: [`SharedViewerFetcher`] resolves a capability token to
//!   content for an anonymous viewer and picks a rendering mode.
//! - **`http`**: reqwest implementations of the [`VaultBackend`] and
//!   [`SharedDocumentSource`] seams.
//!
//! Blob handles come from [`docvault_utils::BlobManager`].

pub mod backend;
pub mod credentials;
pub mod documents;
pub mod http;
pub mod menu;
pub mod privacy;
pub mod share;
pub mod viewer;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{
    DocumentUpdate, DocumentUpload, FetchedContent, FilePart, SharedDocumentSource, VaultBackend,
};
pub use credentials::{CredentialProvider, EnvCredential, StaticCredential};
pub use documents::DocumentList;
pub use http::{AnonymousShareClient, HttpVaultClient};
pub use menu::{
    ActionMenuController, ActionMenuState, Busy, DeleteOutcome, DownloadedFile, MenuAction,
    ViewOutcome,
};
pub use privacy::{PrivacyReconciler, ToggleOutcome};
pub use share::ShareLinkService;
pub use viewer::{FailureKind, SharedDocument, SharedViewerFetcher, ViewerFailure, ViewerState};
