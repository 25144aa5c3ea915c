//! Capability-link issuance

use crate::backend::VaultBackend;
use docvault_config::VaultConfig;
use docvault_core::{DocumentId, Result, ShareLink, ShareOptions};
use std::sync::Arc;
use tracing::instrument;
use url::Url;

/// Requests capability tokens and composes the shareable address.
///
/// Tokens are not cached: every call asks the backend again and may get a
/// different token back. Expiry and view limits are enforced server-side.
#[derive(Clone)]
pub struct ShareLinkService {
    backend: Arc<dyn VaultBackend>,
    origin: Url,
}

impl ShareLinkService {
    pub fn new(backend: Arc<dyn VaultBackend>, origin: Url) -> Self {
        Self { backend, origin }
    }

    pub fn from_config(backend: Arc<dyn VaultBackend>, config: &VaultConfig) -> Self {
        Self::new(backend, config.client_origin.clone())
    }

    /// Mint a link for `document_id`.
    ///
    /// `Error::Forbidden` is returned untouched so callers can show its
    /// message distinctly; other failures arrive as `Error::Service` or
    /// `Error::Network`.
    #[instrument(
        skip(self, options),
        fields(
            document_id = %document_id,
            expiry_days = options.expiry_days.get(),
            max_views = options.max_views.get()
        )
    )]
    pub async fn request_link(
        &self,
        document_id: &DocumentId,
        options: ShareOptions,
    ) -> Result<ShareLink> {
        let token = self.backend.share_document(document_id, &options).await?;
        let link = ShareLink::new(document_id.clone(), token, options, &self.origin)?;
        tracing::info!("share link issued");
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use docvault_core::Error;

    fn service(backend: &Arc<FakeBackend>) -> ShareLinkService {
        let origin = Url::parse("http://localhost:5173").unwrap();
        ShareLinkService::new(backend.clone(), origin)
    }

    #[tokio::test]
    async fn test_request_link_composes_address() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_share_token("tok-1");

        let link = service(&backend)
            .request_link(&DocumentId::new("42"), ShareOptions::default())
            .await
            .unwrap();

        assert_eq!(link.address.as_str(), "http://localhost:5173/shared/tok-1");
        assert_eq!(link.document_id, DocumentId::new("42"));
        assert_eq!(link.created_via, ShareOptions::default());
        assert_eq!(backend.share_calls(), 1);
    }

    #[tokio::test]
    async fn test_each_request_reaches_backend() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_share_token("first");
        backend.push_share_token("second");
        let service = service(&backend);
        let id = DocumentId::new("42");

        let a = service.request_link(&id, ShareOptions::default()).await.unwrap();
        let b = service.request_link(&id, ShareOptions::default()).await.unwrap();

        assert_ne!(a.token, b.token);
        assert_eq!(backend.share_calls(), 2);
    }

    #[tokio::test]
    async fn test_forbidden_passes_through() {
        let backend = Arc::new(FakeBackend::new());
        backend.fail_share(Error::forbidden(
            "share document",
            "You do not have permission to share this document",
        ));

        let err = service(&backend)
            .request_link(&DocumentId::new("42"), ShareOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Forbidden { .. }));
        assert_eq!(err.advisory(), "You do not have permission to share this document");
    }
}
