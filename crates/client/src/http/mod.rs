//! HTTP implementations of the backend seams
//!
//! [`HttpVaultClient`] attaches the bearer credential to every call.
//! [`AnonymousShareClient`] has no credential provider at all, so the
//! shared-document path cannot leak one even by accident.

mod transport;

use crate::backend::{
    DocumentUpdate, DocumentUpload, FetchedContent, FilePart, SharedDocumentSource, VaultBackend,
};
use crate::credentials::CredentialProvider;
use async_trait::async_trait;
use docvault_config::VaultConfig;
use docvault_core::{
    constants::{
        DELETE_FAILED_MESSAGE, DELETE_FORBIDDEN_MESSAGE, DOWNLOAD_FAILED_MESSAGE,
        DOWNLOAD_FORBIDDEN_MESSAGE, LIST_FAILED_MESSAGE, LIST_FORBIDDEN_MESSAGE,
        PRIVACY_FAILED_MESSAGE, PRIVACY_FORBIDDEN_MESSAGE, SHARED_FETCH_FAILED_MESSAGE,
        SHARED_FORBIDDEN_MESSAGE, SHARE_FAILED_MESSAGE, SHARE_FORBIDDEN_MESSAGE,
        UPDATE_FAILED_MESSAGE, UPDATE_FORBIDDEN_MESSAGE, UPLOAD_FAILED_MESSAGE,
        UPLOAD_FORBIDDEN_MESSAGE, VIEW_FAILED_MESSAGE, VIEW_FORBIDDEN_MESSAGE,
    },
    Document, DocumentId, Error, Result, ShareOptions, ShareToken,
};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use transport::{check, read_content, HttpTransport, Operation};

const LIST: Operation = Operation {
    name: "list documents",
    forbidden: LIST_FORBIDDEN_MESSAGE,
    fallback: LIST_FAILED_MESSAGE,
};
const SHARE: Operation = Operation {
    name: "share document",
    forbidden: SHARE_FORBIDDEN_MESSAGE,
    fallback: SHARE_FAILED_MESSAGE,
};
const PRIVACY: Operation = Operation {
    name: "update privacy",
    forbidden: PRIVACY_FORBIDDEN_MESSAGE,
    fallback: PRIVACY_FAILED_MESSAGE,
};
const VIEW: Operation = Operation {
    name: "view document",
    forbidden: VIEW_FORBIDDEN_MESSAGE,
    fallback: VIEW_FAILED_MESSAGE,
};
const DOWNLOAD: Operation = Operation {
    name: "download document",
    forbidden: DOWNLOAD_FORBIDDEN_MESSAGE,
    fallback: DOWNLOAD_FAILED_MESSAGE,
};
const DELETE: Operation = Operation {
    name: "delete document",
    forbidden: DELETE_FORBIDDEN_MESSAGE,
    fallback: DELETE_FAILED_MESSAGE,
};
const UPLOAD: Operation = Operation {
    name: "upload document",
    forbidden: UPLOAD_FORBIDDEN_MESSAGE,
    fallback: UPLOAD_FAILED_MESSAGE,
};
const UPDATE: Operation = Operation {
    name: "update document",
    forbidden: UPDATE_FORBIDDEN_MESSAGE,
    fallback: UPDATE_FAILED_MESSAGE,
};
const SHARED_FETCH: Operation = Operation {
    name: "open shared document",
    forbidden: SHARED_FORBIDDEN_MESSAGE,
    fallback: SHARED_FETCH_FAILED_MESSAGE,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareRequest<'a> {
    document_id: &'a str,
    is_public: bool,
    expiry_days: u32,
    max_views: u32,
}

#[derive(Deserialize)]
struct ShareResponse {
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrivacyRequest {
    is_public: bool,
}

/// Authenticated reqwest client for the document-store API
#[derive(Clone)]
pub struct HttpVaultClient {
    transport: HttpTransport,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpVaultClient {
    pub fn new(config: &VaultConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
            credentials,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.bearer_token() {
            Some(token) => request.bearer_auth(token.as_str()),
            None => {
                tracing::debug!("no credential available; sending request unauthenticated");
                request
            }
        }
    }

    async fn fetch_bytes(
        &self,
        segments: &[&str],
        operation: Operation,
    ) -> Result<FetchedContent> {
        let url = self.transport.endpoint(segments)?;
        let request = self.authorize(self.transport.client().get(url));
        let response = self.transport.send(request, operation).await?;
        let response = check(response, operation).await?;
        read_content(response, operation).await
    }
}

#[async_trait]
impl VaultBackend for HttpVaultClient {
    #[instrument(skip(self))]
    async fn list_documents(&self) -> Result<Vec<Document>> {
        let url = self.transport.endpoint(&["documents"])?;
        let request = self.authorize(self.transport.client().get(url));
        let response = check(self.transport.send(request, LIST).await?, LIST).await?;

        response
            .json::<Vec<Document>>()
            .await
            .map_err(|e| Error::decode(LIST.name, e.to_string()))
    }

    #[instrument(skip(self, options), fields(document_id = %document_id))]
    async fn share_document(
        &self,
        document_id: &DocumentId,
        options: &ShareOptions,
    ) -> Result<ShareToken> {
        let url = self.transport.endpoint(&["documents", "share"])?;
        let body = ShareRequest {
            document_id: document_id.as_str(),
            is_public: options.is_public,
            expiry_days: options.expiry_days.get(),
            max_views: options.max_views.get(),
        };
        let request = self.authorize(self.transport.client().post(url).json(&body));
        let response = check(self.transport.send(request, SHARE).await?, SHARE).await?;

        let payload: ShareResponse = response
            .json()
            .await
            .map_err(|e| Error::decode(SHARE.name, e.to_string()))?;
        ShareToken::new(payload.token)
    }

    #[instrument(skip(self), fields(document_id = %document_id))]
    async fn set_privacy(&self, document_id: &DocumentId, is_public: bool) -> Result<()> {
        let url = self
            .transport
            .endpoint(&["documents", document_id.as_str(), "privacy"])?;
        let request = self.authorize(
            self.transport
                .client()
                .patch(url)
                .json(&PrivacyRequest { is_public }),
        );
        check(self.transport.send(request, PRIVACY).await?, PRIVACY).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(document_id = %document_id))]
    async fn view_document(&self, document_id: &DocumentId) -> Result<FetchedContent> {
        self.fetch_bytes(&["documents", "view", document_id.as_str()], VIEW)
            .await
    }

    #[instrument(skip(self), fields(document_id = %document_id))]
    async fn download_document(&self, document_id: &DocumentId) -> Result<FetchedContent> {
        self.fetch_bytes(&["documents", "download", document_id.as_str()], DOWNLOAD)
            .await
    }

    #[instrument(skip(self), fields(document_id = %document_id))]
    async fn delete_document(&self, document_id: &DocumentId) -> Result<()> {
        let url = self.transport.endpoint(&["documents", document_id.as_str()])?;
        let request = self.authorize(self.transport.client().delete(url));
        let response = self.transport.send(request, DELETE).await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("document already gone; treating delete as done");
            return Ok(());
        }
        check(response, DELETE).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(filename = %upload.file.filename))]
    async fn upload_document(&self, upload: &DocumentUpload) -> Result<Document> {
        let url = self.transport.endpoint(&["documents", "upload"])?;
        let filename = upload
            .filename
            .clone()
            .unwrap_or_else(|| upload.file.filename.clone());
        let form = Form::new()
            .part("file", file_part(&upload.file))
            .text("category", upload.category.clone())
            .text("filename", filename);

        let request = self.authorize(self.transport.client().post(url).multipart(form));
        let response = check(self.transport.send(request, UPLOAD).await?, UPLOAD).await?;
        read_document(response, UPLOAD).await
    }

    #[instrument(skip(self, update), fields(document_id = %document_id))]
    async fn update_document(
        &self,
        document_id: &DocumentId,
        update: &DocumentUpdate,
    ) -> Result<Document> {
        let url = self.transport.endpoint(&["documents", document_id.as_str()])?;
        let mut form = Form::new();
        if let Some(file) = &update.file {
            form = form.part("file", file_part(file));
        }
        if let Some(category) = &update.category {
            form = form.text("category", category.clone());
        }
        if let Some(filename) = &update.filename {
            form = form.text("filename", filename.clone());
        }

        let request = self.authorize(self.transport.client().put(url).multipart(form));
        let response = check(self.transport.send(request, UPDATE).await?, UPDATE).await?;
        read_document(response, UPDATE).await
    }
}

// An unparseable content type is sent without one rather than failing the
// upload.
fn file_part(file: &FilePart) -> Part {
    let part = || Part::bytes(file.bytes.to_vec()).file_name(file.filename.clone());
    part().mime_str(&file.content_type).unwrap_or_else(|_| part())
}

async fn read_document(response: Response, operation: Operation) -> Result<Document> {
    response
        .json::<Document>()
        .await
        .map_err(|e| Error::decode(operation.name, e.to_string()))
}

/// Unauthenticated client for capability-link fetches
#[derive(Clone)]
pub struct AnonymousShareClient {
    transport: HttpTransport,
}

impl AnonymousShareClient {
    pub fn new(config: &VaultConfig) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
        })
    }
}

#[async_trait]
impl SharedDocumentSource for AnonymousShareClient {
    #[instrument(skip_all)]
    async fn fetch_shared(&self, token: &ShareToken) -> Result<FetchedContent> {
        let url = self
            .transport
            .endpoint(&["documents", "share", token.as_str()])?;
        let request = self.transport.client().get(url);
        let response = self.transport.send(request, SHARED_FETCH).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::link_expired(token.as_str()));
        }
        let response = check(response, SHARED_FETCH).await?;
        read_content(response, SHARED_FETCH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_wording_never_matches_a_fallback() {
        let operations = [
            LIST,
            SHARE,
            PRIVACY,
            VIEW,
            DOWNLOAD,
            DELETE,
            UPLOAD,
            UPDATE,
            SHARED_FETCH,
        ];
        for operation in operations {
            for other in operations {
                assert_ne!(
                    operation.forbidden, other.fallback,
                    "{} forbidden message reads like a generic failure",
                    operation.name
                );
            }
        }
    }
}
