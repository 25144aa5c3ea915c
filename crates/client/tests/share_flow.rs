//! Owner shares a document, an anonymous recipient opens the link until
//! the server stops honouring it.

use docvault_client::{
    ActionMenuController, AnonymousShareClient, DocumentList, FailureKind, HttpVaultClient,
    SharedViewerFetcher, StaticCredential, ViewerState,
};
use docvault_config::VaultConfig;
use docvault_core::{DocumentId, RenderMode, ShareOptions};
use docvault_utils::BlobManager;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";
const ALLOWED_VIEWS: u64 = 3;

#[tokio::test]
async fn test_share_then_view_until_invalidated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 42,
                "fileName": "cat.png",
                "fileType": "image/png",
                "fileSize": 18,
                "isPublic": true
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/documents/share"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-42"})))
        .expect(1)
        .mount(&server)
        .await;
    // Served while the token is valid, then the fallback 404 takes over
    Mock::given(method("GET"))
        .and(path("/api/documents/share/tok-42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(PNG.to_vec())
                .insert_header("content-type", "image/png"),
        )
        .up_to_n_times(ALLOWED_VIEWS)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/documents/share/tok-42"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = VaultConfig::builder()
        .api_base_url(&format!("{}/api", server.uri()))
        .unwrap()
        .client_origin("https://vault.example.com")
        .unwrap()
        .build()
        .unwrap();
    let credential = Arc::new(StaticCredential::new("owner"));
    let backend = Arc::new(HttpVaultClient::new(&config, credential).unwrap());
    let documents = DocumentList::new();
    documents.refresh(backend.as_ref()).await.unwrap();
    let blobs = BlobManager::new();
    let controller = ActionMenuController::new(backend, documents, blobs.clone(), &config);

    let id = DocumentId::new("42");
    controller.open(&id).unwrap();
    let link = controller
        .share(&id, Some(ShareOptions::new(true, 30, 100).unwrap()))
        .await
        .unwrap();
    assert_eq!(link.address.as_str(), "https://vault.example.com/shared/tok-42");

    let anonymous = Arc::new(AnonymousShareClient::new(&config).unwrap());
    for _ in 0..ALLOWED_VIEWS {
        let mut viewer = SharedViewerFetcher::from_address(
            anonymous.clone(),
            blobs.clone(),
            &config,
            link.address.as_str(),
        )
        .unwrap();
        let ViewerState::Displayed(doc) = viewer.load().await else {
            panic!("expected the image to display");
        };
        assert_eq!(doc.content_type, "image/png");
        assert_eq!(doc.render_mode(), RenderMode::EmbeddedFrame);
        assert_eq!(doc.bytes().as_deref(), Some(PNG));
        assert!(viewer.teardown());
    }

    let mut viewer =
        SharedViewerFetcher::from_address(anonymous, blobs.clone(), &config, link.address.as_str())
            .unwrap();
    let ViewerState::Errored(failure) = viewer.load().await else {
        panic!("expected the exhausted link to fail");
    };
    assert_eq!(failure.kind, FailureKind::LinkExpiredOrInvalid);
    assert_eq!(failure.message(), "Shared document not found or expired");

    assert_eq!(blobs.live_count(), 0);
    assert_eq!(blobs.stats().created, ALLOWED_VIEWS);
}
