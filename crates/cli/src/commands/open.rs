use super::output_path;
use docvault_client::{AnonymousShareClient, SharedDocument, SharedViewerFetcher, ViewerState};
use docvault_config::VaultConfig;
use docvault_core::{constants::SHARED_DOCUMENT_FALLBACK_NAME, Error, RenderMode, Result};
use docvault_utils::BlobManager;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub async fn execute(config: &VaultConfig, address: &str, output: Option<PathBuf>) -> Result<()> {
    let source = Arc::new(AnonymousShareClient::new(config)?);
    let mut viewer =
        SharedViewerFetcher::from_address(source, BlobManager::new(), config, address)?;
    viewer.load().await;

    let viewer = match viewer.into_result() {
        Ok(viewer) => viewer,
        Err(failure) => {
            eprintln!("{}", failure.hint());
            return Err(failure.error);
        }
    };

    let result = match viewer.state() {
        ViewerState::Displayed(document) | ViewerState::Unavailable(document) => {
            eprintln!(
                "{} ({}, {})",
                document.display_name(),
                document.type_label(),
                document.size_label()
            );
            present(document, output.as_deref()).await
        }
        ViewerState::Loading | ViewerState::Errored(_) => Ok(()),
    };

    viewer.teardown();
    result
}

async fn present(document: &SharedDocument, output: Option<&Path>) -> Result<()> {
    if output.is_none() {
        if let Some(text) = document.text() {
            print!("{text}");
            return Ok(());
        }
    }
    if document.render_mode() == RenderMode::DownloadFallback {
        eprintln!("Preview not available for this file type");
    }

    let path = output_path(output, document.display_name(), SHARED_DOCUMENT_FALLBACK_NAME);
    let bytes = document.bytes().ok_or_else(|| {
        Error::service(
            "open shared document",
            None,
            "the fetched content is no longer held",
        )
    })?;
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| Error::file_system(&path, "write", e))?;

    println!("Saved {}", path.display());
    Ok(())
}
