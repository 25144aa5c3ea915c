use docvault_client::{
    ActionMenuController, DocumentList, EnvCredential, HttpVaultClient, VaultBackend,
};
use docvault_config::VaultConfig;
use docvault_core::{DocumentId, Result, ResultExt};
use docvault_utils::BlobManager;
use std::sync::Arc;

/// An authenticated session with a freshly listed document cache
pub struct Session {
    pub controller: ActionMenuController,
}

impl Session {
    pub async fn connect(config: &VaultConfig) -> Result<Self> {
        let backend: Arc<dyn VaultBackend> =
            Arc::new(HttpVaultClient::new(config, Arc::new(EnvCredential::default()))?);
        let documents = DocumentList::new();
        documents
            .refresh(backend.as_ref())
            .await
            .context("loading documents")?;

        let controller = ActionMenuController::new(backend, documents, BlobManager::new(), config);
        Ok(Self { controller })
    }

    /// Open the document's menu, as a row click would
    pub fn open_menu(&self, id: &str) -> Result<DocumentId> {
        let id = DocumentId::new(id);
        self.controller.open(&id)?;
        Ok(id)
    }
}
