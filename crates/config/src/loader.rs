//! Configuration loader for docvault
//!
//! Layers, lowest precedence first: built-in defaults, a JSON file, then
//! environment variables. CLI flags are applied by the binary on top.

use crate::config::VaultConfig;
use docvault_core::{
    constants::{
        DOCVAULT_API_URL_VAR, DOCVAULT_CLIENT_ORIGIN_VAR, DOCVAULT_CONFIG_VAR, DOCVAULT_TIMEOUT_VAR,
    },
    Error, Result, ResultExt, ShareOptions,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// On-disk configuration. Every field is optional and overrides the default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub api_base_url: Option<String>,
    pub client_origin: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub preview_blob_ttl_secs: Option<u64>,
    pub shared_blob_ttl_secs: Option<u64>,
    pub share_expiry_days: Option<u32>,
    pub share_max_views: Option<u32>,
}

impl ConfigFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read", e))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    fn apply(self, config: &mut VaultConfig) -> Result<()> {
        if let Some(url) = self.api_base_url {
            config.api_base_url = Url::parse(&url).context("apiBaseUrl")?;
        }
        if let Some(url) = self.client_origin {
            config.client_origin = Url::parse(&url).context("clientOrigin")?;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.preview_blob_ttl_secs {
            config.preview_blob_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = self.shared_blob_ttl_secs {
            config.shared_blob_ttl = Duration::from_secs(secs);
        }
        if self.share_expiry_days.is_some() || self.share_max_views.is_some() {
            let current = config.share_defaults;
            config.share_defaults = ShareOptions::new(
                current.is_public,
                self.share_expiry_days.unwrap_or(current.expiry_days.get()),
                self.share_max_views.unwrap_or(current.max_views.get()),
            )?;
        }
        Ok(())
    }
}

/// Configuration loader that handles all startup configuration
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader reading the process environment
    pub fn new() -> Self {
        Self {
            file: None,
            env: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Use an explicit configuration file instead of `DOCVAULT_CONFIG`
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Replace the environment lookup
    pub fn env_source<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    /// Load and validate the configuration
    pub fn load(self) -> Result<VaultConfig> {
        let mut config = VaultConfig::default();

        let file = self
            .file
            .clone()
            .or_else(|| (self.env)(DOCVAULT_CONFIG_VAR).map(PathBuf::from));
        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "loading configuration file");
            ConfigFile::from_path(&path)?.apply(&mut config)?;
        }

        self.apply_env(&mut config)?;
        config.validate()?;

        tracing::debug!(
            api = %config.api_base_url,
            origin = %config.client_origin,
            "configuration loaded"
        );
        Ok(config)
    }

    fn apply_env(&self, config: &mut VaultConfig) -> Result<()> {
        if let Some(url) = (self.env)(DOCVAULT_API_URL_VAR) {
            config.api_base_url = Url::parse(&url).context(DOCVAULT_API_URL_VAR)?;
        }
        if let Some(url) = (self.env)(DOCVAULT_CLIENT_ORIGIN_VAR) {
            config.client_origin = Url::parse(&url).context(DOCVAULT_CLIENT_ORIGIN_VAR)?;
        }
        if let Some(raw) = (self.env)(DOCVAULT_TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::configuration(format!(
                    "{DOCVAULT_TIMEOUT_VAR} must be whole seconds, got '{raw}'"
                ))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }
}
