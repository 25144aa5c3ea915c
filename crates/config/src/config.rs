//! The immutable client configuration
//!
//! `VaultConfig` is built once at startup and shared by every component.
//! It is `Clone + Send + Sync` and never mutated after construction.

use docvault_core::{
    constants::{
        DEFAULT_API_BASE_URL, DEFAULT_CLIENT_ORIGIN, DEFAULT_REQUEST_TIMEOUT_SECS,
        PREVIEW_BLOB_TTL_SECS, SHARED_BLOB_TTL_SECS,
    },
    Error, Result, ShareOptions,
};
use std::time::Duration;
use url::Url;

/// Client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct VaultConfig {
    /// Base URL of the document-store API (e.g. `http://localhost:8080/api`)
    pub api_base_url: Url,

    /// Origin shareable addresses are composed against
    pub client_origin: Url,

    /// Per-request timeout for backend calls
    pub request_timeout: Duration,

    /// Retention of blobs created for an owner's in-app preview
    pub preview_blob_ttl: Duration,

    /// Retention of blobs created by the anonymous shared viewer
    pub shared_blob_ttl: Duration,

    /// Options used when a share is requested without explicit ones
    pub share_defaults: ShareOptions,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            api_base_url: parse_default(DEFAULT_API_BASE_URL),
            client_origin: parse_default(DEFAULT_CLIENT_ORIGIN),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            preview_blob_ttl: Duration::from_secs(PREVIEW_BLOB_TTL_SECS),
            shared_blob_ttl: Duration::from_secs(SHARED_BLOB_TTL_SECS),
            share_defaults: ShareOptions::default(),
        }
    }
}

// The defaults are compile-time constants known to parse.
fn parse_default(raw: &str) -> Url {
    Url::parse(raw).unwrap_or_else(|_| unreachable!("invalid built-in URL {raw}"))
}

impl VaultConfig {
    /// Start from the defaults
    pub fn builder() -> VaultConfigBuilder {
        VaultConfigBuilder::default()
    }

    /// Validate invariants that parsing alone does not guarantee
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("api base URL", &self.api_base_url),
            ("client origin", &self.client_origin),
        ] {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::configuration(format!(
                    "{name} must use http or https, got '{}'",
                    url.scheme()
                )));
            }
            if url.cannot_be_a_base() {
                return Err(Error::configuration(format!("{name} '{url}' cannot be a base URL")));
            }
        }
        if self.request_timeout.is_zero() {
            return Err(Error::configuration("request timeout must be positive"));
        }
        if self.preview_blob_ttl.is_zero() || self.shared_blob_ttl.is_zero() {
            return Err(Error::configuration("blob retention must be positive"));
        }
        Ok(())
    }
}

/// Builder for [`VaultConfig`]
#[derive(Debug, Clone, Default)]
pub struct VaultConfigBuilder {
    config: VaultConfig,
}

impl VaultConfigBuilder {
    pub fn api_base_url(mut self, url: &str) -> Result<Self> {
        self.config.api_base_url = Url::parse(url)?;
        Ok(self)
    }

    pub fn client_origin(mut self, url: &str) -> Result<Self> {
        self.config.client_origin = Url::parse(url)?;
        Ok(self)
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn preview_blob_ttl(mut self, ttl: Duration) -> Self {
        self.config.preview_blob_ttl = ttl;
        self
    }

    pub fn shared_blob_ttl(mut self, ttl: Duration) -> Self {
        self.config.shared_blob_ttl = ttl;
        self
    }

    pub fn share_defaults(mut self, options: ShareOptions) -> Self {
        self.config.share_defaults = options;
        self
    }

    pub fn build(self) -> Result<VaultConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
