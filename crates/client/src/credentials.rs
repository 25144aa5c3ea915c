//! Bearer credential access
//!
//! The identity provider lives outside this crate. Components only read
//! the current credential through [`CredentialProvider`] and attach it.

use docvault_core::constants::DOCVAULT_TOKEN_VAR;
use zeroize::Zeroizing;

/// Source of the bearer credential for authenticated calls
pub trait CredentialProvider: Send + Sync {
    /// The current credential, or `None` when signed out
    fn bearer_token(&self) -> Option<Zeroizing<String>>;
}

/// A fixed credential
pub struct StaticCredential(Zeroizing<String>);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }
}

impl CredentialProvider for StaticCredential {
    fn bearer_token(&self) -> Option<Zeroizing<String>> {
        Some(self.0.clone())
    }
}

/// Reads the credential from an environment variable on every call
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(DOCVAULT_TOKEN_VAR)
    }
}

impl CredentialProvider for EnvCredential {
    fn bearer_token(&self) -> Option<Zeroizing<String>> {
        std::env::var(&self.var)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(Zeroizing::new)
    }
}
