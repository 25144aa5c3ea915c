//! Capability links: the options a link is minted with, the opaque token,
//! and the client-side shareable address built around it.

use crate::constants::{DEFAULT_SHARE_EXPIRY_DAYS, DEFAULT_SHARE_MAX_VIEWS, SHARED_PATH_SEGMENT};
use crate::errors::{redact, Error, Result};
use crate::types::document::DocumentId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use url::Url;

/// Parameters a share link is requested with.
///
/// Expiry and view limits are enforced by the backend; the client only
/// forwards them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOptions {
    pub is_public: bool,
    pub expiry_days: NonZeroU32,
    pub max_views: NonZeroU32,
}

impl ShareOptions {
    /// Build options, rejecting zero expiry or view limits
    pub fn new(is_public: bool, expiry_days: u32, max_views: u32) -> Result<Self> {
        let expiry_days = NonZeroU32::new(expiry_days)
            .ok_or_else(|| Error::configuration("share expiry must be at least one day"))?;
        let max_views = NonZeroU32::new(max_views)
            .ok_or_else(|| Error::configuration("share view limit must be at least one view"))?;
        Ok(Self {
            is_public,
            expiry_days,
            max_views,
        })
    }
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            is_public: true,
            expiry_days: NonZeroU32::new(DEFAULT_SHARE_EXPIRY_DAYS).unwrap_or(NonZeroU32::MIN),
            max_views: NonZeroU32::new(DEFAULT_SHARE_MAX_VIEWS).unwrap_or(NonZeroU32::MIN),
        }
    }
}

/// Opaque bearer string granting read access to one document.
///
/// Possession is the authorization, so `Debug` never prints it in full.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareToken(String);

impl ShareToken {
    /// Wrap a token exactly as the backend issued it.
    ///
    /// Any non-blank string is accepted except those no URL path segment
    /// can carry: `.`, `..`, and strings with control characters.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::InvalidShareAddress {
                address: token,
                message: "share token is empty".to_string(),
            });
        }
        if token == "." || token == ".." || token.chars().any(char::is_control) {
            return Err(Error::InvalidShareAddress {
                address: redact(&token),
                message: "share token cannot be carried in a URL path".to_string(),
            });
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the token from a `<origin>/shared/<token>` address.
    ///
    /// The final segment is percent-decoded, undoing
    /// [`ShareLink::compose_address`]. Anything that is not an absolute
    /// URL is taken as a bare token, verbatim.
    pub fn from_address(address: &str) -> Result<Self> {
        let address = address.trim();
        let url = match Url::parse(address) {
            Ok(url) if url.has_host() => url,
            _ => return Self::new(address),
        };

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let invalid = |message: String| Error::InvalidShareAddress {
            address: url.origin().ascii_serialization(),
            message,
        };

        match segments.as_slice() {
            [.., marker, encoded] if *marker == SHARED_PATH_SEGMENT => {
                let token = urlencoding::decode(encoded).map_err(|e| {
                    invalid(format!("share token is not valid UTF-8 once decoded: {e}"))
                })?;
                Self::new(token.into_owned())
            }
            _ => Err(invalid(format!(
                "expected a path ending in /{SHARED_PATH_SEGMENT}/<token>"
            ))),
        }
    }
}

impl fmt::Debug for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShareToken").field(&redact(&self.0)).finish()
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A minted capability link. Never mutated; a new request supersedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub document_id: DocumentId,
    pub token: ShareToken,
    pub created_via: ShareOptions,
    pub address: Url,
}

impl ShareLink {
    pub fn new(
        document_id: DocumentId,
        token: ShareToken,
        created_via: ShareOptions,
        origin: &Url,
    ) -> Result<Self> {
        let address = Self::compose_address(origin, &token)?;
        Ok(Self {
            document_id,
            token,
            created_via,
            address,
        })
    }

    /// `<origin>/shared/<token>`, keeping any path prefix the origin carries.
    ///
    /// The token is percent-encoded as a single path segment.
    pub fn compose_address(origin: &Url, token: &ShareToken) -> Result<Url> {
        let mut address = origin.clone();
        address.set_query(None);
        address.set_fragment(None);
        address
            .path_segments_mut()
            .map_err(|_| {
                Error::configuration(format!("client origin '{origin}' cannot carry a path"))
            })?
            .pop_if_empty()
            .push(SHARED_PATH_SEGMENT)
            .push(token.as_str());
        Ok(address)
    }
}
