use crate::constants::{GENERIC_ERROR_MESSAGE, NETWORK_ERROR_MESSAGE, SHARED_NOT_FOUND_MESSAGE};
use std::path::PathBuf;

/// Result type alias for docvault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for docvault operations
///
/// Every variant is recovered at the component that issued the call and
/// rendered through [`Error::advisory`]; none of them is fatal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend denied the action for the current credential
    #[error("permission denied for {operation}: {message}")]
    Forbidden { operation: String, message: String },

    /// The capability token is unknown, expired, revoked, or out of views
    #[error("shared link '{token}' is invalid or has expired")]
    LinkExpiredOrInvalid { token: String },

    /// Any other non-success response from the backend
    #[error("{}", format_service_error(.operation, .status, .message))]
    Service {
        operation: String,
        status: Option<u16>,
        message: String,
    },

    /// The request never reached the server
    #[error("network error for '{endpoint}': {message}")]
    Network { endpoint: String, message: String },

    /// The bearer credential was missing or rejected
    #[error("not authorized to {operation}")]
    Unauthorized { operation: String },

    /// Link generation was requested for a private document
    #[error("document '{document_id}' must be public before it can be shared")]
    ShareRequiresPublic { document_id: String },

    /// Another action is still outstanding for this document
    #[error("document '{document_id}' is busy {busy}")]
    ActionBusy { document_id: String, busy: String },

    /// The action cannot be taken in the menu's current state
    #[error("cannot {action} document '{document_id}': {reason}")]
    ActionUnavailable {
        document_id: String,
        action: String,
        reason: String,
    },

    /// The document is not in the local list
    #[error("document '{document_id}' not found")]
    DocumentNotFound { document_id: String },

    /// A string could not be parsed as a shareable address
    #[error("invalid share address '{address}': {message}")]
    InvalidShareAddress { address: String, message: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A response body could not be decoded
    #[error("failed to decode {operation} response: {message}")]
    Decode { operation: String, message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// An error with additional context attached
    #[error("{message}: {source}")]
    Context {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

fn format_service_error(operation: &str, status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("{operation} failed with status {code}: {message}"),
        None => format!("{operation} failed: {message}"),
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::Configuration {
            message: format!("invalid URL: {error}"),
        }
    }
}

// Helper methods for creating errors with context
impl Error {
    /// Create a forbidden error
    #[must_use]
    pub fn forbidden(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Forbidden {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a link-expired error for a capability token
    #[must_use]
    pub fn link_expired(token: impl AsRef<str>) -> Self {
        Error::LinkExpiredOrInvalid {
            token: redact(token.as_ref()),
        }
    }

    /// Create a service error
    #[must_use]
    pub fn service(
        operation: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Error::Service {
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a network error
    #[must_use]
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    #[must_use]
    pub fn unauthorized(operation: impl Into<String>) -> Self {
        Error::Unauthorized {
            operation: operation.into(),
        }
    }

    /// Create a document-not-found error
    #[must_use]
    pub fn document_not_found(document_id: impl ToString) -> Self {
        Error::DocumentNotFound {
            document_id: document_id.to_string(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a decode error
    #[must_use]
    pub fn decode(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Decode {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a file system error
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// The error with any attached context stripped away
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// The message shown to the user as a local, dismissible advisory.
    ///
    /// Forbidden and link-expired outcomes keep their own wording so they are
    /// never confused with a generic failure.
    pub fn advisory(&self) -> String {
        match self.root() {
            Error::Forbidden { message, .. } => message.clone(),
            Error::LinkExpiredOrInvalid { .. } => SHARED_NOT_FOUND_MESSAGE.to_string(),
            Error::Service { message, .. } if message.trim().is_empty() => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
            Error::Service { message, .. } => message.clone(),
            Error::Network { .. } => NETWORK_ERROR_MESSAGE.to_string(),
            Error::Unauthorized { .. } => {
                "Your session has expired. Please log in again.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self.root(), Error::Network { .. })
    }
}

/// Shorten a bearer string for logs and error messages
pub fn redact(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}…")
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to a Result
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a lazy message
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Context {
            message: message.into(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::Context {
            message: f(),
            source: Box::new(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_expired_advisory_differs_from_generic_failures() {
        let expired = Error::link_expired("abcdef123456").advisory();
        let server =
            Error::service("shared fetch", Some(500), "Failed to load shared document").advisory();
        let network = Error::network("/documents/share/x", "connection refused").advisory();

        assert_ne!(expired, server);
        assert_ne!(expired, network);
        assert_ne!(server, network);
    }

    #[test]
    fn test_forbidden_advisory_is_verbatim() {
        let error = Error::forbidden("share", "You do not have permission to share this document");
        assert_eq!(
            error.advisory(),
            "You do not have permission to share this document"
        );
        assert!(!error.is_transient());
    }

    #[test]
    fn test_context_preserves_kind() {
        let result: Result<()> = Err(Error::network("/documents", "timed out"));
        let err = result.context("listing documents").unwrap_err();

        assert!(matches!(err.root(), Error::Network { .. }));
        assert!(err.is_transient());
        assert!(err.to_string().starts_with("listing documents"));
    }

    #[test]
    fn test_token_is_redacted() {
        let err = Error::link_expired("supersecrettoken");
        assert!(!err.to_string().contains("supersecrettoken"));
        assert_eq!(redact("abc"), "****");
    }

    #[test]
    fn test_empty_service_message_falls_back() {
        let err = Error::service("delete", Some(500), "  ");
        assert_eq!(err.advisory(), GENERIC_ERROR_MESSAGE);
    }
}
