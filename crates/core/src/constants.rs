/// Constants used throughout the docvault codebase
// Default endpoints
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_CLIENT_ORIGIN: &str = "http://localhost:5173";

// Path segment of the client-side shareable address: `<origin>/shared/<token>`
pub const SHARED_PATH_SEGMENT: &str = "shared";

// Environment variable names
pub const DOCVAULT_TOKEN_VAR: &str = "DOCVAULT_TOKEN";
pub const DOCVAULT_API_URL_VAR: &str = "DOCVAULT_API_URL";
pub const DOCVAULT_CLIENT_ORIGIN_VAR: &str = "DOCVAULT_CLIENT_ORIGIN";
pub const DOCVAULT_TIMEOUT_VAR: &str = "DOCVAULT_TIMEOUT_SECS";
pub const DOCVAULT_CONFIG_VAR: &str = "DOCVAULT_CONFIG";

// Share defaults
pub const DEFAULT_SHARE_EXPIRY_DAYS: u32 = 30;
pub const DEFAULT_SHARE_MAX_VIEWS: u32 = 100;

// Blob retention
pub const PREVIEW_BLOB_TTL_SECS: u64 = 10;
pub const SHARED_BLOB_TTL_SECS: u64 = 60 * 60;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Stable fallback messages. A 403 always gets its own wording.
pub const SHARE_FORBIDDEN_MESSAGE: &str = "You do not have permission to share this document";
pub const SHARE_FAILED_MESSAGE: &str = "Failed to share document";
pub const DOWNLOAD_FORBIDDEN_MESSAGE: &str = "You don't have permission to download this file";
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Download failed";
pub const DELETE_FORBIDDEN_MESSAGE: &str = "You don't have permission to delete this document";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete document";
pub const PRIVACY_FORBIDDEN_MESSAGE: &str =
    "You don't have permission to change who can see this document";
pub const PRIVACY_FAILED_MESSAGE: &str = "Failed to update document privacy";
pub const VIEW_FORBIDDEN_MESSAGE: &str = "You don't have permission to view this file";
pub const VIEW_FAILED_MESSAGE: &str = "Unable to view this file. Please try downloading instead.";
pub const LIST_FORBIDDEN_MESSAGE: &str = "You don't have permission to list these documents";
pub const LIST_FAILED_MESSAGE: &str = "Failed to fetch documents";
pub const UPLOAD_FORBIDDEN_MESSAGE: &str = "You don't have permission to upload documents";
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload document";
pub const UPDATE_FORBIDDEN_MESSAGE: &str = "You don't have permission to edit this document";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update document";
pub const SHARED_NOT_FOUND_MESSAGE: &str = "Shared document not found or expired";
pub const SHARED_FORBIDDEN_MESSAGE: &str = "This shared link does not grant access";
pub const SHARED_FETCH_FAILED_MESSAGE: &str = "Failed to load shared document";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

pub const SHARED_DOCUMENT_FALLBACK_NAME: &str = "Shared Document";
